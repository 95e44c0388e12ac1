use serde_json::{Map, Value};

/// One node of a submitted form body.
///
/// HTML form submissions arrive as flat `name=value` pairs whose names carry
/// PHP-style bracket paths (`fields[title][input][0][value]`). The tree keeps
/// children in submission order; `[]` segments append a fresh child keyed by
/// the next numeric index.
#[derive(Debug, Clone, PartialEq)]
pub enum FormNode {
    /// A leaf value.
    Value(String),
    /// An ordered group of named children.
    Group(Vec<(String, FormNode)>),
}

impl FormNode {
    /// Returns the leaf value, if this node is one.
    #[must_use]
    pub fn as_value(&self) -> Option<&str> {
        match self {
            Self::Value(value) => Some(value.as_str()),
            Self::Group(_) => None,
        }
    }

    /// Returns the children of a group node.
    #[must_use]
    pub fn children(&self) -> &[(String, FormNode)] {
        match self {
            Self::Value(_) => &[],
            Self::Group(children) => children.as_slice(),
        }
    }

    /// Returns the last child stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FormNode> {
        self.children()
            .iter()
            .rev()
            .find(|(child_key, _)| child_key == key)
            .map(|(_, child)| child)
    }

    /// Returns the leaf value stored under `key`.
    #[must_use]
    pub fn value_of(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FormNode::as_value)
    }

    /// Returns whether this group looks like a plain list: every key is the
    /// numeric index of its position.
    #[must_use]
    pub fn is_list(&self) -> bool {
        match self {
            Self::Value(_) => false,
            Self::Group(children) => children
                .iter()
                .enumerate()
                .all(|(position, (key, _))| key.parse::<usize>() == Ok(position)),
        }
    }

    fn insert(&mut self, segments: &[String], value: String) {
        let Self::Group(children) = self else {
            return;
        };

        let Some((segment, rest)) = segments.split_first() else {
            return;
        };

        if segment.is_empty() {
            // `[]` always appends, numbered like a PHP array push.
            let next_index = children
                .iter()
                .filter_map(|(key, _)| key.parse::<usize>().ok())
                .map(|index| index + 1)
                .max()
                .unwrap_or(0);
            let child = if rest.is_empty() {
                FormNode::Value(value)
            } else {
                let mut group = FormNode::Group(Vec::new());
                group.insert(rest, value);
                group
            };
            children.push((next_index.to_string(), child));
            return;
        }

        if rest.is_empty() {
            // Repeated leaves overwrite, as PHP's parser does.
            if let Some((_, existing)) = children
                .iter_mut()
                .rev()
                .find(|(key, _)| key == segment)
            {
                *existing = FormNode::Value(value);
            } else {
                children.push((segment.clone(), FormNode::Value(value)));
            }
            return;
        }

        if let Some((_, existing)) = children
            .iter_mut()
            .rev()
            .find(|(key, child)| key == segment && matches!(child, FormNode::Group(_)))
        {
            existing.insert(rest, value);
            return;
        }

        let mut group = FormNode::Group(Vec::new());
        group.insert(rest, value);
        children.push((segment.clone(), group));
    }
}

/// A parsed form submission.
#[derive(Debug, Clone, PartialEq)]
pub struct FormTree {
    root: FormNode,
}

impl FormTree {
    /// Parses an `application/x-www-form-urlencoded` body.
    ///
    /// Parsing never fails; names with unbalanced brackets are kept as a
    /// single literal key and ignored downstream.
    #[must_use]
    pub fn parse(body: &str) -> Self {
        let mut root = FormNode::Group(Vec::new());
        for (name, value) in url::form_urlencoded::parse(body.as_bytes()) {
            let segments = split_bracket_path(name.as_ref());
            root.insert(&segments, value.into_owned());
        }

        Self { root }
    }

    /// Returns the root group.
    #[must_use]
    pub fn root(&self) -> &FormNode {
        &self.root
    }

    /// Returns a top-level node by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FormNode> {
        self.root.get(name)
    }

    /// Returns a top-level leaf value by name.
    #[must_use]
    pub fn value_of(&self, name: &str) -> Option<&str> {
        self.root.value_of(name)
    }
}

/// Splits `fields[title][input][0][value]` into its path segments.
fn split_bracket_path(name: &str) -> Vec<String> {
    let Some(open) = name.find('[') else {
        return vec![name.to_owned()];
    };

    let mut segments = vec![name[..open].to_owned()];
    let mut rest = &name[open..];

    while let Some(tail) = rest.strip_prefix('[') {
        let Some(close) = tail.find(']') else {
            // Unbalanced name; treat the remainder as one literal segment.
            segments.push(tail.to_owned());
            return segments;
        };
        segments.push(tail[..close].to_owned());
        rest = &tail[close + 1..];
    }

    if !rest.is_empty() {
        segments.push(rest.to_owned());
    }

    segments
}

/// A decoded linkable relationship selection.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkableValue {
    /// A single related identifier.
    One(String),
    /// Zero or more related identifiers.
    Many(Vec<String>),
}

impl LinkableValue {
    /// Returns the JSON shape handed to the gateway.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::One(id) => {
                let mut object = Map::new();
                object.insert("id".to_owned(), Value::String(id.clone()));
                Value::Object(object)
            }
            Self::Many(ids) => {
                let mut object = Map::new();
                object.insert(
                    "items".to_owned(),
                    Value::Array(ids.iter().cloned().map(Value::String).collect()),
                );
                Value::Object(object)
            }
        }
    }
}

/// The flat decoded payload handed to the external API layer.
///
/// Keys are field display names; values are decoded scalars, arrays, the
/// linkable `{id}` / `{items}` shapes, or explicit nulls. A key that is
/// present with a null or empty value is meaningfully different from an
/// absent key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmissionPayload {
    values: Map<String, Value>,
}

impl SubmissionPayload {
    /// Creates an empty payload.
    #[must_use]
    pub fn new() -> Self {
        Self { values: Map::new() }
    }

    /// Inserts a decoded value for a field display name.
    pub fn insert(&mut self, display_name: impl Into<String>, value: Value) {
        self.values.insert(display_name.into(), value);
    }

    /// Returns a decoded value.
    #[must_use]
    pub fn get(&self, display_name: &str) -> Option<&Value> {
        self.values.get(display_name)
    }

    /// Returns whether the payload carries any field at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the decoded values in insertion order.
    #[must_use]
    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Consumes the payload into a JSON object.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.values)
    }
}

impl From<Map<String, Value>> for SubmissionPayload {
    fn from(values: Map<String, Value>) -> Self {
        Self { values }
    }
}
