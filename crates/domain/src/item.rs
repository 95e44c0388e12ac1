use formloom_core::{AppError, AppResult};
use serde_json::{Map, Value};

use crate::resource::ResourceDefinition;

/// One externally-serialized resource item.
///
/// Values are keyed by field display name and keep the order the external
/// layer serialized them in; the index table derives its column set from that
/// order.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceItem {
    values: Map<String, Value>,
}

impl ResourceItem {
    /// Creates an item from a serialized value map.
    #[must_use]
    pub fn new(values: Map<String, Value>) -> Self {
        Self { values }
    }

    /// Creates an item from a serialized JSON value, which must be an object.
    pub fn from_value(value: Value) -> AppResult<Self> {
        match value {
            Value::Object(values) => Ok(Self { values }),
            _ => Err(AppError::Validation(
                "serialized resource items must be JSON objects".to_owned(),
            )),
        }
    }

    /// Returns the serialized values in their original order.
    #[must_use]
    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Returns a single serialized value by field display name.
    #[must_use]
    pub fn value(&self, display_name: &str) -> Option<&Value> {
        self.values.get(display_name)
    }

    /// Resolves the item's primary identifier via the definition's first
    /// declared identifier field.
    pub fn primary_identifier(&self, definition: &ResourceDefinition) -> AppResult<String> {
        let field = definition.primary_identifier();
        let value = self.value(field.display_name().as_str()).ok_or_else(|| {
            AppError::Internal(format!(
                "serialized item is missing identifier '{}'",
                field.display_name().as_str()
            ))
        })?;

        scalar_to_string(value).ok_or_else(|| {
            AppError::Internal(format!(
                "identifier '{}' is not a scalar value",
                field.display_name().as_str()
            ))
        })
    }
}

/// Renders a scalar JSON value as plain text, `None` for nested structures.
#[must_use]
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::Bool(flag) => Some(if *flag { "1".to_owned() } else { "0".to_owned() }),
        Value::Number(number) => Some(number.to_string()),
        Value::String(text) => Some(text.clone()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::ResourceItem;
    use crate::resource::{CrudAction, FieldDescriptor, FieldType, ResourceDefinition};

    fn definition() -> ResourceDefinition {
        let id = FieldDescriptor::new(
            "id",
            "id",
            "Id",
            None,
            FieldType::Text,
            false,
            Vec::new(),
            true,
            vec![CrudAction::Index],
        )
        .unwrap_or_else(|_| unreachable!());
        let name = FieldDescriptor::new(
            "name",
            "name",
            "Name",
            None,
            FieldType::Text,
            false,
            Vec::new(),
            false,
            vec![CrudAction::Create, CrudAction::Edit],
        )
        .unwrap_or_else(|_| unreachable!());
        ResourceDefinition::new("people", "Person", "name", vec![id, name], Vec::new())
            .unwrap_or_else(|_| unreachable!())
    }

    #[test]
    fn rejects_non_object_values() {
        assert!(ResourceItem::from_value(json!([1, 2])).is_err());
    }

    #[test]
    fn resolves_primary_identifier() {
        let item = ResourceItem::from_value(json!({ "id": 7, "name": "Ada" }))
            .unwrap_or_else(|_| unreachable!());
        let id = item
            .primary_identifier(&definition())
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(id, "7");
    }

    #[test]
    fn missing_identifier_is_a_hard_error() {
        let item =
            ResourceItem::from_value(json!({ "name": "Ada" })).unwrap_or_else(|_| unreachable!());
        assert!(item.primary_identifier(&definition()).is_err());
    }
}
