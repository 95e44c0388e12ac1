//! The inverse of form rendering: nested submission tree back to a flat
//! payload.
//!
//! Decoding is driven entirely by the hidden `type`/`multiple` companions that
//! round-trip through the form, so the active resource definition is never
//! re-queried. Malformed input never raises; it degrades to null or empty.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use formloom_domain::{FieldType, FormNode, FormTree, LinkableValue, SubmissionPayload};
use serde_json::{Map, Value};

/// Wire format for decoded date-time values, RFC-822 style:
/// `Tue, 02 Jan 24 15:04:05 +0000`.
pub const DATE_TIME_WIRE_FORMAT: &str = "%a, %d %b %y %H:%M:%S %z";

const READ_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Decodes a parsed form submission into the flat gateway payload.
///
/// Every submitted `fields[...]` group with hidden companions produces a key,
/// even when its value decodes to null or an empty array; every name in the
/// `linkableFields` manifest produces a key as well. Nothing else does.
#[must_use]
pub fn decode_submission(tree: &FormTree) -> SubmissionPayload {
    let mut payload = SubmissionPayload::new();

    if let Some(fields) = tree.get("fields") {
        for (name, group) in fields.children() {
            if group.as_value().is_some() {
                continue;
            }

            let multiple = group.value_of("multiple").is_some_and(is_truthy_text);
            let field_type = group
                .value_of("type")
                .map(FieldType::parse_lenient)
                .unwrap_or(FieldType::Text);
            let input = group.get("input");

            if multiple {
                let mut items = Vec::new();
                if let Some(input) = input {
                    for (_, entry) in input.children() {
                        if let Some(value) = decode_scalar(field_type, Some(entry)) {
                            items.push(value);
                        }
                    }
                }
                // Zero or only-null entries still yield an empty array; an
                // empty selection is not the same as an absent field.
                payload.insert(name.clone(), Value::Array(items));
            } else {
                let entry = input.and_then(|input| input.get("0"));
                let value = decode_scalar(field_type, entry).unwrap_or(Value::Null);
                payload.insert(name.clone(), value);
            }
        }
    }

    let manifest: Vec<&str> = tree
        .value_of("linkableFields")
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .collect()
        })
        .unwrap_or_default();

    let linkable = tree.get("linkable");
    for name in manifest {
        let submitted = linkable.and_then(|node| node.get(name));
        payload.insert(name.to_owned(), decode_linkable(submitted));
    }

    payload
}

/// Decodes one indexed input group according to its declared type.
fn decode_scalar(field_type: FieldType, entry: Option<&FormNode>) -> Option<Value> {
    match field_type {
        FieldType::DateTime => {
            let entry = entry?;
            let date = entry.value_of("date").filter(|text| !text.trim().is_empty())?;
            let time = entry.value_of("time").filter(|text| !text.trim().is_empty())?;
            combine_date_time(date, time).map(Value::String)
        }
        FieldType::Boolean => Some(Value::Bool(
            entry
                .and_then(|entry| entry.value_of("value"))
                .is_some_and(is_truthy_text),
        )),
        FieldType::Text | FieldType::Html => entry
            .and_then(|entry| entry.value_of("value"))
            .map(|value| Value::String(value.to_owned())),
    }
}

/// Decodes a linkable submission for a name listed in the manifest.
fn decode_linkable(submitted: Option<&FormNode>) -> Value {
    let Some(node) = submitted else {
        // Nothing submitted for a manifest name means an emptied multi-select.
        return LinkableValue::Many(Vec::new()).to_value();
    };

    if node.as_value().is_some() {
        return Value::Null;
    }

    if node.is_list() {
        let ids: Vec<String> = node
            .children()
            .iter()
            .filter_map(|(_, entry)| entry.value_of("id").or_else(|| entry.as_value()))
            .filter(|id| !id.trim().is_empty())
            .map(ToOwned::to_owned)
            .collect();

        if ids.is_empty() {
            // A selection set made of nothing but blank entries is rejected
            // outright rather than treated as an empty selection.
            return Value::Null;
        }

        return LinkableValue::Many(ids).to_value();
    }

    let mut object = Map::new();
    let mut any_filled = false;
    for (key, child) in node.children() {
        if let Some(value) = child.as_value() {
            if !value.trim().is_empty() {
                any_filled = true;
            }
            object.insert(key.clone(), Value::String(value.to_owned()));
        }
    }

    if any_filled {
        Value::Object(object)
    } else {
        Value::Null
    }
}

/// Combines a `YYYY-MM-DD` date and an `HH:MM` time into the wire format.
#[must_use]
pub fn combine_date_time(date: &str, time: &str) -> Option<String> {
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()?;
    let time = NaiveTime::parse_from_str(time.trim(), "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(time.trim(), "%H:%M:%S"))
        .ok()?;

    Some(
        date.and_time(time)
            .and_utc()
            .format(DATE_TIME_WIRE_FORMAT)
            .to_string(),
    )
}

/// Splits a stored date-time value back into form `date` and `time` parts.
///
/// Accepts the wire format plus common ISO shapes; anything else yields
/// `None` so both inputs render empty.
#[must_use]
pub fn split_date_time(value: &str) -> Option<(String, String)> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    let parsed: Option<NaiveDateTime> =
        chrono::DateTime::parse_from_str(value, DATE_TIME_WIRE_FORMAT)
            .map(|parsed| parsed.naive_utc())
            .ok()
            .or_else(|| {
                chrono::DateTime::parse_from_rfc3339(value)
                    .map(|parsed| parsed.naive_utc())
                    .ok()
            })
            .or_else(|| {
                READ_FORMATS
                    .iter()
                    .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
            });

    parsed.map(|parsed| {
        (
            parsed.format("%Y-%m-%d").to_string(),
            parsed.format("%H:%M").to_string(),
        )
    })
}

/// Returns whether submitted text counts as true.
#[must_use]
pub fn is_truthy_text(value: &str) -> bool {
    !matches!(value.trim(), "" | "0" | "false")
}

/// Returns whether a previously stored value counts as true when seeding a
/// checkbox.
#[must_use]
pub fn is_truthy_value(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|number| number != 0.0),
        Value::String(text) => is_truthy_text(text),
        Value::Array(items) => !items.is_empty(),
        Value::Object(entries) => !entries.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use formloom_domain::FormTree;
    use serde_json::{Value, json};

    use super::{combine_date_time, decode_submission, split_date_time};

    fn decode(body: &str) -> formloom_domain::SubmissionPayload {
        decode_submission(&FormTree::parse(body))
    }

    #[test]
    fn array_field_keeps_non_null_values_in_order() {
        let payload = decode(
            "fields[tags][type]=text&fields[tags][multiple]=1\
             &fields[tags][input][0][value]=alpha\
             &fields[tags][input][1][value]=beta",
        );
        assert_eq!(payload.get("tags"), Some(&json!(["alpha", "beta"])));
    }

    #[test]
    fn array_field_without_entries_yields_empty_array() {
        let payload = decode("fields[tags][type]=text&fields[tags][multiple]=1");
        assert_eq!(payload.get("tags"), Some(&json!([])));
    }

    #[test]
    fn array_date_time_drops_half_filled_entries() {
        let payload = decode(
            "fields[slots][type]=dateTime&fields[slots][multiple]=1\
             &fields[slots][input][0][date]=2024-01-02&fields[slots][input][0][time]=15:04\
             &fields[slots][input][1][date]=2024-01-03&fields[slots][input][1][time]=",
        );
        assert_eq!(
            payload.get("slots"),
            Some(&json!(["Tue, 02 Jan 24 15:04:00 +0000"]))
        );
    }

    #[test]
    fn scalar_field_without_input_block_is_explicit_null() {
        let payload = decode("fields[title][type]=text&fields[title][multiple]=0");
        assert_eq!(payload.get("title"), Some(&Value::Null));
    }

    #[test]
    fn scalar_text_passes_through() {
        let payload = decode(
            "fields[title][type]=text&fields[title][multiple]=0\
             &fields[title][input][0][value]=Hello",
        );
        assert_eq!(payload.get("title"), Some(&json!("Hello")));
    }

    #[test]
    fn date_time_combines_into_wire_format() {
        let payload = decode(
            "fields[starts][type]=dateTime&fields[starts][multiple]=0\
             &fields[starts][input][0][date]=2024-01-02\
             &fields[starts][input][0][time]=15:04",
        );
        assert_eq!(
            payload.get("starts"),
            Some(&json!("Tue, 02 Jan 24 15:04:00 +0000"))
        );
    }

    #[test]
    fn date_without_time_decodes_to_null() {
        let payload = decode(
            "fields[starts][type]=dateTime&fields[starts][multiple]=0\
             &fields[starts][input][0][date]=2024-01-02&fields[starts][input][0][time]=",
        );
        assert_eq!(payload.get("starts"), Some(&Value::Null));
    }

    #[test]
    fn unchecked_boolean_decodes_to_false() {
        let payload = decode("fields[done][type]=boolean&fields[done][multiple]=0");
        assert_eq!(payload.get("done"), Some(&json!(false)));
    }

    #[test]
    fn checked_boolean_decodes_to_true() {
        let payload = decode(
            "fields[done][type]=boolean&fields[done][multiple]=0\
             &fields[done][input][0][value]=1",
        );
        assert_eq!(payload.get("done"), Some(&json!(true)));
    }

    #[test]
    fn linkable_single_with_blank_id_is_null() {
        let payload = decode("linkableFields=owner&linkable[owner][id]=");
        assert_eq!(payload.get("owner"), Some(&Value::Null));
    }

    #[test]
    fn linkable_single_passes_through() {
        let payload = decode("linkableFields=owner&linkable[owner][id]=7");
        assert_eq!(payload.get("owner"), Some(&json!({ "id": "7" })));
    }

    #[test]
    fn absent_linkable_multi_yields_empty_items() {
        let payload = decode("linkableFields=members");
        assert_eq!(payload.get("members"), Some(&json!({ "items": [] })));
    }

    #[test]
    fn linkable_multi_keeps_only_non_blank_ids() {
        let payload = decode(
            "linkableFields=members&linkable[members][][id]=\
             &linkable[members][][id]=3&linkable[members][][id]=",
        );
        assert_eq!(payload.get("members"), Some(&json!({ "items": ["3"] })));
    }

    #[test]
    fn linkable_multi_of_only_blanks_is_null() {
        let payload = decode(
            "linkableFields=members&linkable[members][][id]=&linkable[members][][id]=",
        );
        assert_eq!(payload.get("members"), Some(&Value::Null));
    }

    #[test]
    fn unlisted_linkable_names_are_ignored() {
        let payload = decode("linkableFields=owner&linkable[owner][id]=7&linkable[extra][id]=9");
        assert_eq!(payload.get("owner"), Some(&json!({ "id": "7" })));
        assert_eq!(payload.get("extra"), None);
    }

    #[test]
    fn malformed_field_groups_are_skipped() {
        let payload = decode("fields[broken]=oops&fields[title][type]=text&fields[title][multiple]=0");
        assert_eq!(payload.get("broken"), None);
        assert_eq!(payload.get("title"), Some(&Value::Null));
    }

    #[test]
    fn wire_format_round_trips_through_split() {
        let wire = combine_date_time("2024-01-02", "15:04").unwrap_or_else(|| unreachable!());
        let (date, time) = split_date_time(&wire).unwrap_or_else(|| unreachable!());
        assert_eq!(date, "2024-01-02");
        assert_eq!(time, "15:04");
    }

    #[test]
    fn unparseable_date_time_splits_to_none() {
        assert_eq!(split_date_time("not a date"), None);
    }
}
