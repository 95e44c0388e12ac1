use std::sync::Arc;

use formloom_core::{AppError, AppResult};
use formloom_domain::{
    Cardinality, CrudAction, FieldDescriptor, RelationshipDescriptor, ResourceDefinition,
    ResourceItem, SubmissionPayload,
};
use serde_json::Value;

use crate::ports::{LinkCandidate, LinkSource};

/// One rendered input unit.
#[derive(Debug, Clone, PartialEq)]
pub struct FormFieldEntry {
    /// The field being rendered.
    pub field: FieldDescriptor,
    /// Repetition index; multi-valued fields render one entry per element.
    pub index: usize,
    /// Value to prefill the input with.
    pub old_value: Option<Value>,
    /// Whether to render the label; only the first entry of a field does.
    pub show_label: bool,
}

/// Selected identifiers for a linkable relationship.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectedLink {
    /// Nothing selected.
    None,
    /// A single selected identifier.
    One(String),
    /// A set of selected identifiers.
    Many(Vec<String>),
}

impl SelectedLink {
    /// Returns whether an identifier is part of the selection.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        match self {
            Self::None => false,
            Self::One(selected) => selected == id,
            Self::Many(selected) => selected.iter().any(|entry| entry == id),
        }
    }
}

/// One linkable relationship picker.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkableEntry {
    /// The relationship being rendered.
    pub relationship: RelationshipDescriptor,
    /// Candidate values, fetched fresh from the related resource's listing.
    pub candidates: Vec<LinkCandidate>,
    /// Current selection.
    pub selected: SelectedLink,
}

/// The assembled form for a create or edit page.
#[derive(Debug, Clone, PartialEq)]
pub struct FormModel {
    /// The action the form was assembled for.
    pub action: CrudAction,
    /// Plain field entries in definition order.
    pub entries: Vec<FormFieldEntry>,
    /// Linkable relationship pickers in definition order.
    pub linkables: Vec<LinkableEntry>,
}

impl FormModel {
    /// Returns the comma-joined manifest of linkable field names, rendered as
    /// a hidden input so the decoder can tell linkables apart without the
    /// definition.
    #[must_use]
    pub fn linkable_manifest(&self) -> String {
        self.linkables
            .iter()
            .map(|linkable| linkable.relationship.display_name().as_str())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Assembles form models from resource metadata and current state.
#[derive(Clone)]
pub struct FormService {
    link_source: Arc<dyn LinkSource>,
}

impl FormService {
    /// Creates a form service over a link-candidate source.
    #[must_use]
    pub fn new(link_source: Arc<dyn LinkSource>) -> Self {
        Self { link_source }
    }

    /// Builds the form for a create or edit page.
    ///
    /// `old_input` carries the decoded values of a previously failed
    /// submission and takes precedence over the existing item's values.
    /// Editing without an existing item is a caller contract violation.
    pub async fn build_form(
        &self,
        definition: &ResourceDefinition,
        action: CrudAction,
        existing: Option<&ResourceItem>,
        old_input: Option<&SubmissionPayload>,
    ) -> AppResult<FormModel> {
        match action {
            CrudAction::Create => {}
            CrudAction::Edit => {
                if existing.is_none() {
                    return Err(AppError::Internal(
                        "edit form requested without an existing item".to_owned(),
                    ));
                }
            }
            other => {
                return Err(AppError::Internal(format!(
                    "action '{}' does not take a form",
                    other.as_str()
                )));
            }
        }

        let mut entries = Vec::new();
        for field in definition.form_fields(action) {
            if field.is_array() {
                let current: Vec<Value> = existing
                    .and_then(|item| item.value(field.display_name().as_str()))
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default();

                for (index, value) in current.iter().enumerate() {
                    entries.push(FormFieldEntry {
                        field: field.clone(),
                        index,
                        old_value: Some(value.clone()),
                        show_label: index == 0,
                    });
                }

                // One trailing empty entry so a new element can be added.
                entries.push(FormFieldEntry {
                    field: field.clone(),
                    index: current.len(),
                    old_value: None,
                    show_label: current.is_empty(),
                });
            } else {
                let old_value = old_input
                    .and_then(|input| input.get(field.display_name().as_str()))
                    .filter(|value| !value.is_null())
                    .cloned()
                    .or_else(|| {
                        existing
                            .and_then(|item| item.value(field.display_name().as_str()))
                            .cloned()
                    });

                entries.push(FormFieldEntry {
                    field: field.clone(),
                    index: 0,
                    old_value,
                    show_label: true,
                });
            }
        }

        let mut linkables = Vec::new();
        for relationship in definition.linkable_relationships(action) {
            let candidates = self
                .link_source
                .candidate_values(relationship.related_resource().as_str())
                .await?;

            let old_value = old_input
                .and_then(|input| input.get(relationship.display_name().as_str()))
                .filter(|value| !value.is_null())
                .or_else(|| {
                    existing.and_then(|item| item.value(relationship.display_name().as_str()))
                });

            let ids = old_value.map(link_ids).unwrap_or_default();
            let selected = match relationship.cardinality() {
                Cardinality::One => ids
                    .into_iter()
                    .next()
                    .map_or(SelectedLink::None, SelectedLink::One),
                Cardinality::Many => SelectedLink::Many(ids),
            };

            linkables.push(LinkableEntry {
                relationship: relationship.clone(),
                candidates,
                selected,
            });
        }

        Ok(FormModel {
            action,
            entries,
            linkables,
        })
    }
}

/// Extracts related identifiers from a serialized or decoded linkable value:
/// `{id}`, `{items: [...]}`, a list of either, or a bare scalar.
fn link_ids(value: &Value) -> Vec<String> {
    match value {
        Value::Object(object) => {
            if let Some(items) = object.get("items").and_then(Value::as_array) {
                return items.iter().flat_map(link_ids).collect();
            }

            object
                .get("id")
                .and_then(scalar_id)
                .map(|id| vec![id])
                .unwrap_or_default()
        }
        Value::Array(items) => items.iter().flat_map(link_ids).collect(),
        other => scalar_id(other).map(|id| vec![id]).unwrap_or_default(),
    }
}

fn scalar_id(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => (!text.trim().is_empty()).then(|| text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use formloom_core::AppResult;
    use formloom_domain::{
        Cardinality, CrudAction, FieldDescriptor, FieldType, RelationshipDescriptor,
        ResourceDefinition, ResourceItem, SubmissionPayload,
    };
    use serde_json::{Value, json};

    use super::{FormService, SelectedLink};
    use crate::ports::{LinkCandidate, LinkSource};

    struct FakeLinkSource;

    #[async_trait]
    impl LinkSource for FakeLinkSource {
        async fn candidate_values(
            &self,
            related_resource: &str,
        ) -> AppResult<Vec<LinkCandidate>> {
            assert_eq!(related_resource, "people");
            Ok(vec![
                LinkCandidate {
                    id: "1".to_owned(),
                    label: "Ada".to_owned(),
                },
                LinkCandidate {
                    id: "2".to_owned(),
                    label: "Grace".to_owned(),
                },
            ])
        }
    }

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
            vec![CrudAction::Index, CrudAction::View],
        )
        .unwrap_or_else(|_| unreachable!());
        let title = FieldDescriptor::new(
            "title",
            "title",
            "Title",
            None,
            FieldType::Text,
            false,
            Vec::new(),
            false,
            vec![CrudAction::Create, CrudAction::Edit],
        )
        .unwrap_or_else(|_| unreachable!());
        let tags = FieldDescriptor::new(
            "tags",
            "tags",
            "Tags",
            None,
            FieldType::Text,
            true,
            Vec::new(),
            false,
            vec![CrudAction::Create, CrudAction::Edit],
        )
        .unwrap_or_else(|_| unreachable!());
        let owner = RelationshipDescriptor::new(
            "owner",
            "owner",
            "Owner",
            Cardinality::One,
            "people",
            true,
            vec![CrudAction::Create, CrudAction::Edit],
        )
        .unwrap_or_else(|_| unreachable!());

        ResourceDefinition::new(
            "projects",
            "Project",
            "title",
            vec![id, title, tags],
            vec![owner],
        )
        .unwrap_or_else(|_| unreachable!())
    }

    fn service() -> FormService {
        FormService::new(Arc::new(FakeLinkSource))
    }

    #[tokio::test]
    async fn create_form_appends_one_empty_array_entry() {
        let model = service()
            .build_form(&definition(), CrudAction::Create, None, None)
            .await
            .unwrap_or_else(|_| unreachable!());

        let tag_entries: Vec<_> = model
            .entries
            .iter()
            .filter(|entry| entry.field.display_name().as_str() == "tags")
            .collect();
        assert_eq!(tag_entries.len(), 1);
        assert_eq!(tag_entries[0].index, 0);
        assert!(tag_entries[0].show_label);
        assert_eq!(tag_entries[0].old_value, None);
    }

    #[tokio::test]
    async fn edit_form_renders_array_values_plus_trailing_entry() {
        let item = ResourceItem::from_value(json!({
            "id": "9",
            "title": "Loom",
            "tags": ["a", "b"],
        }))
        .unwrap_or_else(|_| unreachable!());

        let model = service()
            .build_form(&definition(), CrudAction::Edit, Some(&item), None)
            .await
            .unwrap_or_else(|_| unreachable!());

        let tag_entries: Vec<_> = model
            .entries
            .iter()
            .filter(|entry| entry.field.display_name().as_str() == "tags")
            .collect();
        assert_eq!(tag_entries.len(), 3);
        assert_eq!(tag_entries[0].old_value, Some(json!("a")));
        assert!(tag_entries[0].show_label);
        assert!(!tag_entries[1].show_label);
        assert_eq!(tag_entries[2].old_value, None);
        assert_eq!(tag_entries[2].index, 2);
    }

    #[tokio::test]
    async fn failed_submission_values_win_over_item_values() {
        let item = ResourceItem::from_value(json!({ "id": "9", "title": "Stored" }))
            .unwrap_or_else(|_| unreachable!());
        let mut old_input = SubmissionPayload::new();
        old_input.insert("title", json!("Submitted"));

        let model = service()
            .build_form(&definition(), CrudAction::Edit, Some(&item), Some(&old_input))
            .await
            .unwrap_or_else(|_| unreachable!());

        let title = model
            .entries
            .iter()
            .find(|entry| entry.field.display_name().as_str() == "title")
            .unwrap_or_else(|| unreachable!());
        assert_eq!(title.old_value, Some(json!("Submitted")));
    }

    #[tokio::test]
    async fn null_old_input_falls_back_to_item_value() {
        let item = ResourceItem::from_value(json!({ "id": "9", "title": "Stored" }))
            .unwrap_or_else(|_| unreachable!());
        let mut old_input = SubmissionPayload::new();
        old_input.insert("title", Value::Null);

        let model = service()
            .build_form(&definition(), CrudAction::Edit, Some(&item), Some(&old_input))
            .await
            .unwrap_or_else(|_| unreachable!());

        let title = model
            .entries
            .iter()
            .find(|entry| entry.field.display_name().as_str() == "title")
            .unwrap_or_else(|| unreachable!());
        assert_eq!(title.old_value, Some(json!("Stored")));
    }

    #[tokio::test]
    async fn linkable_selection_comes_from_item_relationship_value() {
        let item = ResourceItem::from_value(json!({
            "id": "9",
            "title": "Loom",
            "owner": { "id": "2" },
        }))
        .unwrap_or_else(|_| unreachable!());

        let model = service()
            .build_form(&definition(), CrudAction::Edit, Some(&item), None)
            .await
            .unwrap_or_else(|_| unreachable!());

        assert_eq!(model.linkables.len(), 1);
        assert_eq!(model.linkables[0].candidates.len(), 2);
        assert_eq!(model.linkables[0].selected, SelectedLink::One("2".to_owned()));
        assert_eq!(model.linkable_manifest(), "owner");
    }

    #[tokio::test]
    async fn edit_without_item_is_a_precondition_failure() {
        let result = service()
            .build_form(&definition(), CrudAction::Edit, None, None)
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn index_is_not_a_form_action() {
        let result = service()
            .build_form(&definition(), CrudAction::Index, None, None)
            .await;
        assert!(result.is_err());
    }
}
