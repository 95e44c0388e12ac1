use async_trait::async_trait;
use formloom_application::{GatewayFailure, GatewayRejection, GatewayResult, ResourceGateway};
use formloom_core::{AppError, AppResult, Subject};
use formloom_domain::{ResourceDefinition, ResourceItem, SubmissionPayload, scalar_to_string};
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// In-memory stand-in for the external API layer.
///
/// Performs the final validation the frontend defers: unknown keys,
/// enumerated values outside the allowed set, and a missing label-field value
/// are rejected with the structured `{message, issues}` shape.
pub struct InMemoryResourceGateway {
    definition: ResourceDefinition,
    records: RwLock<Vec<(String, Map<String, Value>)>>,
}

impl InMemoryResourceGateway {
    /// Creates an empty gateway for a resource definition.
    #[must_use]
    pub fn new(definition: ResourceDefinition) -> Self {
        Self {
            definition,
            records: RwLock::new(Vec::new()),
        }
    }

    /// Returns the current serialized collection without an acting subject;
    /// used by the link-candidate source.
    pub async fn snapshot_items(&self) -> Vec<ResourceItem> {
        let records = self.records.read().await;
        records
            .iter()
            .map(|(id, values)| self.serialize(id, values))
            .collect()
    }

    fn serialize(&self, id: &str, values: &Map<String, Value>) -> ResourceItem {
        let identifier_name = self.definition.primary_identifier().display_name().as_str();

        let mut serialized = Map::new();
        for field in self.definition.fields() {
            let name = field.display_name().as_str();
            if field.is_identifier() && name == identifier_name {
                serialized.insert(name.to_owned(), Value::String(id.to_owned()));
                continue;
            }

            serialized.insert(
                name.to_owned(),
                values.get(name).cloned().unwrap_or(Value::Null),
            );
        }

        for relationship in self.definition.relationships() {
            let name = relationship.display_name().as_str();
            serialized.insert(
                name.to_owned(),
                values.get(name).cloned().unwrap_or(Value::Null),
            );
        }

        ResourceItem::new(serialized)
    }

    fn validate(&self, payload: &SubmissionPayload, creating: bool) -> Vec<(String, Vec<String>)> {
        let mut issues: Vec<(String, Vec<String>)> = Vec::new();
        let mut push_issue = |name: &str, message: String| {
            if let Some((_, existing)) = issues.iter_mut().find(|(issue, _)| issue == name) {
                existing.push(message);
            } else {
                issues.push((name.to_owned(), vec![message]));
            }
        };

        for (name, value) in payload.values() {
            let Some(field) = self.definition.field(name) else {
                if self.definition.relationship(name).is_none() {
                    push_issue(name, format!("unknown field '{name}'"));
                }
                continue;
            };

            if field.allowed_values().is_empty() {
                continue;
            }

            let submitted: Vec<&Value> = match value {
                Value::Array(items) => items.iter().collect(),
                Value::Null => Vec::new(),
                other => vec![other],
            };
            for entry in submitted {
                let text = scalar_to_string(entry).unwrap_or_default();
                if !text.is_empty() && !field.allowed_values().iter().any(|allowed| allowed == &text)
                {
                    push_issue(name, format!("value '{text}' is not allowed for '{name}'"));
                }
            }
        }

        let label_name = self.definition.label_field().as_str();
        let label_value = payload.get(label_name);
        let label_missing = match label_value {
            Some(value) => scalar_to_string(value).is_none_or(|text| text.trim().is_empty()),
            None => creating,
        };
        if label_missing && self.definition.field(label_name).is_some() {
            push_issue(label_name, format!("the {label_name} field is required"));
        }

        issues
    }

    fn reject(&self, issues: Vec<(String, Vec<String>)>) -> GatewayFailure {
        GatewayFailure::Rejected(GatewayRejection {
            message: format!(
                "Could not save {}.",
                self.definition.entity_name().as_str()
            ),
            issues,
        })
    }
}

#[async_trait]
impl ResourceGateway for InMemoryResourceGateway {
    fn definition(&self) -> &ResourceDefinition {
        &self.definition
    }

    async fn list(&self, _subject: &Subject) -> AppResult<Vec<ResourceItem>> {
        Ok(self.snapshot_items().await)
    }

    async fn fetch(&self, _subject: &Subject, id: &str) -> AppResult<ResourceItem> {
        let records = self.records.read().await;
        records
            .iter()
            .find(|(record_id, _)| record_id == id)
            .map(|(record_id, values)| self.serialize(record_id, values))
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "no {} with identifier '{id}'",
                    self.definition.entity_name().as_str()
                ))
            })
    }

    async fn store(
        &self,
        _subject: &Subject,
        payload: SubmissionPayload,
    ) -> GatewayResult<ResourceItem> {
        let issues = self.validate(&payload, true);
        if !issues.is_empty() {
            return Err(self.reject(issues));
        }

        let id = Uuid::new_v4().to_string();
        let mut values = Map::new();
        for (name, value) in payload.values() {
            values.insert(name.clone(), value.clone());
        }

        debug!(resource = self.definition.name().as_str(), %id, "stored record");

        let mut records = self.records.write().await;
        records.push((id.clone(), values.clone()));
        Ok(self.serialize(&id, &values))
    }

    async fn update(
        &self,
        _subject: &Subject,
        id: &str,
        payload: SubmissionPayload,
    ) -> GatewayResult<ResourceItem> {
        let issues = self.validate(&payload, false);
        if !issues.is_empty() {
            return Err(self.reject(issues));
        }

        let mut records = self.records.write().await;
        let Some((_, values)) = records.iter_mut().find(|(record_id, _)| record_id == id) else {
            return Err(GatewayFailure::Error(AppError::NotFound(format!(
                "no {} with identifier '{id}'",
                self.definition.entity_name().as_str()
            ))));
        };

        for (name, value) in payload.values() {
            values.insert(name.clone(), value.clone());
        }

        debug!(resource = self.definition.name().as_str(), id, "updated record");

        let values = values.clone();
        Ok(self.serialize(id, &values))
    }

    async fn delete(&self, _subject: &Subject, id: &str) -> AppResult<()> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|(record_id, _)| record_id != id);

        if records.len() == before {
            return Err(AppError::NotFound(format!(
                "no {} with identifier '{id}'",
                self.definition.entity_name().as_str()
            )));
        }

        debug!(resource = self.definition.name().as_str(), id, "deleted record");
        Ok(())
    }
}
