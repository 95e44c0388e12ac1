use async_trait::async_trait;
use formloom_application::PolicyEvaluator;
use formloom_core::{AppResult, Subject};
use formloom_domain::{CrudAction, ResourceDefinition, ResourceItem};

/// Policy evaluator configured from a fixed denial list.
///
/// Stands in for the host application's policy engine; the frontend only ever
/// reads the boolean answer.
#[derive(Debug, Default, Clone)]
pub struct StaticPolicyEvaluator {
    denied: Vec<(CrudAction, String)>,
}

impl StaticPolicyEvaluator {
    /// Creates an evaluator that allows everything.
    #[must_use]
    pub fn allow_all() -> Self {
        Self { denied: Vec::new() }
    }

    /// Denies one action on one resource.
    #[must_use]
    pub fn deny(mut self, action: CrudAction, resource: impl Into<String>) -> Self {
        self.denied.push((action, resource.into()));
        self
    }
}

#[async_trait]
impl PolicyEvaluator for StaticPolicyEvaluator {
    async fn can(
        &self,
        _subject: &Subject,
        action: CrudAction,
        definition: &ResourceDefinition,
        _item: Option<&ResourceItem>,
    ) -> AppResult<bool> {
        let resource = definition.name().as_str();
        Ok(!self
            .denied
            .iter()
            .any(|(denied_action, denied_resource)| {
                *denied_action == action && denied_resource == resource
            }))
    }
}

#[cfg(test)]
mod tests {
    use formloom_application::PolicyEvaluator;
    use formloom_core::Subject;
    use formloom_domain::{CrudAction, FieldDescriptor, FieldType, ResourceDefinition};

    use super::StaticPolicyEvaluator;

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
        ResourceDefinition::new("projects", "Project", "id", vec![id], Vec::new())
            .unwrap_or_else(|_| unreachable!())
    }

    #[tokio::test]
    async fn denials_apply_per_action_and_resource() {
        let policy = StaticPolicyEvaluator::allow_all().deny(CrudAction::Destroy, "projects");
        let subject = Subject::new("u1", "User");

        let denied = policy
            .can(&subject, CrudAction::Destroy, &definition(), None)
            .await
            .unwrap_or_else(|_| unreachable!());
        let allowed = policy
            .can(&subject, CrudAction::Edit, &definition(), None)
            .await
            .unwrap_or_else(|_| unreachable!());
        assert!(!denied);
        assert!(allowed);
    }
}
