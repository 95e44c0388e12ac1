use std::collections::BTreeMap;
use std::sync::Arc;

use formloom_core::{AppError, AppResult, Subject};
use formloom_domain::{
    Cardinality, CrudAction, FormTree, ResourceDefinition, ResourceItem, SubmissionPayload,
    scalar_to_string,
};
use crate::form_service::{FormModel, FormService};
use crate::ports::{GatewayFailure, LinkSource, PolicyEvaluator, ResourceGateway};
use crate::route_map::{ActionRouteMap, GatewayOperation, RoutePlan};
use crate::submission_decoder::decode_submission;
use crate::table_service::{CollectionActionSpec, RowActionSpec, TableModel, TableService};

/// HTTP verb a form submits with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormVerb {
    /// Create submissions.
    Post,
    /// Update submissions.
    Put,
}

impl FormVerb {
    /// Returns the lowercase verb name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Put => "put",
        }
    }
}

/// Everything needed to render a create or edit page.
#[derive(Debug, Clone, PartialEq)]
pub struct FormView {
    /// The assembled form.
    pub model: FormModel,
    /// Submission target URL.
    pub action_url: String,
    /// Submission verb.
    pub verb: FormVerb,
}

/// A relationship table shown on a detail page.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipTable {
    /// Relationship title.
    pub title: String,
    /// Relationship cardinality, which decides the placement in the page.
    pub cardinality: Cardinality,
    /// The child resource table.
    pub table: TableModel,
}

/// Everything needed to render a detail page.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailModel {
    /// The serialized item.
    pub item: ResourceItem,
    /// Child tables for relationships with a registered child frontend.
    pub relationships: Vec<RelationshipTable>,
}

/// Everything needed to render a delete confirmation page.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmModel {
    /// The serialized item about to be removed.
    pub item: ResourceItem,
    /// Destroy submission URL.
    pub destroy_url: String,
    /// URL of the "No" link.
    pub back_url: String,
}

/// Outcome of a store or update submission.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// The gateway accepted the payload.
    Saved {
        /// The resulting serialized item.
        item: ResourceItem,
        /// Flash message for the next page.
        message: String,
    },
    /// The gateway rejected the payload with a structured validation error.
    Rejected {
        /// Flash lines: the top-level message plus one line per issue.
        message_lines: Vec<String>,
        /// Decoded input, preserved so the form can be redisplayed.
        old_input: SubmissionPayload,
    },
}

/// CRUD frontend orchestration for one resource.
///
/// All persistence and final validation are delegated to the gateway; this
/// service shapes form models and payloads, reflects the policy port in which
/// links it emits, and resolves post-save redirects.
#[derive(Clone)]
pub struct CrudService {
    gateway: Arc<dyn ResourceGateway>,
    route_map: ActionRouteMap,
    routes: RoutePlan,
    policy: Arc<dyn PolicyEvaluator>,
    form_service: FormService,
    table_service: TableService,
    children: BTreeMap<String, Arc<CrudService>>,
}

impl CrudService {
    /// Creates a CRUD service from its collaborators.
    #[must_use]
    pub fn new(
        gateway: Arc<dyn ResourceGateway>,
        route_map: ActionRouteMap,
        routes: RoutePlan,
        policy: Arc<dyn PolicyEvaluator>,
        link_source: Arc<dyn LinkSource>,
    ) -> Self {
        Self {
            gateway,
            route_map,
            routes: routes.clone(),
            policy: policy.clone(),
            form_service: FormService::new(link_source),
            table_service: TableService::new(policy),
            children: BTreeMap::new(),
        }
    }

    /// Registers the frontend serving a related resource, enabling child
    /// tables on detail pages.
    #[must_use]
    pub fn with_child(mut self, related_resource: impl Into<String>, child: Arc<Self>) -> Self {
        self.children.insert(related_resource.into(), child);
        self
    }

    /// Returns the served resource definition.
    #[must_use]
    pub fn definition(&self) -> &ResourceDefinition {
        self.gateway.definition()
    }

    /// Returns the route plan of this frontend.
    #[must_use]
    pub fn routes(&self) -> &RoutePlan {
        &self.routes
    }

    /// Returns whether an action has a mapped gateway operation.
    #[must_use]
    pub fn supports(&self, action: CrudAction) -> bool {
        self.route_map.supports(action)
    }

    /// Builds the index table: the full listing plus policy-gated row and
    /// collection actions.
    pub async fn index(&self, subject: &Subject, current_path: &str) -> AppResult<TableModel> {
        let items = self.dispatch_list(subject).await?;
        self.table_for_items(subject, &items, current_path).await
    }

    /// Builds a table for an already-fetched collection of this resource.
    pub async fn table_for_items(
        &self,
        subject: &Subject,
        items: &[ResourceItem],
        current_path: &str,
    ) -> AppResult<TableModel> {
        let definition = self.definition();
        let return_query = vec![("return".to_owned(), current_path.to_owned())];

        let mut row_actions = Vec::new();
        if self.supports(CrudAction::View) {
            row_actions.push(RowActionSpec {
                action: CrudAction::View,
                label: self.action_text(CrudAction::View),
                query: Vec::new(),
            });
        }
        if self.supports(CrudAction::Edit) {
            row_actions.push(RowActionSpec {
                action: CrudAction::Edit,
                label: self.action_text(CrudAction::Edit),
                query: return_query.clone(),
            });
        }
        if self.supports(CrudAction::Destroy) {
            row_actions.push(RowActionSpec {
                action: CrudAction::Destroy,
                label: self.action_text(CrudAction::Destroy),
                query: return_query.clone(),
            });
        }

        let mut collection_actions = Vec::new();
        if self.supports(CrudAction::Create)
            && self
                .policy
                .can(subject, CrudAction::Create, definition, None)
                .await?
        {
            collection_actions.push(CollectionActionSpec {
                action: CrudAction::Create,
                label: self.action_text(CrudAction::Create),
                query: return_query,
            });
        }

        self.table_service
            .build_table(
                subject,
                definition,
                &self.routes,
                items,
                &row_actions,
                &collection_actions,
            )
            .await
    }

    /// Builds the create form view.
    pub async fn create_form(&self, old_input: Option<&SubmissionPayload>) -> AppResult<FormView> {
        let model = self
            .form_service
            .build_form(self.definition(), CrudAction::Create, None, old_input)
            .await?;

        Ok(FormView {
            model,
            action_url: self.routes.store_path(),
            verb: FormVerb::Post,
        })
    }

    /// Fetches the item and builds the edit form view.
    pub async fn edit_form(
        &self,
        subject: &Subject,
        id: &str,
        old_input: Option<&SubmissionPayload>,
    ) -> AppResult<FormView> {
        let item = self.dispatch_fetch(subject, id).await?;
        let model = self
            .form_service
            .build_form(self.definition(), CrudAction::Edit, Some(&item), old_input)
            .await?;

        Ok(FormView {
            model,
            action_url: self.routes.update_path(id),
            verb: FormVerb::Put,
        })
    }

    /// Decodes a create submission and hands it to the gateway.
    pub async fn store(&self, subject: &Subject, tree: &FormTree) -> AppResult<SubmitOutcome> {
        let payload = decode_submission(tree);

        match self.dispatch_store(subject, payload.clone()).await {
            Ok(item) => Ok(SubmitOutcome::Saved {
                item,
                message: format!(
                    "A new {} was born...",
                    self.definition().entity_name().as_str()
                ),
            }),
            Err(GatewayFailure::Rejected(rejection)) => Ok(SubmitOutcome::Rejected {
                message_lines: rejection.message_lines(),
                old_input: payload,
            }),
            Err(GatewayFailure::Error(error)) => Err(error),
        }
    }

    /// Decodes an update submission and hands it to the gateway.
    pub async fn update(
        &self,
        subject: &Subject,
        id: &str,
        tree: &FormTree,
    ) -> AppResult<SubmitOutcome> {
        let payload = decode_submission(tree);

        match self.dispatch_update(subject, id, payload.clone()).await {
            Ok(item) => Ok(SubmitOutcome::Saved {
                item,
                message: "Saved.".to_owned(),
            }),
            Err(GatewayFailure::Rejected(rejection)) => Ok(SubmitOutcome::Rejected {
                message_lines: rejection.message_lines(),
                old_input: payload,
            }),
            Err(GatewayFailure::Error(error)) => Err(error),
        }
    }

    /// Fetches the item and the child tables for its relationships.
    pub async fn show(
        &self,
        subject: &Subject,
        id: &str,
        current_path: &str,
    ) -> AppResult<DetailModel> {
        let item = self.dispatch_fetch(subject, id).await?;
        let definition = self.definition();

        let mut relationships = Vec::new();
        for relationship in definition.relationships() {
            let Some(child) = self.children.get(relationship.related_resource().as_str()) else {
                continue;
            };

            let linked_ids = item
                .value(relationship.display_name().as_str())
                .map(related_ids)
                .unwrap_or_default();

            let child_definition = child.definition();
            let child_items: Vec<ResourceItem> = child
                .dispatch_list(subject)
                .await?
                .into_iter()
                .filter(|child_item| {
                    child_item
                        .primary_identifier(child_definition)
                        .map(|child_id| linked_ids.iter().any(|linked| linked == &child_id))
                        .unwrap_or(false)
                })
                .collect();

            relationships.push(RelationshipTable {
                title: relationship.label().as_str().to_owned(),
                cardinality: relationship.cardinality(),
                table: child
                    .table_for_items(subject, &child_items, current_path)
                    .await?,
            });
        }

        Ok(DetailModel {
            item,
            relationships,
        })
    }

    /// Fetches the item for the delete confirmation page.
    pub async fn confirm_delete(&self, subject: &Subject, id: &str) -> AppResult<ConfirmModel> {
        let item = self.dispatch_fetch(subject, id).await?;
        Ok(ConfirmModel {
            item,
            destroy_url: self.routes.destroy_path(id),
            back_url: self.routes.index_path(),
        })
    }

    /// Fetches the item, deletes it, and returns the flash message.
    pub async fn destroy(
        &self,
        subject: &Subject,
        id: &str,
    ) -> AppResult<(ResourceItem, String)> {
        let item = self.dispatch_fetch(subject, id).await?;
        self.dispatch_delete(subject, id).await?;
        Ok((item, "Deleted.".to_owned()))
    }

    /// Resolves where to redirect after a successful store/update/destroy.
    ///
    /// A stashed return URL wins, with `{<identifier display name>}`
    /// placeholders substituted from the resulting item; otherwise the index
    /// page when the policy allows it, else the item's detail or edit page,
    /// else the site root.
    pub async fn after_save_redirect(
        &self,
        subject: &Subject,
        stored_return: Option<&str>,
        item: Option<&ResourceItem>,
    ) -> AppResult<String> {
        let definition = self.definition();

        if let Some(return_to) = stored_return.filter(|value| !value.trim().is_empty()) {
            let mut target = return_to.to_owned();
            if let Some(item) = item {
                for identifier in definition.identifiers() {
                    let name = identifier.display_name().as_str();
                    if let Some(value) = item.value(name).and_then(scalar_to_string) {
                        target = target.replace(&format!("{{{name}}}"), &value);
                    }
                }
            }
            return Ok(target);
        }

        if self
            .policy
            .can(subject, CrudAction::Index, definition, None)
            .await?
        {
            return Ok(self.routes.index_path());
        }

        if let Some(item) = item {
            let id = item.primary_identifier(definition)?;
            if self.supports(CrudAction::View)
                && self
                    .policy
                    .can(subject, CrudAction::View, definition, Some(item))
                    .await?
            {
                return Ok(self.routes.show_path(&id));
            }
            if self.supports(CrudAction::Edit)
                && self
                    .policy
                    .can(subject, CrudAction::Edit, definition, Some(item))
                    .await?
            {
                return Ok(self.routes.edit_path(&id));
            }
        }

        Ok("/".to_owned())
    }

    fn action_text(&self, action: CrudAction) -> String {
        match action {
            CrudAction::Create => {
                format!("Create {}", self.definition().entity_name().as_str())
            }
            CrudAction::Edit => "Edit".to_owned(),
            CrudAction::View => "View".to_owned(),
            CrudAction::Destroy => "Delete".to_owned(),
            CrudAction::Index => "Index".to_owned(),
        }
    }

    async fn dispatch_list(&self, subject: &Subject) -> AppResult<Vec<ResourceItem>> {
        match self.route_map.resolve(CrudAction::Index)? {
            GatewayOperation::List => self.gateway.list(subject).await,
            other => Err(self.mismatch(CrudAction::Index, other)),
        }
    }

    async fn dispatch_fetch(&self, subject: &Subject, id: &str) -> AppResult<ResourceItem> {
        match self.route_map.resolve(CrudAction::View)? {
            GatewayOperation::Fetch => self.gateway.fetch(subject, id).await,
            other => Err(self.mismatch(CrudAction::View, other)),
        }
    }

    async fn dispatch_store(
        &self,
        subject: &Subject,
        payload: SubmissionPayload,
    ) -> Result<ResourceItem, GatewayFailure> {
        match self.route_map.resolve(CrudAction::Create)? {
            GatewayOperation::Store => self.gateway.store(subject, payload).await,
            other => Err(self.mismatch(CrudAction::Create, other).into()),
        }
    }

    async fn dispatch_update(
        &self,
        subject: &Subject,
        id: &str,
        payload: SubmissionPayload,
    ) -> Result<ResourceItem, GatewayFailure> {
        match self.route_map.resolve(CrudAction::Edit)? {
            GatewayOperation::Update => self.gateway.update(subject, id, payload).await,
            other => Err(self.mismatch(CrudAction::Edit, other).into()),
        }
    }

    async fn dispatch_delete(&self, subject: &Subject, id: &str) -> AppResult<()> {
        match self.route_map.resolve(CrudAction::Destroy)? {
            GatewayOperation::Delete => self.gateway.delete(subject, id).await,
            other => Err(self.mismatch(CrudAction::Destroy, other)),
        }
    }

    fn mismatch(&self, action: CrudAction, operation: GatewayOperation) -> AppError {
        AppError::Internal(format!(
            "action '{}' cannot dispatch to gateway operation '{}'",
            action.as_str(),
            operation.as_str()
        ))
    }
}

/// Extracts identifiers from a serialized relationship value.
fn related_ids(value: &serde_json::Value) -> Vec<String> {
    use serde_json::Value;

    match value {
        Value::Object(object) => {
            if let Some(items) = object.get("items").and_then(Value::as_array) {
                return items.iter().flat_map(related_ids).collect();
            }
            object
                .get("id")
                .and_then(scalar_to_string)
                .filter(|id| !id.is_empty())
                .map(|id| vec![id])
                .unwrap_or_default()
        }
        Value::Array(items) => items.iter().flat_map(related_ids).collect(),
        other => scalar_to_string(other)
            .filter(|id| !id.is_empty())
            .map(|id| vec![id])
            .unwrap_or_default(),
    }
}
