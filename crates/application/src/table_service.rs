use std::sync::Arc;

use formloom_core::{AppResult, Subject};
use formloom_domain::{CrudAction, ResourceDefinition, ResourceItem};
use serde_json::Value;

use crate::ports::PolicyEvaluator;
use crate::route_map::RoutePlan;

/// A rendered link to a row or collection action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionLink {
    /// Link text.
    pub label: String,
    /// Target href including any query parameters.
    pub href: String,
}

/// One table row: cell values in column order plus permitted action links.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    /// Serialized cell values in column order.
    pub cells: Vec<Value>,
    /// Action links the policy allowed for this row.
    pub actions: Vec<ActionLink>,
}

/// The assembled index table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableModel {
    /// Column names derived from the first row's serialized field order.
    pub columns: Vec<String>,
    /// Rows in listing order.
    pub rows: Vec<TableRow>,
    /// Collection-level actions, rendered once each.
    pub collection_actions: Vec<ActionLink>,
}

impl TableModel {
    /// Returns whether the table has no rows to show.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A per-row action declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowActionSpec {
    /// Action the link dispatches to.
    pub action: CrudAction,
    /// Link text.
    pub label: String,
    /// Extra query parameters merged into the target path.
    pub query: Vec<(String, String)>,
}

/// A collection-level action declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionActionSpec {
    /// Action the link dispatches to.
    pub action: CrudAction,
    /// Link text.
    pub label: String,
    /// Extra query parameters merged into the target path.
    pub query: Vec<(String, String)>,
}

/// Builds table models from serialized collections.
#[derive(Clone)]
pub struct TableService {
    policy: Arc<dyn PolicyEvaluator>,
}

impl TableService {
    /// Creates a table service over a policy evaluator.
    #[must_use]
    pub fn new(policy: Arc<dyn PolicyEvaluator>) -> Self {
        Self { policy }
    }

    /// Assembles a table for an already-serialized collection.
    ///
    /// Row actions are resolved per row against the policy port and omitted
    /// when it answers `false`; collection actions are declared by the caller
    /// and rendered unconditionally once each.
    pub async fn build_table(
        &self,
        subject: &Subject,
        definition: &ResourceDefinition,
        routes: &RoutePlan,
        items: &[ResourceItem],
        row_actions: &[RowActionSpec],
        collection_actions: &[CollectionActionSpec],
    ) -> AppResult<TableModel> {
        let columns: Vec<String> = items
            .first()
            .map(|item| item.values().keys().cloned().collect())
            .unwrap_or_default();

        let mut rows = Vec::with_capacity(items.len());
        for item in items {
            let cells = columns
                .iter()
                .map(|column| item.value(column).cloned().unwrap_or(Value::Null))
                .collect();

            let id = item.primary_identifier(definition)?;
            let mut actions = Vec::new();
            for spec in row_actions {
                if !self
                    .policy
                    .can(subject, spec.action, definition, Some(item))
                    .await?
                {
                    continue;
                }

                actions.push(ActionLink {
                    label: spec.label.clone(),
                    href: RoutePlan::with_query(
                        action_path(routes, spec.action, &id),
                        &spec.query,
                    ),
                });
            }

            rows.push(TableRow { cells, actions });
        }

        let collection_actions = collection_actions
            .iter()
            .map(|spec| ActionLink {
                label: spec.label.clone(),
                href: RoutePlan::with_query(
                    collection_action_path(routes, spec.action),
                    &spec.query,
                ),
            })
            .collect();

        Ok(TableModel {
            columns,
            rows,
            collection_actions,
        })
    }
}

fn action_path(routes: &RoutePlan, action: CrudAction, id: &str) -> String {
    match action {
        CrudAction::View => routes.show_path(id),
        CrudAction::Edit => routes.edit_path(id),
        CrudAction::Destroy => routes.confirm_delete_path(id),
        CrudAction::Index => routes.index_path(),
        CrudAction::Create => routes.create_path(),
    }
}

fn collection_action_path(routes: &RoutePlan, action: CrudAction) -> String {
    match action {
        CrudAction::Create => routes.create_path(),
        CrudAction::Index => routes.index_path(),
        CrudAction::View | CrudAction::Edit | CrudAction::Destroy => routes.index_path(),
    }
}
