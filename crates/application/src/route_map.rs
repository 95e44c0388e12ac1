use std::collections::BTreeMap;

use formloom_core::{AppError, AppResult};
use formloom_domain::CrudAction;

/// Gateway operations a CRUD action can dispatch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayOperation {
    /// List the collection.
    List,
    /// Fetch a single item.
    Fetch,
    /// Create an item.
    Store,
    /// Update an item.
    Update,
    /// Delete an item.
    Delete,
}

impl GatewayOperation {
    /// Returns a stable name for error messages.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Fetch => "fetch",
            Self::Store => "store",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// Explicit action-to-gateway-operation configuration.
///
/// Passed to the CRUD service at construction; actions absent from the map
/// are unsupported, their UI links are never rendered, and dispatching them
/// is a precondition failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRouteMap {
    operations: BTreeMap<CrudAction, GatewayOperation>,
}

impl ActionRouteMap {
    /// Creates an empty route map.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            operations: BTreeMap::new(),
        }
    }

    /// Maps an action to a gateway operation.
    #[must_use]
    pub fn with_operation(mut self, action: CrudAction, operation: GatewayOperation) -> Self {
        self.operations.insert(action, operation);
        self
    }

    /// Removes an action from the map.
    #[must_use]
    pub fn without(mut self, action: CrudAction) -> Self {
        self.operations.remove(&action);
        self
    }

    /// Returns whether the action has a mapped operation.
    #[must_use]
    pub fn supports(&self, action: CrudAction) -> bool {
        self.operations.contains_key(&action)
    }

    /// Resolves the mapped operation or fails with a precondition error.
    pub fn resolve(&self, action: CrudAction) -> AppResult<GatewayOperation> {
        self.operations.get(&action).copied().ok_or_else(|| {
            AppError::Internal(format!(
                "no gateway operation mapped for action '{}'",
                action.as_str()
            ))
        })
    }
}

impl Default for ActionRouteMap {
    /// The full CRUD mapping.
    fn default() -> Self {
        Self::empty()
            .with_operation(CrudAction::Index, GatewayOperation::List)
            .with_operation(CrudAction::Create, GatewayOperation::Store)
            .with_operation(CrudAction::View, GatewayOperation::Fetch)
            .with_operation(CrudAction::Edit, GatewayOperation::Update)
            .with_operation(CrudAction::Destroy, GatewayOperation::Delete)
    }
}

/// URL layout for one resource frontend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePlan {
    base_path: String,
}

impl RoutePlan {
    /// Creates a route plan rooted at `base_path` (for example `/projects`).
    pub fn new(base_path: impl Into<String>) -> AppResult<Self> {
        let base_path = base_path.into();
        if !base_path.starts_with('/') || base_path.ends_with('/') {
            return Err(AppError::Validation(format!(
                "route base path '{base_path}' must start with '/' and not end with one"
            )));
        }

        Ok(Self { base_path })
    }

    /// Returns the collection listing path.
    #[must_use]
    pub fn index_path(&self) -> String {
        self.base_path.clone()
    }

    /// Returns the create-form path.
    #[must_use]
    pub fn create_path(&self) -> String {
        format!("{}/create", self.base_path)
    }

    /// Returns the store submission path.
    #[must_use]
    pub fn store_path(&self) -> String {
        self.base_path.clone()
    }

    /// Returns the detail path for an item.
    #[must_use]
    pub fn show_path(&self, id: &str) -> String {
        format!("{}/{id}", self.base_path)
    }

    /// Returns the edit-form path for an item.
    #[must_use]
    pub fn edit_path(&self, id: &str) -> String {
        format!("{}/{id}/edit", self.base_path)
    }

    /// Returns the update submission path for an item.
    #[must_use]
    pub fn update_path(&self, id: &str) -> String {
        format!("{}/{id}", self.base_path)
    }

    /// Returns the delete-confirmation path for an item.
    #[must_use]
    pub fn confirm_delete_path(&self, id: &str) -> String {
        format!("{}/{id}/delete", self.base_path)
    }

    /// Returns the destroy submission path for an item.
    #[must_use]
    pub fn destroy_path(&self, id: &str) -> String {
        format!("{}/{id}/destroy", self.base_path)
    }

    /// Appends query parameters to a path.
    #[must_use]
    pub fn with_query(path: String, parameters: &[(String, String)]) -> String {
        if parameters.is_empty() {
            return path;
        }

        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (name, value) in parameters {
            serializer.append_pair(name, value);
        }

        format!("{path}?{}", serializer.finish())
    }
}
