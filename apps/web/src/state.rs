use std::collections::BTreeMap;
use std::sync::Arc;

use formloom_application::CrudService;
use formloom_core::{AppError, AppResult, Subject};

/// Shared state for all CRUD handlers.
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<BTreeMap<String, Arc<CrudService>>>,
    pub site_title: String,
}

impl AppState {
    /// Resolves the frontend service for a resource path segment.
    pub fn service(&self, resource: &str) -> AppResult<Arc<CrudService>> {
        self.services.get(resource).cloned().ok_or_else(|| {
            AppError::NotFound(format!("no resource mounted at '/{resource}'"))
        })
    }

    /// Returns the acting subject for the request.
    ///
    /// Authentication is the host application's concern; the demo wiring acts
    /// as a single fixed subject.
    pub fn subject(&self) -> Subject {
        Subject::new("demo", "Demo User")
    }
}
