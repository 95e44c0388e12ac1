use async_trait::async_trait;
use formloom_core::{AppError, AppResult, Subject};
use formloom_domain::{CrudAction, ResourceDefinition, ResourceItem, SubmissionPayload};

/// One selectable link target offered by a related resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkCandidate {
    /// Identifier submitted when the candidate is picked.
    pub id: String,
    /// Display label, produced by the related definition's label field.
    pub label: String,
}

/// Structured validation rejection returned by the external API layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayRejection {
    /// Top-level error message.
    pub message: String,
    /// Per-field issue lines, in the order the gateway reported them.
    pub issues: Vec<(String, Vec<String>)>,
}

impl GatewayRejection {
    /// Flattens the rejection into user-visible message lines.
    #[must_use]
    pub fn message_lines(&self) -> Vec<String> {
        let mut lines = vec![self.message.clone()];
        for (_, errors) in &self.issues {
            lines.extend(errors.iter().cloned());
        }

        lines
    }
}

/// Failure modes of a gateway write.
#[derive(Debug)]
pub enum GatewayFailure {
    /// The payload was rejected with a structured validation response; the
    /// form is redisplayed with the submitted values preserved.
    Rejected(GatewayRejection),
    /// A hard error that propagates to the caller.
    Error(AppError),
}

impl From<AppError> for GatewayFailure {
    fn from(value: AppError) -> Self {
        Self::Error(value)
    }
}

/// Result type for gateway writes.
pub type GatewayResult<T> = Result<T, GatewayFailure>;

/// The external API layer a resource frontend delegates to.
///
/// All persistence, final validation, and business logic live behind this
/// port; the frontend only shapes payloads and renders responses.
#[async_trait]
pub trait ResourceGateway: Send + Sync {
    /// Returns the resource definition served by this gateway.
    fn definition(&self) -> &ResourceDefinition;

    /// Lists the full serialized collection.
    async fn list(&self, subject: &Subject) -> AppResult<Vec<ResourceItem>>;

    /// Fetches one serialized item by identifier.
    async fn fetch(&self, subject: &Subject, id: &str) -> AppResult<ResourceItem>;

    /// Creates an item from a decoded submission payload.
    async fn store(
        &self,
        subject: &Subject,
        payload: SubmissionPayload,
    ) -> GatewayResult<ResourceItem>;

    /// Updates an item from a decoded submission payload.
    async fn update(
        &self,
        subject: &Subject,
        id: &str,
        payload: SubmissionPayload,
    ) -> GatewayResult<ResourceItem>;

    /// Deletes an item by identifier.
    async fn delete(&self, subject: &Subject, id: &str) -> AppResult<()>;
}

/// Source of candidate values for linkable relationship fields.
///
/// Candidates are fetched fresh from the related resource's full listing on
/// every form render; there is no caching layer in front of this port.
#[async_trait]
pub trait LinkSource: Send + Sync {
    /// Returns the full ordered candidate list for a related resource.
    async fn candidate_values(&self, related_resource: &str) -> AppResult<Vec<LinkCandidate>>;
}

/// Host-supplied authorization predicate.
///
/// The frontend never evaluates policy itself; it only omits UI actions the
/// host answers `false` for.
#[async_trait]
pub trait PolicyEvaluator: Send + Sync {
    /// Returns whether `subject` may perform `action`, optionally scoped to a
    /// concrete item.
    async fn can(
        &self,
        subject: &Subject,
        action: CrudAction,
        definition: &ResourceDefinition,
        item: Option<&ResourceItem>,
    ) -> AppResult<bool>;
}
