use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use formloom_application::{LinkCandidate, LinkSource, ResourceGateway};
use formloom_core::{AppError, AppResult};
use formloom_domain::scalar_to_string;

use crate::in_memory_resource_gateway::InMemoryResourceGateway;

/// Registry of in-memory gateways, doubling as the link-candidate source.
///
/// Candidates pair each item's primary identifier with the value of the
/// related definition's declared label field; a definition that wants to be
/// linkable must name that field explicitly.
#[derive(Default)]
pub struct InMemoryGatewayRegistry {
    gateways: BTreeMap<String, Arc<InMemoryResourceGateway>>,
}

impl InMemoryGatewayRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            gateways: BTreeMap::new(),
        }
    }

    /// Registers a gateway under its resource name.
    #[must_use]
    pub fn register(mut self, gateway: Arc<InMemoryResourceGateway>) -> Self {
        self.gateways.insert(
            gateway.definition().name().as_str().to_owned(),
            gateway,
        );
        self
    }

    /// Returns a registered gateway by resource name.
    #[must_use]
    pub fn gateway(&self, resource: &str) -> Option<Arc<InMemoryResourceGateway>> {
        self.gateways.get(resource).cloned()
    }
}

#[async_trait]
impl LinkSource for InMemoryGatewayRegistry {
    async fn candidate_values(&self, related_resource: &str) -> AppResult<Vec<LinkCandidate>> {
        let gateway = self.gateways.get(related_resource).ok_or_else(|| {
            AppError::Internal(format!(
                "no gateway registered for related resource '{related_resource}'"
            ))
        })?;

        let definition = gateway.definition().clone();
        let label_field = definition.label_field().as_str();

        let mut candidates = Vec::new();
        for item in gateway.snapshot_items().await {
            let id = item.primary_identifier(&definition)?;
            let label = item
                .value(label_field)
                .and_then(scalar_to_string)
                .filter(|label| !label.is_empty())
                .unwrap_or_else(|| id.clone());
            candidates.push(LinkCandidate { id, label });
        }

        Ok(candidates)
    }
}
