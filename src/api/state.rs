//! Shared application state for HTTP handlers

use std::sync::Arc;

use axum::extract::FromRef;

use super::middleware::ClientIdPolicy;
use crate::infrastructure::{GenerationCache, PipelineOrchestrator};

/// State cloned into every handler
#[derive(Clone, Debug)]
pub struct AppState {
    pub pipeline: Arc<PipelineOrchestrator>,
    pub client_id: ClientIdPolicy,
}

impl AppState {
    pub fn new(pipeline: PipelineOrchestrator) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            client_id: ClientIdPolicy::default(),
        }
    }

    pub fn with_client_id_policy(mut self, policy: ClientIdPolicy) -> Self {
        self.client_id = policy;
        self
    }

    pub fn cache(&self) -> &GenerationCache {
        self.pipeline.generator().cache()
    }
}

impl FromRef<AppState> for ClientIdPolicy {
    fn from_ref(state: &AppState) -> Self {
        state.client_id
    }
}
