use std::sync::Arc;
use std::time::Instant;

use super::prompt::build_prompt;
use super::response_parser::parse_slide_plan;
use crate::domain::{DomainError, LanguageModel, PresentationRequest, SlidePlan};
use crate::infrastructure::cache::GenerationCache;
use crate::infrastructure::observability::record_llm_request;

/// One call plus one retry on upstream failure
const MAX_ATTEMPTS: u32 = 2;

/// Turns a request into a validated slide plan
///
/// Plans are shared through the generation cache, so identical requests
/// reach the model at most once while a plan is in flight or cached.
#[derive(Debug, Clone)]
pub struct ContentGenerator {
    model: Arc<dyn LanguageModel>,
    cache: GenerationCache,
}

impl ContentGenerator {
    pub fn new(model: Arc<dyn LanguageModel>, cache: GenerationCache) -> Self {
        Self { model, cache }
    }

    pub fn cache(&self) -> &GenerationCache {
        &self.cache
    }

    pub async fn generate(
        &self,
        request: &PresentationRequest,
    ) -> Result<Arc<SlidePlan>, DomainError> {
        let key = request.cache_key();
        let prompt = build_prompt(request.topic(), request.num_slides());
        let expected = request.num_slides() as usize;
        let model = Arc::clone(&self.model);
        let topic = request.topic().to_string();

        self.cache
            .resolve(&key, move || async move {
                tracing::info!(
                    topic = %topic,
                    num_slides = expected,
                    provider = model.provider_name(),
                    model = model.model_name(),
                    "Generating slide content"
                );

                let raw = complete_with_retry(model.as_ref(), &prompt).await?;

                parse_slide_plan(&raw, expected).inspect_err(|e| {
                    tracing::warn!(topic = %topic, error = %e, "Model output failed validation");
                    tracing::debug!(raw = %raw, "Rejected model output");
                })
            })
            .await
    }
}

async fn complete_with_retry(
    model: &dyn LanguageModel,
    prompt: &str,
) -> Result<String, DomainError> {
    let mut attempt = 1;

    loop {
        let started = Instant::now();
        let result = model.complete(prompt).await;
        record_llm_request(
            model.provider_name(),
            model.model_name(),
            started.elapsed(),
            result.is_ok(),
        );

        match result {
            Ok(text) => return Ok(text),
            Err(e) if e.is_retryable() && attempt < MAX_ATTEMPTS => {
                tracing::warn!(attempt, error = %e, "Language model call failed, retrying");
                attempt += 1;
            }
            Err(e) => {
                tracing::error!(attempt, error = %e, "Language model call failed");
                return Err(e);
            }
        }
    }
}
