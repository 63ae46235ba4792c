use std::sync::Arc;

use super::http_client::HttpClient;
use super::{GeminiModel, OpenAiModel};
use crate::config::{LlmConfig, LlmProviderKind};
use crate::domain::{DomainError, LanguageModel};

/// Factory for creating the configured language model
#[derive(Debug)]
pub struct LanguageModelFactory;

impl LanguageModelFactory {
    /// Create a language model from configuration
    ///
    /// The API key comes from `llm.api_key` or the provider's environment
    /// variable; without one this is a configuration error.
    pub fn create(config: &LlmConfig) -> Result<Arc<dyn LanguageModel>, DomainError> {
        Self::create_with_key(config, config.resolve_api_key())
    }

    fn create_with_key(
        config: &LlmConfig,
        api_key: Option<String>,
    ) -> Result<Arc<dyn LanguageModel>, DomainError> {
        let api_key = api_key.ok_or_else(|| {
            DomainError::configuration(format!(
                "No API key for provider '{}': set llm.api_key or {}",
                config.provider,
                config.provider.api_key_env_var()
            ))
        })?;

        if config.model.trim().is_empty() {
            return Err(DomainError::configuration("llm.model must not be empty"));
        }

        let http_client = HttpClient::new();

        let model: Arc<dyn LanguageModel> = match (config.provider, config.base_url.as_deref()) {
            (LlmProviderKind::Gemini, Some(base_url)) => Arc::new(GeminiModel::with_base_url(
                http_client,
                api_key,
                &config.model,
                base_url,
            )),
            (LlmProviderKind::Gemini, None) => {
                Arc::new(GeminiModel::new(http_client, api_key, &config.model))
            }
            (LlmProviderKind::OpenAi, Some(base_url)) => Arc::new(OpenAiModel::with_base_url(
                http_client,
                api_key,
                &config.model,
                base_url,
            )),
            (LlmProviderKind::OpenAi, None) => {
                Arc::new(OpenAiModel::new(http_client, api_key, &config.model))
            }
        };

        Ok(model)
    }
}
