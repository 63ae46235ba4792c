use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::DomainError;

/// Text completion backend that writes slide content
///
/// The response is untyped text; callers validate its shape.
#[async_trait]
pub trait LanguageModel: Send + Sync + Debug {
    /// Complete a prompt, failing with `DomainError::Upstream` on
    /// network, quota or provider errors
    async fn complete(&self, prompt: &str) -> Result<String, DomainError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;

    /// Model identifier sent to the provider
    fn model_name(&self) -> &str;
}
