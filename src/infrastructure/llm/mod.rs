//! Language model backends

mod factory;
mod gemini;
pub mod http_client;
mod openai;

pub use factory::LanguageModelFactory;
pub use gemini::GeminiModel;
pub use http_client::{HttpClient, HttpClientTrait};
pub use openai::OpenAiModel;

use crate::domain::DomainError;

/// Attribute a transport-level upstream error to a provider
pub(crate) fn tag_upstream(provider: &str, error: DomainError) -> DomainError {
    match error {
        DomainError::Upstream { message, .. } => DomainError::upstream(provider, message),
        other => other,
    }
}
