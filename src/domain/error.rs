use thiserror::Error;

/// Core domain errors
///
/// `Clone` because a single failed generation is handed to every caller
/// waiting on the same in-flight plan.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Validation error: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Rate limit exceeded, retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Upstream error: {provider} - {message}")]
    Upstream { provider: String, message: String },

    #[error("Generated content is invalid{}: {message}", location(.slide, .field))]
    GenerationValidation {
        slide: Option<usize>,
        field: Option<String>,
        message: String,
    },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

fn location(slide: &Option<usize>, field: &Option<String>) -> String {
    match (slide, field) {
        (Some(slide), Some(field)) => format!(" (slide {}, field '{}')", slide, field),
        (Some(slide), None) => format!(" (slide {})", slide),
        (None, Some(field)) => format!(" (field '{}')", field),
        (None, None) => String::new(),
    }
}

impl DomainError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn rate_limited(retry_after_secs: u64) -> Self {
        Self::RateLimited { retry_after_secs }
    }

    pub fn upstream(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Upstream {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Model output that does not describe a usable slide plan
    pub fn generation(message: impl Into<String>) -> Self {
        Self::GenerationValidation {
            slide: None,
            field: None,
            message: message.into(),
        }
    }

    /// Model output problem pinned to one slide and field
    pub fn generation_at(
        slide: usize,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::GenerationValidation {
            slide: Some(slide),
            field: Some(field.into()),
            message: message.into(),
        }
    }

    pub fn render(message: impl Into<String>) -> Self {
        Self::Render {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Short machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation_error",
            Self::RateLimited { .. } => "rate_limited",
            Self::Upstream { .. } => "upstream_error",
            Self::GenerationValidation { .. } => "generation_error",
            Self::Render { .. } => "render_error",
            Self::Configuration { .. } => "configuration_error",
            Self::Internal { .. } => "internal_error",
        }
    }

    /// Whether a fresh attempt with the same input may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Upstream { .. })
    }
}
