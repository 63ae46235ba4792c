//! Request bodies

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::presentation::DEFAULT_SLIDES;
use crate::domain::{AspectRatio, DomainError, PresentationRequest};

/// Body of `POST /generate`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GenerateRequestBody {
    #[validate(length(min = 3, max = 100, message = "topic must be between 3 and 100 characters"))]
    pub topic: String,

    #[serde(default)]
    #[validate(range(min = 1, max = 20, message = "num_slides must be between 1 and 20"))]
    pub num_slides: Option<u32>,

    #[serde(default)]
    pub aspect_ratio: Option<AspectRatio>,
}

impl GenerateRequestBody {
    /// Convert into a domain request, applying defaults
    pub fn into_request(self) -> Result<PresentationRequest, DomainError> {
        PresentationRequest::new(
            self.topic,
            self.num_slides.unwrap_or(DEFAULT_SLIDES),
            self.aspect_ratio.unwrap_or_default(),
        )
    }
}
