use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Minimum topic length in characters
pub const MIN_TOPIC_LENGTH: usize = 3;
/// Maximum topic length in characters
pub const MAX_TOPIC_LENGTH: usize = 100;
/// Minimum number of slides per deck
pub const MIN_SLIDES: u32 = 1;
/// Maximum number of slides per deck
pub const MAX_SLIDES: u32 = 20;
/// Slide count used when the caller does not ask for one
pub const DEFAULT_SLIDES: u32 = 5;

/// Slide aspect ratio, one template per variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "16:9")]
    Widescreen,
    #[serde(rename = "4:3")]
    Standard,
}

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Widescreen => "16:9",
            Self::Standard => "4:3",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "16:9" => Ok(Self::Widescreen),
            "4:3" => Ok(Self::Standard),
            other => Err(DomainError::validation(
                "aspect_ratio",
                format!("unsupported aspect ratio '{}', expected '16:9' or '4:3'", other),
            )),
        }
    }
}

/// A validated request for a deck
///
/// Fields are private so a request can only exist in its validated form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentationRequest {
    topic: String,
    num_slides: u32,
    aspect_ratio: AspectRatio,
}

impl PresentationRequest {
    pub fn new(
        topic: impl Into<String>,
        num_slides: u32,
        aspect_ratio: AspectRatio,
    ) -> Result<Self, DomainError> {
        let topic = topic.into();
        let length = topic.chars().count();

        if !(MIN_TOPIC_LENGTH..=MAX_TOPIC_LENGTH).contains(&length) {
            return Err(DomainError::validation(
                "topic",
                format!(
                    "must be between {} and {} characters, got {}",
                    MIN_TOPIC_LENGTH, MAX_TOPIC_LENGTH, length
                ),
            ));
        }

        if !(MIN_SLIDES..=MAX_SLIDES).contains(&num_slides) {
            return Err(DomainError::validation(
                "num_slides",
                format!(
                    "must be between {} and {}, got {}",
                    MIN_SLIDES, MAX_SLIDES, num_slides
                ),
            ));
        }

        Ok(Self {
            topic,
            num_slides,
            aspect_ratio,
        })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn num_slides(&self) -> u32 {
        self.num_slides
    }

    pub fn aspect_ratio(&self) -> AspectRatio {
        self.aspect_ratio
    }

    pub fn cache_key(&self) -> CacheKey {
        CacheKey::from_request(self)
    }
}

/// Identity of a generated slide plan
///
/// The topic is trimmed and lowercased, so requests differing only in
/// topic casing share a plan.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    topic: String,
    num_slides: u32,
    aspect_ratio: AspectRatio,
}

impl CacheKey {
    pub fn new(topic: &str, num_slides: u32, aspect_ratio: AspectRatio) -> Self {
        Self {
            topic: topic.trim().to_lowercase(),
            num_slides,
            aspect_ratio,
        }
    }

    pub fn from_request(request: &PresentationRequest) -> Self {
        Self::new(request.topic(), request.num_slides(), request.aspect_ratio())
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}|{}", self.topic, self.num_slides, self.aspect_ratio)
    }
}
