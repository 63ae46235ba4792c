//! API request and error types

mod error;
mod json;
mod request;

pub use error::{ApiError, ApiErrorDetail, ApiErrorResponse, ApiErrorType, FieldError};
pub use json::Json;
pub use request::GenerateRequestBody;
