//! JSON extractor whose rejections use the API error body

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json as AxumJson,
};
use serde::de::DeserializeOwned;
use serde_json::error::Category;

use super::error::{ApiError, ApiErrorType, FieldError};

const PARSE_ERROR_CODE: &str = "json_parse_error";

/// JSON body extractor answering with an `ApiError` body: 400 for syntax,
/// 415 for content type, 422 for data errors with the offending field
/// listed in `fields`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<S, T> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !has_json_content_type(req.headers()) {
            return Err(reject(ApiError::new(
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                ApiErrorType::InvalidRequestError,
                "Missing Content-Type header. Expected 'application/json'.",
            )));
        }

        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            reject(ApiError::new(
                rejection.status(),
                ApiErrorType::InvalidRequestError,
                format!("Failed to read request body: {}", rejection.body_text()),
            ))
        })?;

        decode(&bytes).map(Json).map_err(reject)
    }
}

fn reject(error: ApiError) -> ApiError {
    tracing::debug!(
        status = %error.status,
        message = %error.response.error.message,
        "Rejected request body"
    );
    error.with_code(PARSE_ERROR_CODE)
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
    let deserializer = &mut serde_json::Deserializer::from_slice(bytes);
    let value = serde_path_to_error::deserialize(deserializer).map_err(|err| {
        let path = err.path().to_string();
        let inner = err.into_inner();

        match inner.classify() {
            Category::Data => data_error(&path, &inner),
            Category::Syntax | Category::Eof | Category::Io => ApiError::new(
                StatusCode::BAD_REQUEST,
                ApiErrorType::InvalidRequestError,
                format!("Invalid JSON syntax: {inner}"),
            ),
        }
    })?;

    Ok(value)
}

/// 422 naming the field that could not be deserialized
///
/// A missing field fails at the enclosing object, so its name comes from
/// the serde message instead of the path.
fn data_error(path: &str, err: &serde_json::Error) -> ApiError {
    let message = err.to_string();
    let missing = missing_field_name(&message);

    let (field, code) = match missing {
        Some(name) if path == "." => (name.to_string(), "required"),
        Some(name) => (format!("{path}.{name}"), "required"),
        None if path == "." => ("body".to_string(), "invalid"),
        None => (path.to_string(), "invalid"),
    };

    ApiError::new(
        StatusCode::UNPROCESSABLE_ENTITY,
        ApiErrorType::ValidationError,
        format!("Invalid request body: {field}: {message}"),
    )
    .with_fields(vec![FieldError {
        field,
        code: code.to_string(),
        message,
    }])
}

fn missing_field_name(message: &str) -> Option<&str> {
    message
        .strip_prefix("missing field `")?
        .split('`')
        .next()
        .filter(|name| !name.is_empty())
}

fn has_json_content_type(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
    else {
        return false;
    };

    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match essence.split_once('/') {
        Some(("application", subtype)) => subtype == "json" || subtype.ends_with("+json"),
        _ => false,
    }
}

impl<T> IntoResponse for Json<T>
where
    T: serde::Serialize,
{
    fn into_response(self) -> Response {
        AxumJson(self.0).into_response()
    }
}
