//! `POST /generate`

use axum::{
    extract::State,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use validator::Validate;

use crate::api::middleware::ClientId;
use crate::api::state::AppState;
use crate::api::types::{ApiError, GenerateRequestBody, Json};
use crate::infrastructure::pptx::PPTX_CONTENT_TYPE;

/// Generate a deck and return it as a download
pub async fn generate_presentation(
    State(state): State<AppState>,
    client: ClientId,
    Json(body): Json<GenerateRequestBody>,
) -> Result<Response, ApiError> {
    body.validate()?;
    let request = body.into_request()?;

    tracing::info!(
        client_id = %client.as_str(),
        topic = %request.topic(),
        slides = request.num_slides(),
        aspect_ratio = %request.aspect_ratio(),
        "Presentation requested"
    );

    let deck = state.pipeline.run(client.as_str(), &request).await?;

    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        deck.file_name
    ))
    .map_err(|e| ApiError::internal(format!("invalid file name header: {}", e)))?;

    Ok((
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static(PPTX_CONTENT_TYPE),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        deck.bytes,
    )
        .into_response())
}
