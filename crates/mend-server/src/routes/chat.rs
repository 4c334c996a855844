use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use mend::vision::VisionRefinementLoop;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::state::{AppState, DEFAULT_SESSION};

#[derive(Debug, Deserialize)]
struct ChatRequest {
    #[serde(default)]
    message: String,
    #[serde(default)]
    session_id: Option<String>,
    /// Optional base64-encoded photo of the item.
    #[serde(default)]
    image: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    response: String,
}

async fn chat_handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<Value>)> {
    if request.message.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "No message provided" })),
        ));
    }

    let image = match &request.image {
        Some(encoded) => Some(decode_image(encoded)?),
        None => None,
    };

    let session_id = request.session_id.as_deref().unwrap_or(DEFAULT_SESSION);
    let response = state
        .handle_message(session_id, &request.message, image.as_deref())
        .await;

    Ok(Json(ChatResponse { response }))
}

#[derive(Debug, Deserialize)]
struct AnalyzeRequest {
    image: String,
    #[serde(default)]
    iterations: Option<usize>,
}

#[derive(Debug, Serialize)]
struct AnalyzeResponse {
    analysis: String,
}

/// Every pass is a remote vision call, so client-supplied counts are
/// capped regardless of the configured default.
const MAX_ANALYZE_ITERATIONS: usize = 8;

fn clamp_iterations(requested: Option<usize>, configured: usize) -> usize {
    requested.unwrap_or(configured).clamp(1, MAX_ANALYZE_ITERATIONS)
}

// Standalone multi-pass image analysis, outside any conversation.
async fn analyze_handler(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, (StatusCode, Json<Value>)> {
    let image = decode_image(&request.image)?;
    let config = state.bot_config();
    let iterations = clamp_iterations(request.iterations, config.vision_iterations);

    let vision = VisionRefinementLoop::new(state.provider(), &config.vision_model);
    let analysis = vision.run(&image, iterations).await;

    Ok(Json(AnalyzeResponse { analysis }))
}

fn decode_image(encoded: &str) -> Result<Vec<u8>, (StatusCode, Json<Value>)> {
    // Accept both bare base64 and a full data URI.
    let encoded = encoded
        .split_once("base64,")
        .map(|(_, data)| data)
        .unwrap_or(encoded);

    BASE64.decode(encoded).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Invalid image encoding" })),
        )
    })
}

// Configure routes for this module
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/chat", post(chat_handler))
        .route("/analyze-image", post(analyze_handler))
        .with_state(state)
}
