use axum::{extract::State, routing::post, Json, Router};
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::{
    error::ApiError, generation::snapshot::Snapshot, state::AppState,
};

pub fn generate_routes() -> Router<AppState> {
    Router::new().route("/ai/generate", post(generate))
}

#[derive(Debug, serde::Deserialize)]
pub struct GenerateBody {
    pub prompt: String,
}

/// Standalone generation, no project attached: validate, generate (never a
/// hard failure), snapshot best-effort, respond.
#[instrument(skip(state, body))]
pub async fn generate(
    State(state): State<AppState>,
    Json(body): Json<GenerateBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let prompt = body.prompt.trim().to_string();
    if prompt.is_empty() {
        return Err(ApiError::InvalidInput("Prompt is required".into()));
    }

    let outcome = state.generator.generate(&prompt).await;

    let snapshot = Snapshot::new(&prompt, &outcome.text);
    let snapshot_id = match state.snapshots.write(&snapshot).await {
        Ok(_) => Some(snapshot.id),
        Err(e) => {
            warn!(error = %e, snapshot_id = %snapshot.id, "snapshot write failed");
            None
        }
    };

    info!(used_fallback = outcome.used_fallback, "generation completed");
    Ok(Json(json!({
        "ok": true,
        "data": {
            "generatedCode": outcome.text,
            "usedFallback": outcome.used_fallback,
            "snapshotId": snapshot_id,
        },
    })))
}
