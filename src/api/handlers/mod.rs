use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::error::LaunchError;
use crate::pipeline::{launch_with_database, resolve_with_database, LaunchReport, LaunchRequest};
use crate::registration::CommandRegistration;

// ============================================================
// Error Handling
// ============================================================

/// Map a launch failure onto a status code. Messages meant for the user are
/// passed through; infrastructure failures are logged and sanitized.
fn launch_error(e: LaunchError) -> (StatusCode, String) {
    let status = match &e {
        LaunchError::CommandDenied { .. } => StatusCode::FORBIDDEN,
        LaunchError::RecordNotFound { .. } => StatusCode::NOT_FOUND,
        e if e.is_caller_error() => StatusCode::BAD_REQUEST,
        LaunchError::MissingViewerConfiguration(_)
        | LaunchError::MissingViewerExtensions(_)
        | LaunchError::CollaboratorLaunch(_) => StatusCode::UNPROCESSABLE_ENTITY,
        _ => {
            tracing::error!("Internal error: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            );
        }
    };

    tracing::warn!("Launch request failed: {}", e);
    (status, e.to_string())
}

fn join_error(e: tokio::task::JoinError) -> (StatusCode, String) {
    tracing::error!("Launch task failed: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Launch command
// ============================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct ResolveResponse {
    pub publish_id: i64,
    pub path: String,
}

pub async fn command_registration(State(state): State<AppState>) -> Json<CommandRegistration> {
    Json(CommandRegistration::launch_publish(&state.config))
}

/// The pipeline blocks on the database and on child processes, so it runs
/// off the async workers.
pub async fn launch_publish(
    State(state): State<AppState>,
    Json(request): Json<LaunchRequest>,
) -> Result<Json<LaunchReport>, (StatusCode, String)> {
    tokio::task::spawn_blocking(move || launch_with_database(&state.db, &state.config, &request))
        .await
        .map_err(join_error)?
        .map(Json)
        .map_err(launch_error)
}

pub async fn resolve_publish(
    State(state): State<AppState>,
    Json(request): Json<LaunchRequest>,
) -> Result<Json<ResolveResponse>, (StatusCode, String)> {
    let (publish, path) =
        tokio::task::spawn_blocking(move || resolve_with_database(&state.db, &state.config, &request))
            .await
            .map_err(join_error)?
            .map_err(launch_error)?;

    Ok(Json(ResolveResponse {
        publish_id: publish.id,
        path,
    }))
}
