mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::{middleware::from_fn_with_state, routing::{get, post}, Router};
use tower_http::trace::TraceLayer;

use crate::config::LauncherConfig;
use crate::db::Database;
use middleware::{auth_middleware, SecurityConfig};

/// Shared by every request. Each request still builds its own pipeline.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<LauncherConfig>,
}

pub fn create_router(db: Database, config: LauncherConfig) -> Router {
    create_router_with_security(db, config, SecurityConfig::from_env())
}

pub fn create_router_with_security(
    db: Database,
    config: LauncherConfig,
    security: SecurityConfig,
) -> Router {
    let state = AppState {
        db,
        config: Arc::new(config),
    };

    let actions = Router::new()
        .route("/launch_publish", post(handlers::launch_publish))
        .route("/resolve_publish", post(handlers::resolve_publish))
        .route("/command", get(handlers::command_registration))
        .layer(from_fn_with_state(security, auth_middleware));

    let api = Router::new()
        .merge(actions)
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
