use std::sync::Arc;

use axum::{Router, middleware};
use sea_orm::{DatabaseBackend, MockDatabase};

use crate::{
    config::{AppConfig, DatabaseConfig},
    db::connection,
    middleware::{catch_panic_layer, json_error_middleware},
    routes::router,
    services::ServiceContext,
    state::AppState,
};

pub const MEMORY_DATABASE_URL: &str = "sqlite::memory:";

/// A fresh, schema-synced in-memory SQLite state. Each call gets its own
/// database.
pub async fn memory_state() -> anyhow::Result<Arc<AppState>> {
    let config = AppConfig {
        database: DatabaseConfig {
            url: MEMORY_DATABASE_URL.to_string(),
            max_connections: 1,
            min_idle: 1,
        },
        ..AppConfig::default()
    };
    let db = connection::connect(&config.database).await?;
    Ok(AppState::new(config, db))
}

pub async fn memory_services() -> anyhow::Result<(Arc<AppState>, ServiceContext)> {
    let state = memory_state().await?;
    let services = ServiceContext::from_state(state.as_ref());
    Ok((state, services))
}

/// The router with the same middleware stack `main` installs.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(router(state))
        .layer(middleware::from_fn(json_error_middleware))
        .layer(catch_panic_layer())
}

pub fn mock_router() -> Router {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    app(AppState::new(AppConfig::default(), db))
}
