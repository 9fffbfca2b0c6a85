pub mod api;
pub mod config;
pub mod db;
pub mod entities;
pub mod middleware;

use axum::{routing::get, Json, Router};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::services::ServeDir;

use api::create_api_router;

/// The full application: API routes plus the static front end.
pub fn app(shared_db: Arc<DatabaseConnection>) -> Router {
    create_api_router(shared_db)
        .route("/health", get(liveness))
        .fallback_service(ServeDir::new("public"))
}

async fn liveness() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "environment": std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_owned()),
        "timestamp": Utc::now().to_rfc3339()
    }))
}
