pub mod cart;
pub mod health;
pub mod products;

use axum::{middleware, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::middleware::logging::logging_middleware;
use cart::cart_router;
use health::health_router;
use products::product_router;

pub fn create_api_router(shared_db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .nest("/api/products", product_router(shared_db.clone()))
        .nest("/api/cart", cart_router(shared_db.clone()))
        .nest("/api/health", health_router(shared_db))
        .layer(middleware::from_fn(logging_middleware))
}
