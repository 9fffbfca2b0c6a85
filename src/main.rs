use sea_orm::{Database, DatabaseConnection};
use std::sync::Arc;
use tracing::info;

use rust_storefront::{app, config::Config, db};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = Config::load();

    let db: DatabaseConnection = Database::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");
    db::run_migrations(&db).await.expect("Failed to run migrations");

    let shared_db = Arc::new(db);

    db::seed::seed_products_if_empty(&shared_db, &config.seed_url)
        .await
        .expect("Failed to seed product catalog");

    let app = app(shared_db);

    let address = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .expect("Failed to bind address");
    info!("Server running on {address}");
    axum::serve(listener, app).await.unwrap();
}
