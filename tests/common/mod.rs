use rust_storefront::{app, db, entities::product};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, EntityTrait, Set};
use std::sync::Arc;

/// Builds the real application against an in-memory database and serves it
/// on an ephemeral port. Returns the base address and the database handle so
/// tests can arrange fixtures and inspect stored state directly.
pub async fn spawn_app() -> (String, Arc<DatabaseConnection>) {
    let mut options = ConnectOptions::new("sqlite::memory:");
    // One connection, so every pooled checkout sees the same in-memory db.
    options.max_connections(1).min_connections(1);

    let db = Database::connect(options)
        .await
        .expect("Failed to connect to in-memory database");
    db::run_migrations(&db).await.expect("Failed to run migrations");

    let shared_db = Arc::new(db);
    let app = app(shared_db.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let address = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (address, shared_db)
}

pub async fn insert_product(db: &DatabaseConnection, title: &str, price: f64) -> i32 {
    let row = product::ActiveModel {
        title: Set(title.to_owned()),
        description: Set(format!("{title} description")),
        price: Set(price),
        category: Set("test".to_owned()),
        image: Set("https://example.com/image.png".to_owned()),
        ..Default::default()
    };
    product::Entity::insert(row)
        .exec(db)
        .await
        .expect("Failed to insert product")
        .last_insert_id
}

pub fn client_with_cookies() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to build client")
}
