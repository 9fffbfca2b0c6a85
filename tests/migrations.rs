use rust_storefront::{db, entities::migration};
use sea_orm::{ConnectOptions, Database, EntityTrait, PaginatorTrait};

#[tokio::test]
async fn migrations_are_recorded_once_and_rerunning_is_idempotent() {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1);
    let db = Database::connect(options)
        .await
        .expect("Failed to connect to in-memory database");

    db::run_migrations(&db).await.expect("First run failed");
    let first_count = migration::Entity::find().count(&db).await.unwrap();
    assert_eq!(first_count, 2);

    db::run_migrations(&db).await.expect("Second run failed");
    let second_count = migration::Entity::find().count(&db).await.unwrap();
    assert_eq!(second_count, first_count);

    let names: Vec<String> = migration::Entity::find()
        .all(&db)
        .await
        .unwrap()
        .into_iter()
        .map(|record| record.name)
        .collect();
    assert_eq!(
        names,
        vec![
            "001_create_products.sql".to_owned(),
            "002_create_cart_items.sql".to_owned()
        ]
    );
}
