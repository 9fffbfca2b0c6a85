pub mod seed;

use chrono::Utc;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};
use tracing::info;

use crate::entities::migration;

/// Ordered migration files, applied once each and recorded by name.
const MIGRATIONS: &[(&str, &str)] = &[
    (
        "001_create_products.sql",
        include_str!("../../migrations/001_create_products.sql"),
    ),
    (
        "002_create_cart_items.sql",
        include_str!("../../migrations/002_create_cart_items.sql"),
    ),
];

pub async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    db.execute_unprepared(
        "CREATE TABLE IF NOT EXISTS migrations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            timestamp DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
    )
    .await?;

    for (name, sql) in MIGRATIONS {
        let already_run = migration::Entity::find()
            .filter(migration::Column::Name.eq(*name))
            .one(db)
            .await?
            .is_some();
        if already_run {
            continue;
        }

        info!(migration = name, "Running migration");
        db.execute_unprepared(sql).await?;

        let record = migration::ActiveModel {
            name: Set((*name).to_owned()),
            timestamp: Set(Utc::now().naive_utc()),
            ..Default::default()
        };
        migration::Entity::insert(record).exec(db).await?;
    }

    Ok(())
}
