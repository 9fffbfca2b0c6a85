use reqwest::Client;
use sea_orm::{DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, Set, TransactionTrait};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::entities::product;

#[derive(Error, Debug)]
pub enum SeedError {
    #[error("Failed to fetch catalog: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("Catalog API returned no products")]
    EmptyCatalog,
    #[error("Database error: {0}")]
    Db(#[from] DbErr),
}

#[derive(Deserialize, Debug)]
struct SeedProduct {
    title: String,
    description: String,
    price: f64,
    category: String,
    image: String,
}

/// Populates the catalog from the external products API on first boot.
/// A non-empty table skips the fetch, so restarts never touch the network.
pub async fn seed_products_if_empty(
    db: &DatabaseConnection,
    seed_url: &str,
) -> Result<(), SeedError> {
    let existing = product::Entity::find().count(db).await?;
    if existing > 0 {
        return Ok(());
    }

    info!(url = seed_url, "Products table is empty, fetching catalog");
    let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
    let products: Vec<SeedProduct> = client
        .get(seed_url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    if products.is_empty() {
        return Err(SeedError::EmptyCatalog);
    }

    let rows: Vec<product::ActiveModel> = products
        .into_iter()
        .map(|p| product::ActiveModel {
            title: Set(p.title),
            description: Set(p.description),
            price: Set(p.price),
            category: Set(p.category),
            image: Set(p.image),
            ..Default::default()
        })
        .collect();

    let count = rows.len();
    let txn = db.begin().await?;
    match product::Entity::insert_many(rows).exec(&txn).await {
        Ok(_) => {
            txn.commit().await?;
            info!(count, "Seeded products");
            Ok(())
        }
        Err(err) => {
            let _ = txn.rollback().await;
            Err(SeedError::Db(err))
        }
    }
}
