use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Response,
    routing::get,
    Json, Router,
};
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder, TransactionTrait};
use serde_json::json;
use std::sync::Arc;

use crate::entities::product::{self, Entity as ProductEntity};
use crate::middleware::logging::{to_response, ApiError};

//ROUTERS
pub fn product_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/", get(get_products))
        .route("/:id", get(get_product))
        .layer(Extension(db))
}

//Routes
async fn get_products(Extension(db): Extension<Arc<DatabaseConnection>>) -> Response {
    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(_) => {
            return to_response(
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "success": false,
                        "message": "Failed to fetch products"
                    })),
                ),
                Err(ApiError::TransactionCreationFailed),
            );
        }
    };

    match ProductEntity::find()
        .order_by_asc(product::Column::Id)
        .all(&txn)
        .await
    {
        Ok(products) => to_response(
            Json(json!({
                "success": true,
                "data": products
            })),
            Ok(()),
        ),
        Err(err) => to_response(
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "success": false,
                    "message": "Failed to fetch products"
                })),
            ),
            Err(ApiError::DbError(err.to_string())),
        ),
    }
}

async fn get_product(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Response {
    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(_) => {
            return to_response(
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "success": false,
                        "message": "Failed to fetch product"
                    })),
                ),
                Err(ApiError::TransactionCreationFailed),
            );
        }
    };

    match ProductEntity::find_by_id(id).one(&txn).await {
        Ok(Some(prod)) => to_response(
            Json(json!({
                "success": true,
                "data": prod
            })),
            Ok(()),
        ),
        Ok(None) => to_response(
            (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "success": false,
                    "message": "Product not found"
                })),
            ),
            Err(ApiError::NotFound(format!("No product with {id} id"))),
        ),
        Err(err) => to_response(
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "success": false,
                    "message": "Failed to fetch product"
                })),
            ),
            Err(ApiError::DbError(err.to_string())),
        ),
    }
}
