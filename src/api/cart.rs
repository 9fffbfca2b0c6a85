use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    middleware,
    response::Response,
    routing::{get, post, put},
    Json, Router,
};
use chrono::{NaiveDateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    FromQueryResult, JoinType, Order, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use validator::{Validate, ValidationErrors};

use crate::entities::{cart_item, cart_item::Entity as CartItemEntity, product};
use crate::middleware::logging::{to_response, ApiError};
use crate::middleware::session::{session_middleware, CartSession};

//ROUTERS
pub fn cart_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/", get(get_cart))
        .route("/items", post(add_item))
        .route("/items/:product_id", put(update_quantity).delete(remove_item))
        .layer(middleware::from_fn(session_middleware))
        .layer(Extension(db))
}

//Routes
async fn get_cart(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(session): Extension<CartSession>,
) -> Response {
    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(_) => {
            return to_response(
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "success": false,
                        "error": "Internal server error"
                    })),
                ),
                Err(ApiError::TransactionCreationFailed),
            );
        }
    };

    match load_cart(&txn, session.id()).await {
        Ok(items) => to_response(
            Json(json!({
                "success": true,
                "data": items
            })),
            Ok(()),
        ),
        Err(err) => to_response(
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "success": false,
                    "error": "Internal server error"
                })),
            ),
            Err(ApiError::DbError(err.to_string())),
        ),
    }
}

async fn add_item(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(session): Extension<CartSession>,
    Json(payload): Json<AddItemPayload>,
) -> Response {
    if let Err(errors) = payload.validate() {
        let message = first_validation_message(&errors);
        return to_response(
            (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "success": false,
                    "message": message
                })),
            ),
            Err(ApiError::ValidationFail(message.clone())),
        );
    }

    let product_id = match payload.product_id {
        Some(id) => id,
        None => {
            let message = "Product ID is required".to_owned();
            return to_response(
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "success": false,
                        "message": message
                    })),
                ),
                Err(ApiError::ValidationFail(message.clone())),
            );
        }
    };

    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(_) => {
            return to_response(
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "success": false,
                        "message": "Error adding item to cart"
                    })),
                ),
                Err(ApiError::TransactionCreationFailed),
            );
        }
    };

    match product::Entity::find_by_id(product_id).one(&txn).await {
        Ok(Some(_)) => {
            //One row per (session, product): expand the existing line instead of
            //inserting a second one.
            let mutation = match CartItemEntity::find()
                .filter(cart_item::Column::SessionId.eq(session.id()))
                .filter(cart_item::Column::ProductId.eq(product_id))
                .one(&txn)
                .await
            {
                Ok(Some(entry)) => {
                    let new_quantity = entry.quantity + payload.quantity;
                    let mut entry: cart_item::ActiveModel = entry.into();
                    entry.quantity = Set(new_quantity);
                    entry.updated_at = Set(Utc::now().naive_utc());
                    entry.update(&txn).await.map(|_| ())
                }
                Ok(None) => {
                    let now = Utc::now().naive_utc();
                    let new_entry = cart_item::ActiveModel {
                        session_id: Set(session.id().to_owned()),
                        product_id: Set(product_id),
                        quantity: Set(payload.quantity),
                        created_at: Set(now),
                        updated_at: Set(now),
                        ..Default::default()
                    };
                    CartItemEntity::insert(new_entry).exec(&txn).await.map(|_| ())
                }
                Err(err) => Err(err),
            };

            let updated_cart = match mutation {
                Ok(()) => load_cart(&txn, session.id()).await,
                Err(err) => Err(err),
            };

            match updated_cart {
                Ok(items) => match txn.commit().await {
                    Ok(_) => to_response(
                        Json(json!({
                            "success": true,
                            "data": items
                        })),
                        Ok(()),
                    ),
                    Err(err) => to_response(
                        (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            Json(json!({
                                "success": false,
                                "message": "Error adding item to cart"
                            })),
                        ),
                        Err(ApiError::DbError(err.to_string())),
                    ),
                },
                Err(err) => {
                    let _ = txn.rollback().await;
                    to_response(
                        (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            Json(json!({
                                "success": false,
                                "message": "Error adding item to cart"
                            })),
                        ),
                        Err(ApiError::DbError(err.to_string())),
                    )
                }
            }
        }
        Ok(None) => {
            let message = format!("Product with ID {product_id} not found");
            to_response(
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({
                        "success": false,
                        "message": message
                    })),
                ),
                Err(ApiError::NotFound(message.clone())),
            )
        }
        Err(err) => to_response(
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "success": false,
                    "message": "Error adding item to cart"
                })),
            ),
            Err(ApiError::DbError(err.to_string())),
        ),
    }
}

async fn update_quantity(
    Path(product_id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(session): Extension<CartSession>,
    Json(payload): Json<UpdateQuantityPayload>,
) -> Response {
    if let Err(errors) = payload.validate() {
        let message = first_validation_message(&errors);
        return to_response(
            (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "success": false,
                    "message": message
                })),
            ),
            Err(ApiError::ValidationFail(message.clone())),
        );
    }

    let session_id = match &session {
        CartSession::Existing(id) => id.clone(),
        CartSession::Fresh(_) => {
            let message = "No cart session found".to_owned();
            return to_response(
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "success": false,
                        "message": message
                    })),
                ),
                Err(ApiError::ValidationFail(message.clone())),
            );
        }
    };

    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(_) => {
            return to_response(
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "success": false,
                        "message": "Error updating quantity"
                    })),
                ),
                Err(ApiError::TransactionCreationFailed),
            );
        }
    };

    match CartItemEntity::find()
        .filter(cart_item::Column::SessionId.eq(session_id.as_str()))
        .filter(cart_item::Column::ProductId.eq(product_id))
        .one(&txn)
        .await
    {
        Ok(Some(entry)) => {
            let mut entry: cart_item::ActiveModel = entry.into();
            entry.quantity = Set(payload.quantity);
            entry.updated_at = Set(Utc::now().naive_utc());

            let updated_cart = match entry.update(&txn).await {
                Ok(_) => load_cart(&txn, &session_id).await,
                Err(err) => Err(err),
            };

            match updated_cart {
                Ok(items) => match txn.commit().await {
                    Ok(_) => to_response(
                        Json(json!({
                            "success": true,
                            "data": items
                        })),
                        Ok(()),
                    ),
                    Err(err) => to_response(
                        (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            Json(json!({
                                "success": false,
                                "message": "Error updating quantity"
                            })),
                        ),
                        Err(ApiError::DbError(err.to_string())),
                    ),
                },
                Err(err) => {
                    let _ = txn.rollback().await;
                    to_response(
                        (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            Json(json!({
                                "success": false,
                                "message": "Error updating quantity"
                            })),
                        ),
                        Err(ApiError::DbError(err.to_string())),
                    )
                }
            }
        }
        Ok(None) => {
            let message = "Item not found in cart".to_owned();
            to_response(
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({
                        "success": false,
                        "message": message
                    })),
                ),
                Err(ApiError::NotFound(message.clone())),
            )
        }
        Err(err) => to_response(
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "success": false,
                    "message": "Error updating quantity"
                })),
            ),
            Err(ApiError::DbError(err.to_string())),
        ),
    }
}

async fn remove_item(
    Path(product_id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(session): Extension<CartSession>,
) -> Response {
    let session_id = match &session {
        CartSession::Existing(id) => id.clone(),
        CartSession::Fresh(_) => {
            let message = "No cart session found".to_owned();
            return to_response(
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "success": false,
                        "message": message
                    })),
                ),
                Err(ApiError::ValidationFail(message.clone())),
            );
        }
    };

    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(_) => {
            return to_response(
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "success": false,
                        "message": "Error removing item from cart"
                    })),
                ),
                Err(ApiError::TransactionCreationFailed),
            );
        }
    };

    //Deleting a line that does not exist is a no-op, not an error.
    let deletion = CartItemEntity::delete_many()
        .filter(cart_item::Column::SessionId.eq(session_id.as_str()))
        .filter(cart_item::Column::ProductId.eq(product_id))
        .exec(&txn)
        .await;

    let updated_cart = match deletion {
        Ok(_) => load_cart(&txn, &session_id).await,
        Err(err) => Err(err),
    };

    match updated_cart {
        Ok(items) => match txn.commit().await {
            Ok(_) => to_response(
                Json(json!({
                    "success": true,
                    "data": items
                })),
                Ok(()),
            ),
            Err(err) => to_response(
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "success": false,
                        "message": "Error removing item from cart"
                    })),
                ),
                Err(ApiError::DbError(err.to_string())),
            ),
        },
        Err(err) => {
            let _ = txn.rollback().await;
            to_response(
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "success": false,
                        "message": "Error removing item from cart"
                    })),
                ),
                Err(ApiError::DbError(err.to_string())),
            )
        }
    }
}

/// Cart line joined with its product, plus the computed line total.
/// Never persisted; this is what every cart endpoint returns.
#[derive(Debug, Serialize)]
pub struct CartItemView {
    pub id: i32,
    pub session_id: String,
    pub product_id: i32,
    pub quantity: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub title: String,
    pub price: f64,
    pub image: String,
    pub total_price: f64,
}

#[derive(Debug, FromQueryResult)]
struct JoinedCartRow {
    id: i32,
    session_id: String,
    product_id: i32,
    quantity: i32,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
    title: String,
    price: f64,
    image: String,
}

impl From<JoinedCartRow> for CartItemView {
    fn from(row: JoinedCartRow) -> CartItemView {
        CartItemView {
            total_price: round_to_cents(row.price * row.quantity as f64),
            id: row.id,
            session_id: row.session_id,
            product_id: row.product_id,
            quantity: row.quantity,
            created_at: row.created_at,
            updated_at: row.updated_at,
            title: row.title,
            price: row.price,
            image: row.image,
        }
    }
}

pub(crate) async fn load_cart<C: ConnectionTrait>(
    conn: &C,
    session_id: &str,
) -> Result<Vec<CartItemView>, DbErr> {
    let rows = CartItemEntity::find()
        .select_only()
        .columns([
            cart_item::Column::Id,
            cart_item::Column::SessionId,
            cart_item::Column::ProductId,
            cart_item::Column::Quantity,
            cart_item::Column::CreatedAt,
            cart_item::Column::UpdatedAt,
        ])
        .column_as(product::Column::Title, "title")
        .column_as(product::Column::Price, "price")
        .column_as(product::Column::Image, "image")
        .join(JoinType::InnerJoin, cart_item::Relation::Product.def())
        .filter(cart_item::Column::SessionId.eq(session_id))
        .order_by(cart_item::Column::Id, Order::Asc)
        .into_model::<JoinedCartRow>()
        .all(conn)
        .await?;

    Ok(rows.into_iter().map(CartItemView::from).collect())
}

fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn first_validation_message(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|field| field.iter())
        .find_map(|err| err.message.as_ref().map(|msg| msg.to_string()))
        .unwrap_or_else(|| "Invalid request payload".to_owned())
}

//Structs
#[derive(Deserialize, Debug, Validate)]
#[serde(rename_all = "camelCase")]
struct AddItemPayload {
    #[validate(range(min = 1, message = "Product ID must be a positive integer"))]
    product_id: Option<i32>,
    #[serde(default = "default_quantity")]
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    quantity: i32,
}

#[derive(Deserialize, Debug, Validate)]
struct UpdateQuantityPayload {
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    quantity: i32,
}

fn default_quantity() -> i32 {
    1
}
