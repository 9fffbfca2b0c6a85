use axum::{extract::Extension, http::StatusCode, response::Response, routing::get, Json, Router};
use chrono::Utc;
use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, Statement};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::middleware::logging::{to_response, ApiError};

//ROUTERS
pub fn health_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/", get(health_check))
        .layer(Extension(db))
}

//Routes
async fn health_check(Extension(db): Extension<Arc<DatabaseConnection>>) -> Response {
    match introspect(&db).await {
        Ok((tables, cart_structure)) => to_response(
            Json(json!({
                "status": "healthy",
                "database": "connected",
                "tables": tables,
                "cartStructure": cart_structure,
                "timestamp": Utc::now().to_rfc3339()
            })),
            Ok(()),
        ),
        Err(err) => to_response(
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "status": "unhealthy",
                    "error": err.to_string()
                })),
            ),
            Err(ApiError::DbError(err.to_string())),
        ),
    }
}

async fn introspect(db: &DatabaseConnection) -> Result<(Vec<Value>, Vec<Value>), DbErr> {
    let backend = db.get_database_backend();

    let table_rows = db
        .query_all(Statement::from_string(
            backend,
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
        ))
        .await?;
    let mut tables = Vec::with_capacity(table_rows.len());
    for row in &table_rows {
        tables.push(json!({ "name": row.try_get::<String>("", "name")? }));
    }

    let structure_rows = db
        .query_all(Statement::from_string(
            backend,
            "PRAGMA table_info(cart_items)",
        ))
        .await?;
    let mut cart_structure = Vec::with_capacity(structure_rows.len());
    for row in &structure_rows {
        cart_structure.push(json!({
            "cid": row.try_get::<i32>("", "cid")?,
            "name": row.try_get::<String>("", "name")?,
            "type": row.try_get::<String>("", "type")?,
            "notnull": row.try_get::<i32>("", "notnull")?,
            "dflt_value": row.try_get::<Option<String>>("", "dflt_value")?,
            "pk": row.try_get::<i32>("", "pk")?
        }));
    }

    Ok((tables, cart_structure))
}
