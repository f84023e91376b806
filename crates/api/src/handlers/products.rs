//! Product catalog handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use staffpurchase_core::error::CoreError;
use staffpurchase_core::types::DbId;
use staffpurchase_db::StoreError;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::MessageResponse;
use crate::state::AppState;

const PRODUCT_EXISTS: &str = "Product already exists";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateProduct {
    pub name: Option<String>,
}

/// GET /api/products
///
/// Public: the submission form reads the catalog. Ordered by name.
pub async fn list_products(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let products = state.products.list().await?;
    Ok(Json(products))
}

/// POST /api/admin/products
pub async fn create_product(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateProduct>,
) -> AppResult<impl IntoResponse> {
    let name = input.name.as_deref().map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return Err(CoreError::Validation("Product name is required".into()).into());
    }

    if state.products.find_by_name(name).await?.is_some() {
        return Err(CoreError::Conflict(PRODUCT_EXISTS.into()).into());
    }

    let product = match state.products.insert(name).await {
        Ok(product) => product,
        // Lost a race with a concurrent insert of the same name.
        Err(StoreError::Duplicate(_)) => {
            return Err(AppError::Core(CoreError::Conflict(PRODUCT_EXISTS.into())))
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(product_id = product.id, name = %product.name, admin = %admin.uid, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// DELETE /api/admin/products/{id}
pub async fn delete_product(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !state.products.delete(id).await? {
        return Err(CoreError::NotFound("Product not found".into()).into());
    }

    tracing::info!(product_id = id, admin = %admin.uid, "Product deleted");
    Ok(Json(MessageResponse::new("Product deleted successfully")))
}
