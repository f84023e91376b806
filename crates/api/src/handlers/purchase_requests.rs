//! Admin handlers for purchase requests.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use staffpurchase_core::purchase_request::{
    PurchaseRequestInput, PurchaseRequestPatch, RequestListQuery,
};
use staffpurchase_core::types::DbId;

use crate::engine::lifecycle::{Sender, PUBLIC_SENDER_NAME};
use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::response::{MessageResponse, MessageWith};
use crate::state::AppState;

pub(crate) const CREATED_MESSAGE: &str = "Purchase Request created and sent successfully";

#[derive(Debug, Serialize)]
pub(crate) struct CreatedId {
    pub id: DbId,
}

/// POST /api/admin/purchase-requests
///
/// Create a request on behalf of the calling admin.
pub async fn create_purchase_request(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<PurchaseRequestInput>,
) -> AppResult<impl IntoResponse> {
    let email = if admin.email.trim().is_empty() {
        state.config.notifications.admin_email.clone()
    } else {
        admin.email.clone()
    };
    let name = if admin.name.trim().is_empty() {
        PUBLIC_SENDER_NAME.to_string()
    } else {
        admin.name.clone()
    };

    let request = state.lifecycle().create(input, Sender { email, name }).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageWith::new(CREATED_MESSAGE, CreatedId { id: request.id })),
    ))
}

/// GET /api/admin/purchase-requests
///
/// List requests, newest first. Query: `status`, `store`, `employee`,
/// `startDate`, `endDate`.
pub async fn list_purchase_requests(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<RequestListQuery>,
) -> AppResult<impl IntoResponse> {
    let requests = state.lifecycle().list(query).await?;
    Ok(Json(requests))
}

/// GET /api/admin/purchase-requests/{id}
pub async fn get_purchase_request(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let request = state.lifecycle().get(id).await?;
    Ok(Json(request))
}

/// PUT /api/admin/purchase-requests/{id}
///
/// Edit descriptive fields. Lifecycle fields in the body are ignored.
pub async fn update_purchase_request(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(patch): Json<PurchaseRequestPatch>,
) -> AppResult<impl IntoResponse> {
    state.lifecycle().update(id, patch).await?;
    tracing::debug!(request_id = id, admin = %admin.uid, "Request edited by admin");
    Ok(Json(MessageResponse::new("Request updated successfully")))
}

/// DELETE /api/admin/purchase-requests/{id}
pub async fn delete_purchase_request(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    state.lifecycle().delete(id).await?;
    tracing::debug!(request_id = id, admin = %admin.uid, "Request deleted by admin");
    Ok(Json(MessageResponse::new("Request deleted successfully")))
}
