//! Staff account handlers: identity sync, listing and role management.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use staffpurchase_core::roles::Role;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAdmin, RequireStaffViewer};
use crate::response::{MessageResponse, MessageWith};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateRole {
    pub role: String,
}

#[derive(Debug, Serialize)]
struct RoleBody {
    role: Role,
}

/// POST /api/auth/sync
///
/// Admit or refresh the caller's account. Any verified identity may call
/// this, including ones without an account yet.
pub async fn sync_user(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let account = state.admission().sync(&identity).await?;
    Ok(Json(MessageWith::new(
        "User synced",
        RoleBody { role: account.role },
    )))
}

/// GET /api/admin/staff
pub async fn list_staff(
    RequireStaffViewer(_viewer): RequireStaffViewer,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let staff = state.admission().list().await?;
    Ok(Json(staff))
}

/// PUT /api/admin/users/{uid}/role
pub async fn update_user_role(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(uid): Path<String>,
    Json(input): Json<UpdateRole>,
) -> AppResult<impl IntoResponse> {
    let role = state
        .admission()
        .change_role(&uid, input.role.trim(), &admin)
        .await?;
    Ok(Json(MessageResponse::new(format!("Role updated to {role}"))))
}

/// DELETE /api/admin/users/{uid}
pub async fn delete_user(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.admission().delete(&uid).await?;
    tracing::debug!(uid = %uid, admin = %admin.uid, "User removed by admin");
    Ok(Json(MessageResponse::new("User deleted")))
}
