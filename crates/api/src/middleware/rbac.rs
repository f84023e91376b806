//! Role-based access control (RBAC) extractors.
//!
//! Roles are not carried in the identity token; each extractor resolves the
//! caller's staff account and checks its stored role. A caller with no
//! account is treated like one without the role.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use staffpurchase_core::error::CoreError;
use staffpurchase_core::roles::Role;
use staffpurchase_db::models::staff::StaffAccount;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

async fn account_with_role(
    parts: &mut Parts,
    state: &AppState,
    allowed: &[Role],
    denied: &str,
) -> Result<StaffAccount, AppError> {
    let AuthUser(identity) = AuthUser::from_request_parts(parts, state).await?;
    match state.staff.find(&identity.uid).await? {
        Some(account) if allowed.contains(&account.role) => Ok(account),
        _ => Err(AppError::Core(CoreError::Forbidden(denied.into()))),
    }
}

/// Requires the `admin` role. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(admin): RequireAdmin) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub StaffAccount);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        account_with_role(parts, state, &[Role::Admin], "Admin role required")
            .await
            .map(RequireAdmin)
    }
}

/// Requires `admin` or `representative`. Rejects with 403 Forbidden otherwise.
pub struct RequireStaffViewer(pub StaffAccount);

impl FromRequestParts<AppState> for RequireStaffViewer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        account_with_role(
            parts,
            state,
            &[Role::Admin, Role::Representative],
            "Admin or Representative role required",
        )
        .await
        .map(RequireStaffViewer)
    }
}
