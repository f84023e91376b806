//! Bearer-token authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use staffpurchase_core::error::CoreError;

use crate::auth::identity::{IdentityError, VerifiedIdentity};
use crate::error::AppError;
use crate::state::AppState;

/// Verified identity extracted from the `Authorization: Bearer` header.
///
/// Carries no role; role checks live in [`super::rbac`] and consult the
/// staff store.
#[derive(Debug, Clone)]
pub struct AuthUser(pub VerifiedIdentity);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        match state.identity.verify(token.trim()).await {
            Ok(identity) => Ok(AuthUser(identity)),
            Err(IdentityError::Invalid(reason)) => {
                tracing::debug!(%reason, "Rejected identity token");
                Err(AppError::Core(CoreError::Unauthorized(
                    "Invalid or expired token".into(),
                )))
            }
            Err(e) => Err(AppError::Identity(e)),
        }
    }
}
