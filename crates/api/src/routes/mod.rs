pub mod admin;
pub mod health;
pub mod public;

use axum::routing::post;
use axum::Router;

use crate::handlers::staff;
use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// /respond/{token}                     token response (public)
/// /public/...                          submission and token view (public)
/// /products                            catalog (public)
/// /auth/sync                           identity sync (authenticated)
/// /admin/...                           admin / representative
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(public::router())
        .route("/auth/sync", post(staff::sync_user))
        .nest("/admin", admin::router())
}
