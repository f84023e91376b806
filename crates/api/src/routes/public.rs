//! Unauthenticated routes.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{products, public};
use crate::state::AppState;

/// Public routes mounted at `/api`.
///
/// ```text
/// GET|POST /respond/{token}             -> respond
/// GET      /public/request/{token}      -> get_request_by_token
/// POST     /public/purchase-requests    -> create_public_purchase_request
/// GET      /products                    -> list_products
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/respond/{token}", get(public::respond).post(public::respond))
        .route("/public/request/{token}", get(public::get_request_by_token))
        .route(
            "/public/purchase-requests",
            post(public::create_public_purchase_request),
        )
        .route("/products", get(products::list_products))
}
