//! Admin routes. Every handler enforces its own role via an RBAC extractor.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::{products, purchase_requests, reminders, staff};
use crate::state::AppState;

/// Admin routes mounted at `/api/admin`.
///
/// ```text
/// GET    /purchase-requests          -> list_purchase_requests
/// POST   /purchase-requests          -> create_purchase_request
/// GET    /purchase-requests/{id}     -> get_purchase_request
/// PUT    /purchase-requests/{id}     -> update_purchase_request
/// DELETE /purchase-requests/{id}     -> delete_purchase_request
/// POST   /reminders/run              -> run_reminders
/// POST   /products                   -> create_product
/// DELETE /products/{id}              -> delete_product
/// GET    /staff                      -> list_staff (admin or representative)
/// PUT    /users/{uid}/role           -> update_user_role
/// DELETE /users/{uid}                -> delete_user
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/purchase-requests",
            get(purchase_requests::list_purchase_requests)
                .post(purchase_requests::create_purchase_request),
        )
        .route(
            "/purchase-requests/{id}",
            get(purchase_requests::get_purchase_request)
                .put(purchase_requests::update_purchase_request)
                .delete(purchase_requests::delete_purchase_request),
        )
        .route("/reminders/run", post(reminders::run_reminders))
        .route("/products", post(products::create_product))
        .route("/products/{id}", delete(products::delete_product))
        .route("/staff", get(staff::list_staff))
        .route("/users/{uid}/role", put(staff::update_user_role))
        .route("/users/{uid}", delete(staff::delete_user))
}
