//! `AppError` to HTTP response mapping, exercised without a server.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use staffpurchase_api::auth::identity::IdentityError;
use staffpurchase_api::error::AppError;
use staffpurchase_core::error::CoreError;
use staffpurchase_db::StoreError;

async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn not_found_carries_its_message() {
    let (status, json) =
        error_to_response(CoreError::NotFound("Request not found".into()).into()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Request not found");
}

#[tokio::test]
async fn validation_returns_400() {
    let (status, json) =
        error_to_response(CoreError::Validation("storeName is required".into()).into()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "storeName is required");
}

#[tokio::test]
async fn invalid_action_hides_the_raw_value() {
    let (status, json) =
        error_to_response(CoreError::InvalidAction("<script>".into()).into()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INVALID_ACTION");
    assert_eq!(json["error"], "Invalid action");
}

#[tokio::test]
async fn token_already_used_returns_400() {
    let (status, json) = error_to_response(CoreError::TokenAlreadyUsed.into()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "TOKEN_ALREADY_USED");
    assert_eq!(json["error"], "This response link has already been used.");
}

#[tokio::test]
async fn conflict_returns_400() {
    let (status, json) =
        error_to_response(CoreError::Conflict("Product already exists".into()).into()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "CONFLICT");
    assert_eq!(json["error"], "Product already exists");
}

#[tokio::test]
async fn auth_errors_map_to_401_and_403() {
    let (status, json) =
        error_to_response(CoreError::Unauthorized("Missing token".into()).into()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "UNAUTHORIZED");

    let (status, json) =
        error_to_response(CoreError::Forbidden("Admin role required".into()).into()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "FORBIDDEN");
    assert_eq!(json["error"], "Admin role required");
}

#[tokio::test]
async fn internal_errors_are_sanitized() {
    let (status, json) =
        error_to_response(CoreError::Internal("pool exhausted at 10.0.0.5".into()).into()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");

    let (status, json) = error_to_response(AppError::InternalError("boom".into())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "An internal error occurred");
}

#[tokio::test]
async fn backend_failures_are_dependency_failures() {
    let (status, json) =
        error_to_response(StoreError::Database(sqlx::Error::PoolTimedOut).into()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "DEPENDENCY_FAILURE");
    assert_eq!(json["error"], "A backend service is unavailable");

    let (status, json) =
        error_to_response(IdentityError::Unavailable("timeout".into()).into()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "DEPENDENCY_FAILURE");
}

#[tokio::test]
async fn store_duplicate_is_a_conflict() {
    let (status, json) =
        error_to_response(StoreError::Duplicate("uq_products_name".into()).into()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "CONFLICT");
}

#[tokio::test]
async fn bad_request_returns_400() {
    let (status, json) = error_to_response(AppError::BadRequest("Invalid JSON body".into())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["error"], "Invalid JSON body");
}
