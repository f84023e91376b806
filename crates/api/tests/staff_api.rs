//! HTTP-level integration tests for identity sync, staff listing, role
//! management and RBAC enforcement.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, delete_auth, get_auth, post_json_auth, put_json_auth, send};
use staffpurchase_db::StaffStore;

async fn sync(app: &common::TestApp, token: &str) -> serde_json::Value {
    let response = post_json_auth(
        app.router.clone(),
        "/api/auth/sync",
        serde_json::json!({}),
        token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

// ---------------------------------------------------------------------------
// Sync / admission
// ---------------------------------------------------------------------------

#[tokio::test]
async fn first_sync_is_admin_then_pending() {
    let app = build_test_app();

    let first = app.token("u1", "owner@example.com", None);
    let json = sync(&app, &first).await;
    assert_eq!(json["message"], "User synced");
    assert_eq!(json["role"], "admin");

    let second = app.token("u2", "kim@example.com", Some("Kim"));
    assert_eq!(sync(&app, &second).await["role"], "pending");

    // Re-syncing keeps the stored role.
    assert_eq!(sync(&app, &first).await["role"], "admin");

    let owner = app.store.find("u1").await.unwrap().unwrap();
    assert_eq!(owner.name, "Owner");
}

#[tokio::test]
async fn sync_requires_a_valid_token() {
    let app = build_test_app();

    let response = post_json_auth(
        app.router.clone(),
        "/api/auth/sync",
        serde_json::json!({}),
        "not-a-jwt",
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "Invalid or expired token");

    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/api/auth/sync")
        .header("authorization", "Token abc")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = send(app.router.clone(), request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(response).await["error"],
        "Invalid Authorization format. Expected: Bearer <token>"
    );
}

// ---------------------------------------------------------------------------
// RBAC
// ---------------------------------------------------------------------------

#[tokio::test]
async fn pending_account_is_forbidden_from_admin_routes() {
    let app = build_test_app();
    app.admin_token().await;
    let newcomer = app.token("u2", "kim@example.com", Some("Kim"));
    sync(&app, &newcomer).await;

    let response = get_auth(app.router.clone(), "/api/admin/purchase-requests", &newcomer).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["code"], "FORBIDDEN");
    assert_eq!(json["error"], "Admin role required");
}

#[tokio::test]
async fn unsynced_identity_is_forbidden() {
    let app = build_test_app();
    let stranger = app.token("nobody", "nobody@example.com", None);

    let response = get_auth(app.router.clone(), "/api/admin/staff", &stranger).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn representative_may_list_staff_but_not_change_roles() {
    let app = build_test_app();
    let admin = app.admin_token().await;
    let rep = app.token("u2", "rep@example.com", Some("Robin"));
    sync(&app, &rep).await;

    let response = put_json_auth(
        app.router.clone(),
        "/api/admin/users/u2/role",
        serde_json::json!({ "role": "representative" }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["message"],
        "Role updated to representative"
    );

    let response = get_auth(app.router.clone(), "/api/admin/staff", &rep).await;
    assert_eq!(response.status(), StatusCode::OK);
    let staff = body_json(response).await;
    let entries = staff.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    let robin = entries.iter().find(|e| e["id"] == "u2").unwrap();
    assert_eq!(robin["name"], "Robin");
    assert_eq!(robin["email"], "rep@example.com");
    assert_eq!(robin["role"], "representative");
    assert!(robin["lastLogin"].is_string());

    let response = put_json_auth(
        app.router.clone(),
        "/api/admin/users/u2/role",
        serde_json::json!({ "role": "admin" }),
        &rep,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Role management
// ---------------------------------------------------------------------------

#[tokio::test]
async fn invalid_role_is_rejected() {
    let app = build_test_app();
    let admin = app.admin_token().await;
    sync(&app, &app.token("u2", "kim@example.com", Some("Kim"))).await;

    for role in ["superuser", "pending", ""] {
        let response = put_json_auth(
            app.router.clone(),
            "/api/admin/users/u2/role",
            serde_json::json!({ "role": role }),
            &admin,
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Invalid role");
        assert_eq!(json["code"], "VALIDATION_ERROR");
    }

    let account = app.store.find("u2").await.unwrap().unwrap();
    assert_eq!(account.role.as_str(), "pending");
}

#[tokio::test]
async fn role_change_for_unknown_user_is_not_found() {
    let app = build_test_app();
    let admin = app.admin_token().await;

    let response = put_json_auth(
        app.router.clone(),
        "/api/admin/users/ghost/role",
        serde_json::json!({ "role": "staff" }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "User not found");
}

#[tokio::test]
async fn role_change_publishes_event() {
    let app = build_test_app();
    let admin = app.admin_token().await;
    sync(&app, &app.token("u2", "kim@example.com", Some("Kim"))).await;
    let mut rx = app.event_bus.subscribe();

    let response = put_json_auth(
        app.router.clone(),
        "/api/admin/users/u2/role",
        serde_json::json!({ "role": "staff" }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let published = rx.recv().await.unwrap();
    assert_eq!(published.event.event_type(), "staff.role_changed");
}

#[tokio::test]
async fn delete_user_removes_the_account() {
    let app = build_test_app();
    let admin = app.admin_token().await;
    sync(&app, &app.token("u2", "kim@example.com", Some("Kim"))).await;

    let response = delete_auth(app.router.clone(), "/api/admin/users/u2", &admin).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["message"], "User deleted");
    assert!(app.store.find("u2").await.unwrap().is_none());

    let response = delete_auth(app.router.clone(), "/api/admin/users/u2", &admin).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
