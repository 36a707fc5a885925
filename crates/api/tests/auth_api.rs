//! HTTP-level integration tests for auth and admin endpoints.
//!
//! Covers login, logout revocation, lockout, username availability and
//! role enforcement on the admin endpoints.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_user, get, get_auth, post_json, post_json_auth, put_json_auth, token_for,
    TEST_PASSWORD,
};
use sqlx::PgPool;

async fn login(pool: &PgPool, username: &str, password: &str) -> axum::response::Response {
    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "username": username, "password": password });
    post_json(app, "/api/v1/auth/login", body).await
}

// ---------------------------------------------------------------------------
// Auth flow
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_success(pool: PgPool) {
    let user = create_user(&pool, "loginuser", "annotator").await;

    let response = login(&pool, "loginuser", TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let data = &json["data"];
    assert!(data["access_token"].is_string());
    assert!(data.get("refresh_token").is_none());
    assert_eq!(data["expires_in"], 15 * 60);
    assert_eq!(data["user"]["id"], user.id);
    assert_eq!(data["user"]["role"], "annotator");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_wrong_password(pool: PgPool) {
    create_user(&pool, "wrongpw", "annotator").await;
    let response = login(&pool, "wrongpw", "not-the-password").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_unknown_user(pool: PgPool) {
    let response = login(&pool, "ghost", "whatever").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Five consecutive failures lock the account even for the right password.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_account_lockout(pool: PgPool) {
    create_user(&pool, "locked", "annotator").await;
    for _ in 0..5 {
        let response = login(&pool, "locked", "bad-password").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let response = login(&pool, "locked", TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_logout_revokes_access_token(pool: PgPool) {
    create_user(&pool, "leaver", "annotator").await;
    let json = body_json(login(&pool, "leaver", TEST_PASSWORD).await).await;
    let access = json["data"]["access_token"].as_str().unwrap().to_string();

    let app = common::build_test_app(pool.clone());
    assert_eq!(get_auth(app, "/api/v1/me", &access).await.status(), StatusCode::OK);

    let app = common::build_test_app(pool.clone());
    let response =
        post_json_auth(app, "/api/v1/auth/logout", serde_json::json!({}), &access).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/me", &access).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "Token has been revoked");

    // A fresh login carries the new version and works again.
    let json = body_json(login(&pool, "leaver", TEST_PASSWORD).await).await;
    let access = json["data"]["access_token"].as_str().unwrap().to_string();
    let app = common::build_test_app(pool);
    assert_eq!(get_auth(app, "/api/v1/me", &access).await.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_token_for_deleted_account_is_unauthorized(pool: PgPool) {
    let token = token_for(9_999, "admin");
    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/projects", &token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_role_is_read_from_account_not_token(pool: PgPool) {
    let user = create_user(&pool, "climber", "annotator").await;
    // Token claims admin, account says annotator.
    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/admin/users", &token_for(user.id, "admin")).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_username_count_is_public(pool: PgPool) {
    create_user(&pool, "taken", "annotator").await;

    let app = common::build_test_app(pool.clone());
    let response = get(app, "/api/v1/auth/usernames/taken/count").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["username"], "taken");
    assert_eq!(json["data"]["count"], 1);

    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/auth/usernames/free/count").await;
    assert_eq!(body_json(response).await["data"]["count"], 0);
}

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_missing_token_is_unauthorized(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/projects").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_garbage_token_is_unauthorized(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/projects", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_creates_user(pool: PgPool) {
    let admin = create_user(&pool, "root", "admin").await;
    let token = token_for(admin.id, "admin");

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({
        "username": "newbie",
        "email": "newbie@test.com",
        "password": "a-long-enough-password",
        "role": "annotator",
    });
    let response = post_json_auth(app, "/api/v1/admin/users", body, &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["username"], "newbie");
    assert_eq!(json["data"]["role"], "annotator");

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/admin/users", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_rejects_weak_password(pool: PgPool) {
    let admin = create_user(&pool, "root", "admin").await;
    let app = common::build_test_app(pool);
    let body = serde_json::json!({
        "username": "weak",
        "email": "weak@test.com",
        "password": "short",
        "role": "annotator",
    });
    let response =
        post_json_auth(app, "/api/v1/admin/users", body, &token_for(admin.id, "admin")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_non_admin_cannot_list_users(pool: PgPool) {
    let user = create_user(&pool, "plain", "annotator").await;
    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/admin/users", &token_for(user.id, "annotator")).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_annotator_cannot_create_project(pool: PgPool) {
    let user = create_user(&pool, "ann", "annotator").await;
    let app = common::build_test_app(pool);
    let body = serde_json::json!({ "name": "Nope" });
    let response =
        post_json_auth(app, "/api/v1/projects", body, &token_for(user.id, "annotator")).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "FORBIDDEN");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_project_owner_cannot_manage_users(pool: PgPool) {
    let owner = create_user(&pool, "boss", "project_owner").await;
    let app = common::build_test_app(pool);
    let body = serde_json::json!({
        "username": "minion",
        "email": "minion@test.com",
        "password": "a-long-enough-password",
        "role": "admin",
    });
    let response =
        post_json_auth(app, "/api/v1/admin/users", body, &token_for(owner.id, "project_owner"))
            .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_resets_password_and_clears_lockout(pool: PgPool) {
    let admin = create_user(&pool, "root", "admin").await;
    let user = create_user(&pool, "forgetful", "annotator").await;
    for _ in 0..5 {
        login(&pool, "forgetful", "bad-password").await;
    }
    assert_eq!(
        login(&pool, "forgetful", TEST_PASSWORD).await.status(),
        StatusCode::FORBIDDEN
    );

    let app = common::build_test_app(pool.clone());
    let uri = format!("/api/v1/admin/users/{}/password", user.id);
    let body = serde_json::json!({ "password": "brand-new-password" });
    let response = put_json_auth(app, &uri, body, &token_for(admin.id, "admin")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    assert_eq!(
        login(&pool, "forgetful", "brand-new-password").await.status(),
        StatusCode::OK
    );
    // Tokens issued before the reset are dead.
    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/me", &token_for(user.id, "annotator")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_reset_for_unknown_user_is_not_found(pool: PgPool) {
    let admin = create_user(&pool, "root", "admin").await;
    let app = common::build_test_app(pool);
    let body = serde_json::json!({ "password": "brand-new-password" });
    let response = put_json_auth(
        app,
        "/api/v1/admin/users/9999/password",
        body,
        &token_for(admin.id, "admin"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
