//! HTTP-level integration tests for `/me`: profile, password change and
//! document history.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_ok, create_user, get_auth, post_json, post_json_auth, put_json_auth,
    token_for, TEST_PASSWORD,
};
use doclabel_db::models::history::MAX_HISTORY_ENTRIES;
use serde_json::json;
use sqlx::PgPool;

async fn login_status(pool: &PgPool, username: &str, password: &str) -> StatusCode {
    let app = common::build_test_app(pool.clone());
    let body = json!({ "username": username, "password": password });
    post_json(app, "/api/v1/auth/login", body).await.status()
}

/// A project owned by a fresh owner, with `count` documents. Returns the
/// project id and the document ids in upload order.
async fn seed_documents(pool: &PgPool, count: usize) -> (i64, Vec<i64>) {
    let owner = create_user(pool, "owner", "project_owner").await;
    let token = token_for(owner.id, "project_owner");
    let app = || common::build_test_app(pool.clone());

    let project = create_ok(app(), "/api/v1/projects", json!({ "name": "History" }), &token).await;
    let project_id = project["id"].as_i64().unwrap();
    let mut ids = Vec::with_capacity(count);
    for i in 0..count {
        let doc = create_ok(
            app(),
            &format!("/api/v1/projects/{project_id}/documents"),
            json!({ "title": format!("doc {i}"), "text": "some text" }),
            &token,
        )
        .await;
        ids.push(doc["id"].as_i64().unwrap());
    }
    (project_id, ids)
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_get_own_profile(pool: PgPool) {
    let user = create_user(&pool, "self", "annotator").await;
    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/me", &token_for(user.id, "annotator")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();
    assert_eq!(data["username"], "self");
    assert_eq!(data["role"], "annotator");
    assert!(data.get("password_hash").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_profile_changes_only_given_fields(pool: PgPool) {
    let user = create_user(&pool, "renamer", "annotator").await;
    let app = common::build_test_app(pool);
    let body = json!({ "username": "renamed" });
    let response = put_json_auth(app, "/api/v1/me", body, &token_for(user.id, "annotator")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();
    assert_eq!(data["username"], "renamed");
    assert_eq!(data["email"], "renamer@test.com");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_profile_validates_username_length(pool: PgPool) {
    let user = create_user(&pool, "strict", "annotator").await;
    let token = token_for(user.id, "annotator");
    for username in ["ab", "a-name-well-over-twenty"] {
        let app = common::build_test_app(pool.clone());
        let response = put_json_auth(app, "/api/v1/me", json!({ "username": username }), &token).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{username}");
        assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_profile_to_taken_username_conflicts(pool: PgPool) {
    create_user(&pool, "first", "annotator").await;
    let second = create_user(&pool, "second", "annotator").await;
    let app = common::build_test_app(pool);
    let response = put_json_auth(
        app,
        "/api/v1/me",
        json!({ "username": "first" }),
        &token_for(second.id, "annotator"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

// ---------------------------------------------------------------------------
// Password change
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_change_password_revokes_tokens_and_swaps_credentials(pool: PgPool) {
    let user = create_user(&pool, "mover", "annotator").await;
    let token = token_for(user.id, "annotator");

    let app = common::build_test_app(pool.clone());
    let body = json!({
        "origin_password": TEST_PASSWORD,
        "password": "another-long-password",
        "password2": "another-long-password",
    });
    let response = put_json_auth(app, "/api/v1/me/password", body, &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool.clone());
    assert_eq!(
        get_auth(app, "/api/v1/me", &token).await.status(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        login_status(&pool, "mover", TEST_PASSWORD).await,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        login_status(&pool, "mover", "another-long-password").await,
        StatusCode::OK
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_change_password_requires_current_password(pool: PgPool) {
    let user = create_user(&pool, "guarded", "annotator").await;
    let app = common::build_test_app(pool.clone());
    let body = json!({
        "origin_password": "not-my-password",
        "password": "another-long-password",
        "password2": "another-long-password",
    });
    let response =
        put_json_auth(app, "/api/v1/me/password", body, &token_for(user.id, "annotator")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Current password is incorrect");
    assert_eq!(login_status(&pool, "guarded", TEST_PASSWORD).await, StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_change_password_rejects_mismatch_and_weak(pool: PgPool) {
    let user = create_user(&pool, "sloppy", "annotator").await;
    let token = token_for(user.id, "annotator");

    let mismatch = json!({
        "origin_password": TEST_PASSWORD,
        "password": "another-long-password",
        "password2": "another-long-passw0rd",
    });
    let weak = json!({
        "origin_password": TEST_PASSWORD,
        "password": "short",
        "password2": "short",
    });
    for body in [mismatch, weak] {
        let app = common::build_test_app(pool.clone());
        let response = put_json_auth(app, "/api/v1/me/password", body, &token).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    }
    // Nothing changed, so the token is still good.
    let app = common::build_test_app(pool);
    assert_eq!(get_auth(app, "/api/v1/me", &token).await.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Document history
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_history_lists_newest_first_without_duplicates(pool: PgPool) {
    let (project_id, docs) = seed_documents(&pool, 2).await;
    let user = create_user(&pool, "reader", "annotator").await;
    let token = token_for(user.id, "annotator");

    for (doc, operation) in [(docs[0], "annotate"), (docs[1], "annotate"), (docs[0], "review")] {
        let app = common::build_test_app(pool.clone());
        let body = json!({ "document_id": doc, "operation": operation });
        let response = post_json_auth(app, "/api/v1/me/history", body, &token).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/me/history", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let entries = body_json(response).await["data"].as_array().unwrap().clone();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["document_id"], docs[0]);
    assert_eq!(entries[0]["operation"], "review");
    assert_eq!(entries[0]["project_id"], project_id);
    assert_eq!(entries[0]["project_name"], "History");
    assert_eq!(entries[0]["title"], "doc 0");
    assert_eq!(entries[1]["document_id"], docs[1]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_history_keeps_only_newest_entries(pool: PgPool) {
    let total = MAX_HISTORY_ENTRIES as usize + 3;
    let (_, docs) = seed_documents(&pool, total).await;
    let user = create_user(&pool, "busy", "annotator").await;
    let token = token_for(user.id, "annotator");

    for doc in &docs {
        let app = common::build_test_app(pool.clone());
        let body = json!({ "document_id": doc, "operation": "annotate" });
        post_json_auth(app, "/api/v1/me/history", body, &token).await;
    }

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/me/history", &token).await;
    let entries = body_json(response).await["data"].as_array().unwrap().clone();
    assert_eq!(entries.len(), MAX_HISTORY_ENTRIES as usize);
    assert_eq!(entries[0]["document_id"], docs[total - 1]);
    assert_eq!(
        entries.last().unwrap()["document_id"],
        docs[total - MAX_HISTORY_ENTRIES as usize]
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_history_for_unknown_document_is_not_found(pool: PgPool) {
    let user = create_user(&pool, "lost", "annotator").await;
    let app = common::build_test_app(pool);
    let body = json!({ "document_id": 424242, "operation": "annotate" });
    let response =
        post_json_auth(app, "/api/v1/me/history", body, &token_for(user.id, "annotator")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_history_rejects_blank_operation(pool: PgPool) {
    let (_, docs) = seed_documents(&pool, 1).await;
    let user = create_user(&pool, "terse", "annotator").await;
    let app = common::build_test_app(pool);
    let body = json!({ "document_id": docs[0], "operation": "" });
    let response =
        post_json_auth(app, "/api/v1/me/history", body, &token_for(user.id, "annotator")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}
