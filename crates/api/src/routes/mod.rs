pub mod account;
pub mod admin;
pub mod auth;
pub mod health;
pub mod project;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                                         login (public)
/// /auth/logout                                        logout
/// /auth/usernames/{username}/count                    availability (public)
///
/// /me                                                 get, update own profile
/// /me/password                                        change own password
/// /me/history                                         list, record
///
/// /admin/users                                        list, create (admin only)
/// /admin/users/{id}/password                          reset (admin only)
///
/// /projects                                           list, create
/// /projects/{id}                                      get, update, delete
/// /projects/{project_id}/labels                       list, create
/// /projects/{project_id}/documents                    list (filterable), create
/// /projects/{project_id}/documents/spans              list with inline spans
/// /projects/{project_id}/documents/{id}               get, delete
/// /projects/{project_id}/documents/{document_id}/annotations
///                                                     list, create or replace
/// /projects/{project_id}/documents/{document_id}/annotations/{id}
///                                                     get, delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        // The caller's own account.
        .nest("/me", account::router())
        // User management.
        .nest("/admin", admin::router())
        // Projects with their labels, documents and annotations.
        .nest("/projects", project::router())
}
