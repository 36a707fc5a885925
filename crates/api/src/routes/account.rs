//! Route definitions for `/me`.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::account;
use crate::state::AppState;

/// Routes mounted at `/me`. All act on the authenticated caller.
///
/// ```text
/// GET  /           -> get_profile
/// PUT  /           -> update_profile
/// PUT  /password   -> change_password
/// GET  /history    -> list_history
/// POST /history    -> record_history
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(account::get_profile).put(account::update_profile))
        .route("/password", put(account::change_password))
        .route(
            "/history",
            get(account::list_history).post(account::record_history),
        )
}
