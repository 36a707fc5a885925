//! Route definitions for the `/projects` resource.
//!
//! Labels, documents and annotations nest under `/projects/{project_id}/...`.

use axum::routing::get;
use axum::Router;

use crate::handlers::{annotation, document, label, project};
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                                               -> list
/// POST   /                                               -> create
/// GET    /{id}                                           -> get_by_id
/// PUT    /{id}                                           -> update
/// DELETE /{id}                                           -> delete
///
/// GET    /{project_id}/labels                            -> list
/// POST   /{project_id}/labels                            -> create
///
/// GET    /{project_id}/documents                         -> list
/// POST   /{project_id}/documents                         -> create
/// GET    /{project_id}/documents/spans                   -> list_with_spans
/// GET    /{project_id}/documents/{id}                    -> get_by_id
/// DELETE /{project_id}/documents/{id}                    -> delete
///
/// GET    /{project_id}/documents/{document_id}/annotations       -> list
/// POST   /{project_id}/documents/{document_id}/annotations       -> create
/// GET    /{project_id}/documents/{document_id}/annotations/{id}  -> get_by_id
/// DELETE /{project_id}/documents/{document_id}/annotations/{id}  -> delete
/// ```
pub fn router() -> Router<AppState> {
    let label_routes = Router::new().route("/", get(label::list).post(label::create));

    let annotation_routes = Router::new()
        .route("/", get(annotation::list).post(annotation::create))
        .route(
            "/{id}",
            get(annotation::get_by_id).delete(annotation::delete),
        );

    let document_routes = Router::new()
        .route("/", get(document::list).post(document::create))
        .route("/spans", get(document::list_with_spans))
        .route("/{id}", get(document::get_by_id).delete(document::delete))
        .nest("/{document_id}/annotations", annotation_routes);

    Router::new()
        .route("/", get(project::list).post(project::create))
        .route(
            "/{id}",
            get(project::get_by_id)
                .put(project::update)
                .delete(project::delete),
        )
        .nest("/{project_id}/labels", label_routes)
        .nest("/{project_id}/documents", document_routes)
}
