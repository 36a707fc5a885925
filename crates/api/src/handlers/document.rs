//! Handlers for `/projects/{project_id}/documents`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use doclabel_core::error::CoreError;
use doclabel_core::permissions::Action;
use doclabel_core::types::DbId;
use doclabel_db::models::document::{CreateDocument, Document, DocumentFilter};
use doclabel_db::models::annotation::DocumentWithSpans;
use doclabel_db::repositories::{AnnotationRepo, DocumentRepo};

use super::{ensure_document, ensure_project, validate_input};
use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppQuery};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/projects/{project_id}/documents
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<DbId>,
    AppJson(input): AppJson<CreateDocument>,
) -> AppResult<(StatusCode, Json<DataResponse<Document>>)> {
    user.authorize(&state, Some(project_id), Action::ManageDocuments)?;
    validate_input(&input)?;
    ensure_project(&state.pool, project_id).await?;

    let document = DocumentRepo::create(&state.pool, project_id, &input).await?;
    tracing::info!(
        user_id = user.user_id,
        project_id,
        document_id = document.id,
        "Document created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: document })))
}

/// GET /api/v1/projects/{project_id}/documents?is_annotated=&limit=&offset=
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<DbId>,
    AppQuery(filter): AppQuery<DocumentFilter>,
) -> AppResult<Json<DataResponse<Vec<Document>>>> {
    user.authorize(&state, Some(project_id), Action::Read)?;
    ensure_project(&state.pool, project_id).await?;
    let documents = DocumentRepo::list_by_project(&state.pool, project_id, &filter).await?;
    Ok(Json(DataResponse { data: documents }))
}

/// GET /api/v1/projects/{project_id}/documents/spans?is_annotated=&limit=&offset=
///
/// Same page as [`list`], with each document's spans inlined as
/// `[start, end, label_text]` in position order.
pub async fn list_with_spans(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<DbId>,
    AppQuery(filter): AppQuery<DocumentFilter>,
) -> AppResult<Json<DataResponse<Vec<DocumentWithSpans>>>> {
    user.authorize(&state, Some(project_id), Action::Read)?;
    ensure_project(&state.pool, project_id).await?;
    let documents = DocumentRepo::list_by_project(&state.pool, project_id, &filter).await?;

    let ids: Vec<DbId> = documents.iter().map(|d| d.id).collect();
    let mut spans = AnnotationRepo::list_spans_for_documents(&state.pool, &ids)
        .await?
        .into_iter()
        .peekable();

    // Both lists are ordered by document id.
    let data = documents
        .into_iter()
        .map(|doc| {
            let mut labels = Vec::new();
            while let Some((_, start, end, text)) =
                spans.next_if(|(document_id, ..)| *document_id == doc.id)
            {
                labels.push((start, end, text));
            }
            DocumentWithSpans {
                id: doc.id,
                text: doc.text,
                labels,
            }
        })
        .collect();

    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/projects/{project_id}/documents/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<Document>>> {
    user.authorize(&state, Some(project_id), Action::Read)?;
    let document = ensure_document(&state.pool, project_id, id).await?;
    Ok(Json(DataResponse { data: document }))
}

/// DELETE /api/v1/projects/{project_id}/documents/{id}
///
/// Soft delete. The document's annotations are kept but the document no
/// longer accepts writes.
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    user.authorize(&state, Some(project_id), Action::ManageDocuments)?;
    ensure_document(&state.pool, project_id, id).await?;
    if !DocumentRepo::soft_delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Document",
            id,
        }));
    }
    tracing::info!(user_id = user.user_id, document_id = id, "Document deleted");
    Ok(StatusCode::NO_CONTENT)
}
