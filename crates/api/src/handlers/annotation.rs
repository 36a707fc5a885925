//! Handlers for `/projects/{project_id}/documents/{document_id}/annotations`.
//!
//! Creates and deletes go through [`AnnotationWriter`]; reads use the
//! repository directly.
//!
//! [`AnnotationWriter`]: doclabel_db::writer::AnnotationWriter

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use doclabel_core::annotation::{AnnotationError, SpanOrigin};
use doclabel_core::error::CoreError;
use doclabel_core::permissions::Action;
use doclabel_core::span::CandidateSpan;
use doclabel_core::types::DbId;
use doclabel_db::models::annotation::{
    Annotation, AnnotationDetail, CreateAnnotationRequest,
};
use doclabel_db::repositories::AnnotationRepo;
use doclabel_db::writer::CreateSpan;
use serde::Serialize;

use super::ensure_document;
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of a successful create.
#[derive(Debug, Serialize)]
pub struct CreatedAnnotation {
    #[serde(flatten)]
    pub annotation: Annotation,
    /// Id of the span this one relabelled, if any.
    pub replaced_id: Option<DbId>,
}

/// POST /api/v1/projects/{project_id}/documents/{document_id}/annotations
///
/// Creating a span at the offsets of an existing one replaces it.
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Path((project_id, document_id)): Path<(DbId, DbId)>,
    AppJson(input): AppJson<CreateAnnotationRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<CreatedAnnotation>>)> {
    user.authorize(&state, Some(project_id), Action::Annotate)?;
    ensure_document(&state.pool, project_id, document_id).await?;

    let span = CandidateSpan::parse(&input.start_offset, &input.end_offset)
        .map_err(AnnotationError::Rejected)?;

    let written = state
        .writer
        .create_or_replace(&CreateSpan {
            document_id,
            label_id: input.label_id,
            span,
            annotator_id: Some(user.user_id),
            origin: SpanOrigin::Manual,
        })
        .await?;

    tracing::info!(
        user_id = user.user_id,
        document_id,
        annotation_id = written.annotation.id,
        replaced_id = ?written.replaced_id,
        attempts = written.attempts,
        "Annotation created"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: CreatedAnnotation {
                annotation: written.annotation,
                replaced_id: written.replaced_id,
            },
        }),
    ))
}

/// GET /api/v1/projects/{project_id}/documents/{document_id}/annotations
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Path((project_id, document_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<Vec<AnnotationDetail>>>> {
    user.authorize(&state, Some(project_id), Action::Read)?;
    ensure_document(&state.pool, project_id, document_id).await?;
    let annotations = AnnotationRepo::list_by_document(&state.pool, document_id).await?;
    Ok(Json(DataResponse { data: annotations }))
}

/// GET /api/v1/projects/{project_id}/documents/{document_id}/annotations/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path((project_id, document_id, id)): Path<(DbId, DbId, DbId)>,
) -> AppResult<Json<DataResponse<Annotation>>> {
    user.authorize(&state, Some(project_id), Action::Read)?;
    let annotation = find_in_document(&state, project_id, document_id, id).await?;
    Ok(Json(DataResponse { data: annotation }))
}

/// DELETE /api/v1/projects/{project_id}/documents/{document_id}/annotations/{id}
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path((project_id, document_id, id)): Path<(DbId, DbId, DbId)>,
) -> AppResult<StatusCode> {
    user.authorize(&state, Some(project_id), Action::Annotate)?;
    find_in_document(&state, project_id, document_id, id).await?;

    let deleted = state.writer.delete(id).await?;
    tracing::info!(
        user_id = user.user_id,
        document_id,
        annotation_id = id,
        document_annotated = deleted.document_annotated,
        "Annotation deleted"
    );
    Ok(StatusCode::NO_CONTENT)
}

/// The annotation, only if it belongs to the given live document.
async fn find_in_document(
    state: &AppState,
    project_id: DbId,
    document_id: DbId,
    id: DbId,
) -> AppResult<Annotation> {
    ensure_document(&state.pool, project_id, document_id).await?;
    AnnotationRepo::find_by_id(&state.pool, id)
        .await?
        .filter(|a| a.document_id == document_id)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Annotation",
            id,
        }))
}
