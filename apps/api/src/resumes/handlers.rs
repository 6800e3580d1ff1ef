//! Axum route handlers for the Resume API.

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use bytes::BytesMut;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::extract::ValidPath;
use crate::models::resume::ResumeRow;
use crate::resumes::access::{delete_resume, load_accessible};
use crate::resumes::ingest::ingest_resume;
use crate::state::AppState;
use crate::storage::{StorageError, Upload, MAX_UPLOAD_BYTES};

/// Multipart field the resume file must arrive under.
pub const UPLOAD_FIELD: &str = "resume";

/// POST /api/resumes/upload
///
/// Returns 201 with the record whether or not extraction succeeded; the
/// record's status says which.
pub async fn handle_upload(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ResumeRow>), AppError> {
    let upload = read_upload(multipart).await?;

    // Runs detached from the request so a client disconnect cannot strand the
    // record in `processing`.
    let task_state = state.clone();
    let record = tokio::spawn(async move {
        ingest_resume(
            task_state.resumes.as_ref(),
            task_state.storage.as_ref(),
            task_state.ai.as_ref(),
            user.id,
            upload,
        )
        .await
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("upload task failed: {e}")))??;

    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/resumes
pub async fn handle_list_mine(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<ResumeRow>>, AppError> {
    Ok(Json(state.resumes.list_by_owner(user.id).await?))
}

/// GET /api/resumes/:id
pub async fn handle_get(
    State(state): State<AppState>,
    user: AuthUser,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<Json<ResumeRow>, AppError> {
    Ok(Json(
        load_accessible(state.resumes.as_ref(), &user, id).await?,
    ))
}

/// DELETE /api/resumes/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    user: AuthUser,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<Json<Value>, AppError> {
    delete_resume(state.resumes.as_ref(), state.storage.as_ref(), &user, id).await?;
    Ok(Json(json!({ "message": "Resume deleted successfully" })))
}

/// Reads the `resume` field, stopping as soon as it exceeds the size limit.
async fn read_upload(mut multipart: Multipart) -> Result<Upload, AppError> {
    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let original_name = field
            .file_name()
            .map(str::to_string)
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| AppError::Validation("Uploaded file has no file name".to_string()))?;
        let mime_type = field.content_type().unwrap_or_default().to_string();

        let mut buf = BytesMut::new();
        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            if buf.len() + chunk.len() > MAX_UPLOAD_BYTES {
                return Err(StorageError::FileTooLarge {
                    limit: MAX_UPLOAD_BYTES,
                }
                .into());
            }
            buf.extend_from_slice(&chunk);
        }

        return Ok(Upload {
            field_name: UPLOAD_FIELD.to_string(),
            original_name,
            mime_type,
            bytes: buf.freeze(),
        });
    }

    Err(AppError::Validation(format!(
        "Please upload a file in the '{UPLOAD_FIELD}' field"
    )))
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        StorageError::FileTooLarge {
            limit: MAX_UPLOAD_BYTES,
        }
        .into()
    } else {
        AppError::Validation(format!("Malformed upload: {}", err.body_text()))
    }
}
