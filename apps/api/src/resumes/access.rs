use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::resume::ResumeRow;
use crate::resumes::ingest::release_object;
use crate::resumes::store::ResumeStore;
use crate::storage::ObjectStore;

/// Loads a resume the requester is allowed to see (owner or admin).
pub async fn load_accessible(
    resumes: &dyn ResumeStore,
    requester: &AuthUser,
    id: Uuid,
) -> Result<ResumeRow, AppError> {
    let resume = resumes
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))?;

    if !requester.can_access(resume.user_id) {
        return Err(AppError::Forbidden);
    }
    Ok(resume)
}

/// Deletes the stored file (best effort) and then the record.
pub async fn delete_resume(
    resumes: &dyn ResumeStore,
    object_store: &dyn ObjectStore,
    requester: &AuthUser,
    id: Uuid,
) -> Result<(), AppError> {
    let resume = load_accessible(resumes, requester, id).await?;

    release_object(object_store, &resume.file_name).await;

    if !resumes.delete(id).await? {
        return Err(AppError::NotFound(format!("Resume {id} not found")));
    }
    info!("Resume {id} deleted by user {}", requester.id);
    Ok(())
}
