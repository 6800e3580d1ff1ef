use serde::Deserialize;
use uuid::Uuid;

use crate::ai_client::{AiService, Recommendations};
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::resumes::access::load_accessible;
use crate::resumes::store::ResumeStore;

/// Below this many characters the extracted text is treated as missing.
pub const MIN_RESUME_TEXT_CHARS: usize = 10;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendRequest {
    #[serde(default)]
    pub resume_id: Option<Uuid>,
}

impl RecommendRequest {
    pub fn resume_id(&self) -> Result<Uuid, AppError> {
        self.resume_id
            .ok_or_else(|| AppError::Validation("resumeId is required".to_string()))
    }
}

/// Asks the AI service for external postings suited to a resume. The criteria
/// and postings are passed through as returned.
pub async fn recommend_for_resume(
    resumes: &dyn ResumeStore,
    ai: &dyn AiService,
    requester: &AuthUser,
    resume_id: Uuid,
) -> Result<Recommendations, AppError> {
    let resume = load_accessible(resumes, requester, resume_id).await?;

    let text = resume.raw_text.as_deref().map(str::trim).unwrap_or_default();
    if text.chars().count() < MIN_RESUME_TEXT_CHARS {
        return Err(AppError::Validation(
            "Resume text is empty or too short. Please re-upload the resume.".to_string(),
        ));
    }

    Ok(ai.recommend_jobs(text).await?)
}
