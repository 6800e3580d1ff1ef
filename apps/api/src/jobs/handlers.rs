//! Axum route handlers for the Jobs API.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::ai_client::Recommendations;
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::extract::{ValidJson, ValidPath};
use crate::jobs::create::{create_job, CreateJobRequest};
use crate::jobs::matching::{match_candidates, MatchResponse};
use crate::jobs::recommend::{recommend_for_resume, RecommendRequest};
use crate::models::job::JobRow;
use crate::state::AppState;

/// POST /api/jobs
pub async fn handle_create(
    State(state): State<AppState>,
    user: AuthUser,
    ValidJson(request): ValidJson<CreateJobRequest>,
) -> Result<(StatusCode, Json<JobRow>), AppError> {
    let job = create_job(state.jobs.as_ref(), state.ai.as_ref(), user.id, request).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

/// GET /api/jobs
///
/// Public. Newest first.
pub async fn handle_list(State(state): State<AppState>) -> Result<Json<Vec<JobRow>>, AppError> {
    Ok(Json(state.jobs.list().await?))
}

/// GET /api/jobs/:id/match
///
/// Any authenticated user may match any job.
pub async fn handle_match(
    State(state): State<AppState>,
    _user: AuthUser,
    ValidPath(job_id): ValidPath<Uuid>,
) -> Result<Json<MatchResponse>, AppError> {
    let response = match_candidates(
        state.jobs.as_ref(),
        state.resumes.as_ref(),
        state.ai.as_ref(),
        job_id,
        state.config.match_concurrency,
    )
    .await?;
    Ok(Json(response))
}

/// POST /api/jobs/recommend
pub async fn handle_recommend(
    State(state): State<AppState>,
    user: AuthUser,
    ValidJson(request): ValidJson<RecommendRequest>,
) -> Result<Json<Recommendations>, AppError> {
    let recommendations = recommend_for_resume(
        state.resumes.as_ref(),
        state.ai.as_ref(),
        &user,
        request.resume_id()?,
    )
    .await?;
    Ok(Json(recommendations))
}
