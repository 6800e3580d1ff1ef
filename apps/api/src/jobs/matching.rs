//! Job → candidate matching.
//!
//! Every resume is a candidate (no status filter, no pagination). Candidates
//! with neither raw text nor parsed data are skipped. The remaining ones are
//! scored by the AI service through a bounded fan-out; a failed call drops that
//! candidate only. Results are ranked by descending score with a stable sort,
//! so equal scores keep upload order whatever order the calls finished in.

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::ai_client::AiService;
use crate::errors::AppError;
use crate::jobs::store::JobStore;
use crate::models::resume::ResumeRow;
use crate::resumes::store::ResumeStore;

/// One scored candidate. Built per request, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct MatchResult {
    pub resume: ResumeRow,
    pub score: f64,
    pub missing_keywords: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct MatchResponse {
    pub job_title: String,
    pub candidates: Vec<MatchResult>,
}

pub async fn match_candidates(
    jobs: &dyn JobStore,
    resumes: &dyn ResumeStore,
    ai: &dyn AiService,
    job_id: Uuid,
    concurrency: usize,
) -> Result<MatchResponse, AppError> {
    let job = jobs
        .get(job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;

    let candidates: Vec<(ResumeRow, String)> = resumes
        .list_all()
        .await?
        .into_iter()
        .filter_map(|resume| resume.match_text().map(|text| (resume, text)))
        .collect();

    debug!(
        "Matching job {job_id} against {} candidates (concurrency {concurrency})",
        candidates.len()
    );

    let description = job.description.as_str();
    // `buffered` yields in input order regardless of completion order.
    let scored: Vec<Option<MatchResult>> = stream::iter(candidates)
        .map(|(resume, text)| async move {
            match ai.score_match(&text, description).await {
                Ok(score) => Some(MatchResult {
                    resume,
                    score: score.score,
                    missing_keywords: score.missing_keywords,
                }),
                Err(e) => {
                    warn!("Matching resume {} against job {job_id} failed: {e}", resume.id);
                    None
                }
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    Ok(MatchResponse {
        job_title: job.title,
        candidates: rank(scored.into_iter().flatten().collect()),
    })
}

/// Sorts by descending score; `sort_by` is stable so ties keep their order.
fn rank(mut results: Vec<MatchResult>) -> Vec<MatchResult> {
    results.sort_by(|a, b| b.score.total_cmp(&a.score));
    results
}
