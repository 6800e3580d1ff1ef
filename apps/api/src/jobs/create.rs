use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::ai_client::AiService;
use crate::errors::AppError;
use crate::jobs::store::JobStore;
use crate::models::job::{JobRow, NewJob};

#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Creates a job posting. When only a URL is given the description is scraped
/// first; a failed scrape still creates the job, with an empty description and
/// `scrape_warning` explaining why.
pub async fn create_job(
    jobs: &dyn JobStore,
    ai: &dyn AiService,
    creator: Uuid,
    request: CreateJobRequest,
) -> Result<JobRow, AppError> {
    let title = required(&request.title, "title")?;
    let company = required(&request.company, "company")?;
    let url = request
        .url
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty());
    let description = request
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());

    let (description, scrape_warning) = match (description, &url) {
        (Some(description), _) => (description, None),
        (None, Some(url)) => match ai.scrape_job_posting(url).await {
            Ok(text) if !text.trim().is_empty() => (text, None),
            Ok(_) => {
                warn!("Scrape of {url} returned no text");
                (String::new(), Some("Scraped page contained no text".to_string()))
            }
            Err(e) => {
                warn!("Scrape of {url} failed: {e}");
                (String::new(), Some(format!("Could not scrape job description: {e}")))
            }
        },
        (None, None) => {
            return Err(AppError::Validation(
                "Either description or url is required".to_string(),
            ))
        }
    };

    let job = jobs
        .create(NewJob {
            user_id: creator,
            title,
            company,
            description,
            source_url: url,
            scrape_warning,
        })
        .await?;

    info!("Job {} created by user {creator}", job.id);
    Ok(job)
}

fn required(value: &str, field: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    Ok(trimmed.to_string())
}
