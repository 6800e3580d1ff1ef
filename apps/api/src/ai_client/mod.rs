//! AI service client, the single point of entry for every call to the external
//! resume/matching service.
//!
//! No other module may talk to the AI service directly. Each operation is
//! one-shot: no retries, no caching. Response bodies are decoded into explicit
//! schemas; anything that does not fit is reported as `AiError::BadResponse`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod schema;

pub use schema::{ExtractedResume, MatchScore, ParsedData, Recommendations};

use schema::{
    ErrorBody, MatchEnvelope, ProcessResumeEnvelope, RecommendEnvelope, ScrapeEnvelope,
};

#[derive(Debug, Error)]
pub enum AiError {
    #[error("connection refused: {0}")]
    ConnectionRefused(String),

    #[error("request timed out")]
    Timeout,

    #[error("AI service returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("unexpected response: {0}")]
    BadResponse(String),

    #[error("transport error: {0}")]
    Transport(String),
}

impl AiError {
    /// True when the service could not be reached at all, or a gateway in front
    /// of it reported it down.
    pub fn is_unavailable(&self) -> bool {
        match self {
            AiError::ConnectionRefused(_) | AiError::Timeout | AiError::Transport(_) => true,
            AiError::Status { status, .. } => matches!(status, 502..=504),
            AiError::BadResponse(_) => false,
        }
    }
}

impl From<reqwest::Error> for AiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AiError::Timeout
        } else if err.is_connect() {
            AiError::ConnectionRefused(err.to_string())
        } else if err.is_decode() {
            AiError::BadResponse(err.to_string())
        } else {
            AiError::Transport(err.to_string())
        }
    }
}

/// The four remote operations the backend depends on.
///
/// Carried in `AppState` as `Arc<dyn AiService>` so orchestrators can be
/// exercised against a scripted double.
#[async_trait]
pub trait AiService: Send + Sync {
    /// Fetches and cleans the text of a job posting.
    async fn scrape_job_posting(&self, url: &str) -> Result<String, AiError>;

    /// `file_ref` is a local path or a short-lived signed URL.
    async fn extract_resume(&self, file_ref: &str) -> Result<ExtractedResume, AiError>;

    async fn score_match(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<MatchScore, AiError>;

    async fn recommend_jobs(&self, resume_text: &str) -> Result<Recommendations, AiError>;
}

#[derive(Debug, Serialize)]
struct ScrapeRequest<'a> {
    url: &'a str,
}

#[derive(Debug, Serialize)]
struct ProcessResumeRequest<'a> {
    file_path: &'a str,
}

#[derive(Debug, Serialize)]
struct MatchRequest<'a> {
    resume_text: &'a str,
    job_description: &'a str,
}

#[derive(Debug, Serialize)]
struct RecommendRequest<'a> {
    resume_text: &'a str,
}

/// reqwest-backed client for the AI service HTTP contract.
#[derive(Clone)]
pub struct HttpAiClient {
    client: Client,
    base_url: String,
}

impl HttpAiClient {
    /// `base_url` must already be normalized (scheme present, no trailing slash).
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, AiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AiError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, AiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, path);
        let response = self.client.post(&url).json(body).send().await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(AiError::Status {
                status: status.as_u16(),
                message: error_detail(&text),
            });
        }

        debug!("AI service {path} answered {status} ({} bytes)", text.len());

        serde_json::from_str(&text)
            .map_err(|e| AiError::BadResponse(format!("{path}: {e}")))
    }
}

#[async_trait]
impl AiService for HttpAiClient {
    async fn scrape_job_posting(&self, url: &str) -> Result<String, AiError> {
        let envelope: ScrapeEnvelope = self.post("scrape-job", &ScrapeRequest { url }).await?;
        envelope.into_text()
    }

    async fn extract_resume(&self, file_ref: &str) -> Result<ExtractedResume, AiError> {
        let envelope: ProcessResumeEnvelope = self
            .post(
                "process-resume",
                &ProcessResumeRequest {
                    file_path: file_ref,
                },
            )
            .await?;
        envelope.into_extracted()
    }

    async fn score_match(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<MatchScore, AiError> {
        let envelope: MatchEnvelope = self
            .post(
                "match-jobs",
                &MatchRequest {
                    resume_text,
                    job_description,
                },
            )
            .await?;
        envelope.into_score()
    }

    async fn recommend_jobs(&self, resume_text: &str) -> Result<Recommendations, AiError> {
        let envelope: RecommendEnvelope = self
            .post("recommend-jobs", &RecommendRequest { resume_text })
            .await?;
        Ok(envelope.into())
    }
}

/// Pulls `detail` out of a FastAPI-style error body, falling back to the raw body.
fn error_detail(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody { detail }) => match detail {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        },
        Err(_) => body.to_string(),
    }
}
