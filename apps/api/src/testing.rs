//! In-memory doubles for the store, object-store and AI seams.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::ai_client::{AiError, AiService, ExtractedResume, MatchScore, Recommendations};
use crate::config::{Config, StorageBackend};
use crate::errors::AppError;
use crate::jobs::store::JobStore;
use crate::models::job::{JobRow, NewJob};
use crate::models::resume::{NewResume, ResumeRow, ResumeStatus};
use crate::resumes::store::ResumeStore;
use crate::state::AppState;
use crate::storage::{ObjectStore, StorageError, StoredObject};

pub const TEST_JWT_SECRET: &str = "test-secret";

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://unused".to_string(),
        jwt_secret: TEST_JWT_SECRET.to_string(),
        ai_service_url: "http://127.0.0.1:8000".to_string(),
        ai_timeout_secs: 5,
        storage: StorageBackend::Local {
            upload_dir: "uploads".to_string(),
        },
        match_concurrency: 4,
        cors_allowed_origins: Vec::new(),
        port: 0,
        rust_log: "debug".to_string(),
    }
}

/// Test doubles plus the `AppState` wired from them.
pub struct TestApp {
    pub resumes: Arc<InMemoryResumeStore>,
    pub jobs: Arc<InMemoryJobStore>,
    pub objects: Arc<InMemoryObjectStore>,
    pub ai: Arc<ScriptedAi>,
    pub state: AppState,
}

impl TestApp {
    pub fn new(ai: ScriptedAi) -> Self {
        let resumes = Arc::new(InMemoryResumeStore::default());
        let jobs = Arc::new(InMemoryJobStore::default());
        let objects = Arc::new(InMemoryObjectStore::default());
        let ai = Arc::new(ai);
        let state = AppState {
            resumes: resumes.clone(),
            jobs: jobs.clone(),
            storage: objects.clone(),
            ai: ai.clone(),
            config: test_config(),
        };
        Self {
            resumes,
            jobs,
            objects,
            ai,
            state,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Resume store
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryResumeStore {
    rows: Mutex<Vec<ResumeRow>>,
    history: Mutex<HashMap<Uuid, Vec<ResumeStatus>>>,
    fail_creates: bool,
    fail_completions: bool,
}

impl InMemoryResumeStore {
    pub fn failing_creates() -> Self {
        Self {
            fail_creates: true,
            ..Default::default()
        }
    }

    /// Rejects every attempt to mark a resume completed.
    pub fn failing_completions() -> Self {
        Self {
            fail_completions: true,
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn status_history(&self, id: Uuid) -> Vec<ResumeStatus> {
        self.history
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .unwrap_or_default()
    }

    /// Seeds a completed resume with the given content.
    pub fn seed(&self, user_id: Uuid, raw_text: Option<&str>, parsed_data: Option<Value>) -> ResumeRow {
        let id = Uuid::new_v4();
        let row = ResumeRow {
            id,
            user_id,
            file_name: format!("resume-{id}.pdf"),
            file_path: format!("memory://resume-{id}.pdf"),
            original_name: "resume.pdf".to_string(),
            mime_type: "application/pdf".to_string(),
            parsed_data,
            raw_text: raw_text.map(String::from),
            status: ResumeStatus::Completed.as_str().to_string(),
            created_at: Utc::now(),
        };
        self.rows.lock().unwrap().push(row.clone());
        row
    }
}

#[async_trait]
impl ResumeStore for InMemoryResumeStore {
    async fn create(&self, resume: NewResume) -> Result<ResumeRow, AppError> {
        if self.fail_creates {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }
        let row = ResumeRow {
            id: Uuid::new_v4(),
            user_id: resume.user_id,
            file_name: resume.file_name,
            file_path: resume.file_path,
            original_name: resume.original_name,
            mime_type: resume.mime_type,
            parsed_data: None,
            raw_text: None,
            status: resume.status.as_str().to_string(),
            created_at: Utc::now(),
        };
        self.history
            .lock()
            .unwrap()
            .insert(row.id, vec![resume.status]);
        self.rows.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn record_outcome(
        &self,
        id: Uuid,
        status: ResumeStatus,
        raw_text: Option<String>,
        parsed_data: Option<Value>,
    ) -> Result<ResumeRow, AppError> {
        if self.fail_completions && status == ResumeStatus::Completed {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))?;
        row.status = status.as_str().to_string();
        if raw_text.is_some() {
            row.raw_text = raw_text;
        }
        if parsed_data.is_some() {
            row.parsed_data = parsed_data;
        }
        self.history
            .lock()
            .unwrap()
            .entry(id)
            .or_default()
            .push(status);
        Ok(row.clone())
    }

    async fn get(&self, id: Uuid) -> Result<Option<ResumeRow>, AppError> {
        Ok(self.rows.lock().unwrap().iter().find(|r| r.id == id).cloned())
    }

    async fn list_by_owner(&self, user_id: Uuid) -> Result<Vec<ResumeRow>, AppError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<ResumeRow>, AppError> {
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| r.id != id);
        Ok(rows.len() < before)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Job store
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryJobStore {
    rows: Mutex<Vec<JobRow>>,
}

impl InMemoryJobStore {
    pub fn seed(&self, title: &str, description: &str) -> JobRow {
        let row = JobRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: title.to_string(),
            company: "Acme".to_string(),
            description: description.to_string(),
            source_url: None,
            scrape_warning: None,
            created_at: Utc::now(),
        };
        self.rows.lock().unwrap().push(row.clone());
        row
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn create(&self, job: NewJob) -> Result<JobRow, AppError> {
        let row = JobRow {
            id: Uuid::new_v4(),
            user_id: job.user_id,
            title: job.title,
            company: job.company,
            description: job.description,
            source_url: job.source_url,
            scrape_warning: job.scrape_warning,
            created_at: Utc::now(),
        };
        self.rows.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn list(&self) -> Result<Vec<JobRow>, AppError> {
        Ok(self.rows.lock().unwrap().iter().rev().cloned().collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<JobRow>, AppError> {
        Ok(self.rows.lock().unwrap().iter().find(|j| j.id == id).cloned())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Object store
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryObjectStore {
    objects: Mutex<BTreeMap<String, Bytes>>,
    fail_writes: bool,
    fail_deletes: bool,
}

impl InMemoryObjectStore {
    pub fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Default::default()
        }
    }

    pub fn failing_deletes() -> Self {
        Self {
            fail_deletes: true,
            ..Default::default()
        }
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    pub fn insert(&self, key: &str) {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), Bytes::from_static(b"%PDF"));
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn put(
        &self,
        key: &str,
        bytes: Bytes,
        _content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        if self.fail_writes {
            return Err(StorageError::Backend("bucket unavailable".to_string()));
        }
        self.objects.lock().unwrap().insert(key.to_string(), bytes);
        Ok(StoredObject {
            key: key.to_string(),
            reference: format!("memory://{key}"),
        })
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        if self.fail_deletes {
            return Err(StorageError::Backend("delete refused".to_string()));
        }
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    async fn processing_reference(
        &self,
        object: &StoredObject,
        _ttl: Duration,
    ) -> Result<String, StorageError> {
        Ok(object.reference.clone())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// AI service
// ────────────────────────────────────────────────────────────────────────────

/// Scripted AI service. Match scores are keyed by resume text; an unscripted
/// call fails with `ConnectionRefused`.
#[derive(Default)]
pub struct ScriptedAi {
    extractions: Mutex<VecDeque<Result<ExtractedResume, AiError>>>,
    extraction_refs: Mutex<Vec<String>>,
    scores: HashMap<String, f64>,
    delays: HashMap<String, Duration>,
    score_calls: Mutex<Vec<(String, String)>>,
    scrape: Option<String>,
    recommendations: Mutex<Option<Result<Recommendations, AiError>>>,
    recommend_calls: Mutex<Vec<String>>,
}

impl ScriptedAi {
    pub fn with_extraction(self, result: Result<ExtractedResume, AiError>) -> Self {
        self.extractions.lock().unwrap().push_back(result);
        self
    }

    pub fn with_score(mut self, resume_text: &str, score: f64) -> Self {
        self.scores.insert(resume_text.to_string(), score);
        self
    }

    pub fn with_delay(mut self, resume_text: &str, delay: Duration) -> Self {
        self.delays.insert(resume_text.to_string(), delay);
        self
    }

    pub fn with_scrape(mut self, text: &str) -> Self {
        self.scrape = Some(text.to_string());
        self
    }

    pub fn with_recommendations(self, result: Result<Recommendations, AiError>) -> Self {
        *self.recommendations.lock().unwrap() = Some(result);
        self
    }

    pub fn extraction_refs(&self) -> Vec<String> {
        self.extraction_refs.lock().unwrap().clone()
    }

    pub fn score_calls(&self) -> Vec<(String, String)> {
        self.score_calls.lock().unwrap().clone()
    }

    pub fn recommend_calls(&self) -> Vec<String> {
        self.recommend_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AiService for ScriptedAi {
    async fn scrape_job_posting(&self, url: &str) -> Result<String, AiError> {
        self.scrape
            .clone()
            .ok_or_else(|| AiError::ConnectionRefused(format!("cannot scrape {url}")))
    }

    async fn extract_resume(&self, file_ref: &str) -> Result<ExtractedResume, AiError> {
        self.extraction_refs
            .lock()
            .unwrap()
            .push(file_ref.to_string());
        self.extractions
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AiError::BadResponse("no extraction scripted".to_string())))
    }

    async fn score_match(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<MatchScore, AiError> {
        self.score_calls
            .lock()
            .unwrap()
            .push((resume_text.to_string(), job_description.to_string()));
        if let Some(delay) = self.delays.get(resume_text) {
            tokio::time::sleep(*delay).await;
        }
        self.scores
            .get(resume_text)
            .map(|score| MatchScore {
                score: *score,
                missing_keywords: vec!["kubernetes".to_string()],
            })
            .ok_or_else(|| AiError::ConnectionRefused("no score scripted".to_string()))
    }

    async fn recommend_jobs(&self, resume_text: &str) -> Result<Recommendations, AiError> {
        self.recommend_calls
            .lock()
            .unwrap()
            .push(resume_text.to_string());
        self.recommendations
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Err(AiError::ConnectionRefused("connection refused".to_string())))
    }
}
