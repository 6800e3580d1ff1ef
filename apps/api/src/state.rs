use std::sync::Arc;

use crate::ai_client::AiService;
use crate::config::Config;
use crate::jobs::store::JobStore;
use crate::resumes::store::ResumeStore;
use crate::storage::ObjectStore;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Each collaborator sits behind a trait object so the backend (PostgreSQL,
/// local disk or S3, the HTTP AI client) is chosen once at startup.
#[derive(Clone)]
pub struct AppState {
    pub resumes: Arc<dyn ResumeStore>,
    pub jobs: Arc<dyn JobStore>,
    /// Local disk or S3, per `STORAGE_BACKEND`.
    pub storage: Arc<dyn ObjectStore>,
    pub ai: Arc<dyn AiService>,
    pub config: Config,
}
