pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::auth;
use crate::jobs::handlers as jobs;
use crate::resumes::handlers as resumes;
use crate::state::AppState;
use crate::storage::MAX_UPLOAD_BYTES;

/// Room for multipart boundaries and headers on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/auth/me", get(auth::handle_me))
        // Resume API
        .route(
            "/api/resumes/upload",
            post(resumes::handle_upload)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + MULTIPART_OVERHEAD_BYTES)),
        )
        .route("/api/resumes", get(resumes::handle_list_mine))
        .route(
            "/api/resumes/:id",
            get(resumes::handle_get).delete(resumes::handle_delete),
        )
        // Jobs API
        .route("/api/jobs", get(jobs::handle_list).post(jobs::handle_create))
        .route("/api/jobs/recommend", post(jobs::handle_recommend))
        .route("/api/jobs/:id/match", get(jobs::handle_match))
        .with_state(state)
}
