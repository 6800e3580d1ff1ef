use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job::{JobRow, NewJob};

/// Persistence for job postings. Jobs are immutable once created.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn create(&self, job: NewJob) -> Result<JobRow, AppError>;

    /// Newest first.
    async fn list(&self) -> Result<Vec<JobRow>, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<JobRow>, AppError>;
}

#[derive(Clone)]
pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn create(&self, job: NewJob) -> Result<JobRow, AppError> {
        Ok(sqlx::query_as::<_, JobRow>(
            r#"
            INSERT INTO jobs
                (id, user_id, title, company, description, source_url, scrape_warning)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(job.user_id)
        .bind(&job.title)
        .bind(&job.company)
        .bind(&job.description)
        .bind(&job.source_url)
        .bind(&job.scrape_warning)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn list(&self) -> Result<Vec<JobRow>, AppError> {
        Ok(
            sqlx::query_as::<_, JobRow>("SELECT * FROM jobs ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn get(&self, id: Uuid) -> Result<Option<JobRow>, AppError> {
        Ok(sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }
}
