use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::{NewResume, ResumeRow, ResumeStatus};

/// Persistence for resume records.
///
/// Carried in `AppState` as `Arc<dyn ResumeStore>`.
#[async_trait]
pub trait ResumeStore: Send + Sync {
    async fn create(&self, resume: NewResume) -> Result<ResumeRow, AppError>;

    /// Sets the status and, when given, the extracted content of a resume.
    async fn record_outcome(
        &self,
        id: Uuid,
        status: ResumeStatus,
        raw_text: Option<String>,
        parsed_data: Option<Value>,
    ) -> Result<ResumeRow, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<ResumeRow>, AppError>;

    /// Newest first.
    async fn list_by_owner(&self, user_id: Uuid) -> Result<Vec<ResumeRow>, AppError>;

    /// Every resume in upload order. Unpaginated.
    async fn list_all(&self) -> Result<Vec<ResumeRow>, AppError>;

    /// Returns false when no such resume existed.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

#[derive(Clone)]
pub struct PgResumeStore {
    pool: PgPool,
}

impl PgResumeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResumeStore for PgResumeStore {
    async fn create(&self, resume: NewResume) -> Result<ResumeRow, AppError> {
        let row = sqlx::query_as::<_, ResumeRow>(
            r#"
            INSERT INTO resumes
                (id, user_id, file_name, file_path, original_name, mime_type, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(resume.user_id)
        .bind(&resume.file_name)
        .bind(&resume.file_path)
        .bind(&resume.original_name)
        .bind(&resume.mime_type)
        .bind(resume.status.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn record_outcome(
        &self,
        id: Uuid,
        status: ResumeStatus,
        raw_text: Option<String>,
        parsed_data: Option<Value>,
    ) -> Result<ResumeRow, AppError> {
        sqlx::query_as::<_, ResumeRow>(
            r#"
            UPDATE resumes
            SET status = $2,
                raw_text = COALESCE($3, raw_text),
                parsed_data = COALESCE($4, parsed_data)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .bind(raw_text)
        .bind(parsed_data)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))
    }

    async fn get(&self, id: Uuid) -> Result<Option<ResumeRow>, AppError> {
        Ok(
            sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn list_by_owner(&self, user_id: Uuid) -> Result<Vec<ResumeRow>, AppError> {
        Ok(sqlx::query_as::<_, ResumeRow>(
            "SELECT * FROM resumes WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn list_all(&self) -> Result<Vec<ResumeRow>, AppError> {
        Ok(
            sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes ORDER BY created_at ASC, id")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM resumes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
