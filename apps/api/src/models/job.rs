use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub company: String,
    pub description: String,
    pub source_url: Option<String>,
    /// Set when the posting was scraped and the scrape failed; the description is then empty.
    pub scrape_warning: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewJob {
    pub user_id: Uuid,
    pub title: String,
    pub company: String,
    pub description: String,
    pub source_url: Option<String>,
    pub scrape_warning: Option<String>,
}
