use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle of an uploaded resume: `uploaded → processing → {completed | failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResumeStatus {
    Uploaded,
    Processing,
    Completed,
    Failed,
}

impl ResumeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ResumeStatus::Uploaded => "uploaded",
            ResumeStatus::Processing => "processing",
            ResumeStatus::Completed => "completed",
            ResumeStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for ResumeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResumeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uploaded" => Ok(ResumeStatus::Uploaded),
            "processing" => Ok(ResumeStatus::Processing),
            "completed" => Ok(ResumeStatus::Completed),
            "failed" => Ok(ResumeStatus::Failed),
            other => Err(format!("unknown resume status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Storage key (local file name or bucket key).
    pub file_name: String,
    /// Local path or bucket URL of the stored object.
    pub file_path: String,
    pub original_name: String,
    pub mime_type: String,
    pub parsed_data: Option<Value>,
    pub raw_text: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl ResumeRow {
    pub fn status(&self) -> Option<ResumeStatus> {
        self.status.parse().ok()
    }

    /// Text handed to the matcher: raw text first, serialized parsed data otherwise.
    pub fn match_text(&self) -> Option<String> {
        if let Some(text) = self.raw_text.as_deref().filter(|t| !t.trim().is_empty()) {
            return Some(text.to_string());
        }
        match &self.parsed_data {
            None | Some(Value::Null) => None,
            Some(data) => serde_json::to_string(data).ok(),
        }
    }
}

/// Fields supplied when a resume record is first persisted.
#[derive(Debug, Clone)]
pub struct NewResume {
    pub user_id: Uuid,
    pub file_name: String,
    pub file_path: String,
    pub original_name: String,
    pub mime_type: String,
    pub status: ResumeStatus,
}
