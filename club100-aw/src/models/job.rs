//! Job records
//!
//! One row per generation attempt. `done` and `failed` are the only states
//! ever persisted; in-flight phases are visible in the logs only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Terminal job status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Done,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Done => "done",
            JobStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "done" => Some(JobStatus::Done),
            "failed" => Some(JobStatus::Failed),
            _ => None,
        }
    }
}

/// Persisted job record
#[derive(Debug, Clone, Serialize)]
pub struct Job {
    pub id: Uuid,
    pub status: JobStatus,
    /// Absolute path of the finished mixtape; None for failed jobs
    pub output_path: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Job {
    pub fn done(id: Uuid, output_path: String) -> Self {
        Self {
            id,
            status: JobStatus::Done,
            output_path: Some(output_path),
            created_at: Utc::now(),
        }
    }

    pub fn failed(id: Uuid) -> Self {
        Self {
            id,
            status: JobStatus::Failed,
            output_path: None,
            created_at: Utc::now(),
        }
    }
}
