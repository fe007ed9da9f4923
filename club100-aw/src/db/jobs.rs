//! Job record persistence

use crate::models::{Job, JobStatus};
use chrono::{DateTime, Utc};
use club100_common::Result;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Insert a job record (one insert per job, no updates)
pub async fn insert_job(pool: &SqlitePool, job: &Job) -> Result<()> {
    sqlx::query("INSERT INTO jobs (id, status, output_path, created_at) VALUES (?, ?, ?, ?)")
        .bind(job.id.to_string())
        .bind(job.status.as_str())
        .bind(&job.output_path)
        .bind(job.created_at.to_rfc3339())
        .execute(pool)
        .await?;
    Ok(())
}

/// List all jobs, newest first
pub async fn list_jobs(pool: &SqlitePool) -> Result<Vec<Job>> {
    let rows = sqlx::query("SELECT id, status, output_path, created_at FROM jobs ORDER BY created_at DESC")
        .fetch_all(pool)
        .await?;

    let mut jobs = Vec::with_capacity(rows.len());
    for row in rows {
        let id: String = row.get("id");
        let status: String = row.get("status");
        let output_path: Option<String> = row.get("output_path");
        let created_at: String = row.get("created_at");

        // Rows written by other versions are skipped, not fatal
        let (Ok(id), Some(status), Ok(created_at)) = (
            Uuid::parse_str(&id),
            JobStatus::parse(&status),
            DateTime::parse_from_rfc3339(&created_at),
        ) else {
            tracing::warn!(job_id = %id, "Skipping unparseable job row");
            continue;
        };

        jobs.push(Job {
            id,
            status,
            output_path,
            created_at: created_at.with_timezone(&Utc),
        });
    }
    Ok(jobs)
}
