//! Mixtape pipeline
//!
//! Owns the job lifecycle: created → downloading → processing → assembling →
//! done. Two fan-out rounds run per job — song downloads first, then item
//! processing — followed by ordered assembly of whatever survived. Only the
//! final concatenation may fail the job; everything before it degrades to
//! dropped items.

use crate::db::jobs;
use crate::models::{Job, TimelineItem};
use crate::services::fanout::collect_indexed;
use crate::services::fetcher::SongFetcher;
use crate::services::ffmpeg::{render_concat_manifest, FfmpegClient};
use crate::services::processor::ItemProcessor;
use anyhow::{Context, Result};
use club100_common::Error;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

/// Job-scoped working directory, removed on drop (success or failure)
struct JobDir {
    path: PathBuf,
}

impl JobDir {
    fn create(job_id: Uuid) -> std::io::Result<Self> {
        let path = std::env::temp_dir().join(format!("club100_{job_id}"));
        std::fs::create_dir_all(&path)?;
        Ok(Self { path })
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for JobDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

/// Walk indices in timeline order, keeping only outputs that exist on disk.
/// Missing indices are skipped with a warning; the result is never reordered
/// or padded.
pub fn surviving_segments(
    timeline_len: usize,
    outputs: &HashMap<usize, PathBuf>,
) -> Vec<PathBuf> {
    let mut segments = Vec::new();
    for index in 0..timeline_len {
        match outputs.get(&index) {
            Some(path) if path.exists() => segments.push(path.clone()),
            _ => warn!(item_index = index, "Skipping item with no output"),
        }
    }
    segments
}

/// End-to-end job driver
#[derive(Debug, Clone)]
pub struct MixtapePipeline {
    db: SqlitePool,
    fetcher: SongFetcher,
    processor: ItemProcessor,
    ffmpeg: FfmpegClient,
    output_dir: PathBuf,
    default_language: String,
    workers: usize,
}

impl MixtapePipeline {
    pub fn new(
        db: SqlitePool,
        fetcher: SongFetcher,
        processor: ItemProcessor,
        ffmpeg: FfmpegClient,
        output_dir: PathBuf,
        default_language: String,
        workers: usize,
    ) -> Self {
        Self {
            db,
            fetcher,
            processor,
            ffmpeg,
            output_dir,
            default_language,
            workers,
        }
    }

    /// Run one job over an already-parsed timeline. Returns the persisted
    /// job record with the final artifact path.
    pub async fn run(
        &self,
        items: Vec<Option<TimelineItem>>,
        language: Option<String>,
    ) -> Result<Job> {
        let job_id = Uuid::new_v4();
        let language = language.unwrap_or_else(|| self.default_language.clone());
        info!(job_id = %job_id, items = items.len(), %language, "Job created");

        let job_dir = JobDir::create(job_id).context("creating job working directory")?;

        let result = self.run_in_dir(job_id, &items, &language, job_dir.path()).await;

        // Working directory removed by the guard on both paths; a failed job
        // is still recorded so it shows up in the job list.
        match result {
            Ok(output) => {
                let job = Job::done(job_id, output.display().to_string());
                jobs::insert_job(&self.db, &job).await?;
                info!(job_id = %job_id, output = %output.display(), "Job done");
                Ok(job)
            }
            Err(e) => {
                if let Err(db_err) = jobs::insert_job(&self.db, &Job::failed(job_id)).await {
                    warn!(job_id = %job_id, error = %db_err, "Failed to record failed job");
                }
                Err(e)
            }
        }
    }

    async fn run_in_dir(
        &self,
        job_id: Uuid,
        items: &[Option<TimelineItem>],
        language: &str,
        job_dir: &Path,
    ) -> Result<PathBuf> {
        // Phase 1: download round, song items only
        info!(job_id = %job_id, "Downloading song audio");
        let downloads = self.download_round(items, job_dir).await;

        // Phase 2: processing round, every item
        info!(job_id = %job_id, prefetched = downloads.len(), "Processing timeline items");
        let outputs = self.process_round(items, &downloads, language, job_dir).await;

        // Phase 3: ordered assembly
        info!(job_id = %job_id, produced = outputs.len(), "Assembling mixtape");
        let segments = surviving_segments(items.len(), &outputs);
        if segments.is_empty() {
            return Err(Error::InvalidInput("timeline produced no segments".to_string()).into());
        }

        let manifest_path = job_dir.join("concat.txt");
        std::fs::write(&manifest_path, render_concat_manifest(&segments))
            .context("writing concat manifest")?;

        let output = self.output_dir.join(format!("club100_{job_id}.mp3"));
        self.ffmpeg
            .concat(&manifest_path, &output)
            .await
            .context("concatenating final mixtape")?;

        Ok(output)
    }

    /// Fan out one download task per song item; other items are skipped.
    /// Absent indices mean "nothing prefetched" for the processing round.
    async fn download_round(
        &self,
        items: &[Option<TimelineItem>],
        job_dir: &Path,
    ) -> HashMap<usize, PathBuf> {
        let mut tasks = Vec::new();
        for (index, item) in items.iter().enumerate() {
            let Some(TimelineItem::Song { song }) = item else {
                continue;
            };
            let fetcher = self.fetcher.clone();
            let url = song.url.clone();
            let start = song.start;
            let dest = job_dir.join(format!("song_{index:03}_raw.mp3"));
            tasks.push((index, async move {
                match fetcher.fetch_segment(&url, start, &dest).await {
                    Ok(path) => Some(path),
                    Err(e) => {
                        warn!(item_index = index, url, error = %e, "Song download failed");
                        None
                    }
                }
            }));
        }
        collect_indexed(tasks, self.workers).await
    }

    /// Fan out one processing task per parsed item
    async fn process_round(
        &self,
        items: &[Option<TimelineItem>],
        downloads: &HashMap<usize, PathBuf>,
        language: &str,
        job_dir: &Path,
    ) -> HashMap<usize, PathBuf> {
        let mut tasks = Vec::new();
        for (index, item) in items.iter().enumerate() {
            let Some(item) = item.clone() else {
                // Unprocessable at parse time; already logged there
                continue;
            };
            let processor = self.processor.clone();
            let prefetched = downloads.get(&index).cloned();
            let job_dir = job_dir.to_path_buf();
            let language = language.to_string();
            tasks.push((index, async move {
                processor
                    .process(index, &item, prefetched.as_deref(), &job_dir, &language)
                    .await
            }));
        }
        collect_indexed(tasks, self.workers).await
    }
}
