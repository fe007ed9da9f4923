//! Song segment acquisition
//!
//! Obtains a bounded-length audio window from a remote URL: probe the total
//! duration, pick a window, reuse or populate the full-download cache, then
//! trim and encode to mp3. Any failure here fails only the item that asked
//! for it.

use crate::services::cache::MediaCache;
use crate::services::ffmpeg::FfmpegClient;
use crate::services::tools::ToolError;
use crate::services::youtube::{extract_video_id, YoutubeClient};
use rand::Rng;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Window start for a source of `duration` seconds.
///
/// Sources that fit inside one segment always start at 0. Longer sources use
/// the caller's override clamped to `[0, duration - segment]`, or a uniformly
/// random start in that range.
pub fn select_window_start(duration: u64, segment_seconds: u64, start_override: Option<i64>) -> u64 {
    if duration <= segment_seconds {
        return 0;
    }
    let max_start = duration - segment_seconds;
    match start_override {
        Some(start) => (start.max(0) as u64).min(max_start),
        None => rand::thread_rng().gen_range(0..=max_start),
    }
}

/// Downloads and trims song segments
#[derive(Debug, Clone)]
pub struct SongFetcher {
    youtube: YoutubeClient,
    cache: MediaCache,
    ffmpeg: FfmpegClient,
    segment_seconds: u64,
}

impl SongFetcher {
    pub fn new(
        youtube: YoutubeClient,
        cache: MediaCache,
        ffmpeg: FfmpegClient,
        segment_seconds: u64,
    ) -> Self {
        Self {
            youtube,
            cache,
            ffmpeg,
            segment_seconds,
        }
    }

    /// Fetch one segment of the source at `url` into `dest` (mp3).
    ///
    /// The full-length intermediate next to `dest` is removed afterwards on
    /// every path; the cache copy, when the URL has a stable id, is retained.
    pub async fn fetch_segment(
        &self,
        url: &str,
        start_override: Option<i64>,
        dest: &Path,
    ) -> Result<PathBuf, ToolError> {
        let duration = self.youtube.probe_duration(url).await?;
        let start = select_window_start(duration, self.segment_seconds, start_override);
        debug!(url, duration, start, "Selected song window");

        let video_id = extract_video_id(url);
        let temp_full = dest.with_extension("full.m4a");

        let cache_hit = match &video_id {
            Some(id) => self.cache.copy_to(id, &temp_full)?,
            None => false,
        };
        if !cache_hit {
            self.youtube.download_bestaudio(url, &temp_full).await?;
            if let Some(id) = &video_id {
                self.cache.store(id, &temp_full)?;
            }
            info!(url, "Downloaded full audio");
        }

        let trimmed = self
            .ffmpeg
            .trim_window(&temp_full, start, self.segment_seconds, dest)
            .await;
        let _ = std::fs::remove_file(&temp_full);
        trimmed?;

        Ok(dest.to_path_buf())
    }
}
