//! yt-dlp wrappers
//!
//! Remote duration probing, bestaudio downloads, and search. yt-dlp is an
//! opaque external process; only its argument and output contracts matter
//! here.

use crate::services::tools::{ensure_output_file, ToolError, ToolRunner};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

static VIDEO_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:v=|youtu\.be/|youtube\.com/embed/)([\w-]{11})").unwrap());

/// Extract the stable video identifier from a YouTube URL, when present.
///
/// Used as the download cache key; URLs without a recognizable id are simply
/// not cached.
pub fn extract_video_id(url: &str) -> Option<String> {
    VIDEO_ID_RE
        .captures(url)
        .map(|caps| caps[1].to_string())
}

/// Parse yt-dlp's `--get-duration` output (`H:MM:SS`, `M:SS`, or `S`)
pub fn parse_duration(s: &str) -> Option<u64> {
    let parts: Vec<&str> = s.trim().split(':').collect();
    let nums: Vec<u64> = parts
        .iter()
        .map(|p| p.parse::<u64>())
        .collect::<Result<_, _>>()
        .ok()?;
    match nums.as_slice() {
        [h, m, s] => Some(h * 3600 + m * 60 + s),
        [m, s] => Some(m * 60 + s),
        [s] => Some(*s),
        _ => None,
    }
}

/// One search hit
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub url: String,
    pub title: String,
    pub artist: String,
    pub thumbnail: String,
}

/// Parse the tab-separated `--print` output of a search invocation
pub fn parse_search_output(stdout: &str) -> Vec<SearchResult> {
    stdout
        .lines()
        .filter_map(|line| {
            let parts: Vec<&str> = line.split('\t').collect();
            if parts.len() < 2 {
                return None;
            }
            Some(SearchResult {
                url: format!("https://www.youtube.com/watch?v={}", parts[0]),
                title: parts[1].to_string(),
                artist: parts.get(2).unwrap_or(&"").to_string(),
                thumbnail: parts.get(3).unwrap_or(&"").to_string(),
            })
        })
        .collect()
}

/// yt-dlp client
#[derive(Debug, Clone)]
pub struct YoutubeClient {
    runner: ToolRunner,
}

impl YoutubeClient {
    pub fn new(runner: ToolRunner) -> Self {
        Self { runner }
    }

    /// Total source duration in seconds
    pub async fn probe_duration(&self, url: &str) -> Result<u64, ToolError> {
        let stdout = self
            .runner
            .run_stdout(
                "yt-dlp",
                Command::new("yt-dlp").arg("--get-duration").arg(url),
            )
            .await?;
        parse_duration(&stdout).ok_or_else(|| ToolError::Parse {
            tool: "yt-dlp",
            detail: format!("not a duration: {stdout:?}"),
        })
    }

    /// Download the best audio stream to `dest`
    pub async fn download_bestaudio(&self, url: &str, dest: &Path) -> Result<(), ToolError> {
        debug!(url, dest = %dest.display(), "Downloading bestaudio");
        self.runner
            .run(
                "yt-dlp",
                Command::new("yt-dlp")
                    .args(["-f", "bestaudio", "-o"])
                    .arg(dest)
                    .arg(url),
            )
            .await?;
        ensure_output_file(dest)
    }

    /// Search YouTube, returning up to five results
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>, ToolError> {
        let stdout = self
            .runner
            .run_stdout(
                "yt-dlp",
                Command::new("yt-dlp")
                    .args([
                        "--default-search",
                        "ytsearch5:",
                        "--print",
                        "%(id)s\t%(title)s\t%(uploader)s\t%(thumbnail)s",
                    ])
                    .arg(query),
            )
            .await?;
        Ok(parse_search_output(&stdout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_id_from_watch_url() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn extracts_id_from_short_and_embed_urls() {
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ?t=30"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/embed/abc-DEF_123"),
            Some("abc-DEF_123".to_string())
        );
    }

    #[test]
    fn no_id_for_foreign_urls() {
        assert_eq!(extract_video_id("https://example.com/song.mp3"), None);
    }

    #[test]
    fn parses_all_duration_shapes() {
        assert_eq!(parse_duration("1:02:03"), Some(3723));
        assert_eq!(parse_duration("4:05"), Some(245));
        assert_eq!(parse_duration("59"), Some(59));
        assert_eq!(parse_duration("not-a-duration"), None);
        assert_eq!(parse_duration("1:2:3:4"), None);
    }

    #[test]
    fn parses_search_rows_and_skips_garbage() {
        let stdout = "abc12345678\tSong Title\tUploader\thttps://thumb\nbad-line\nxyz\tOnly Title";
        let results = parse_search_output(stdout);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].url, "https://www.youtube.com/watch?v=abc12345678");
        assert_eq!(results[0].artist, "Uploader");
        assert_eq!(results[1].title, "Only Title");
        assert_eq!(results[1].thumbnail, "");
    }
}
