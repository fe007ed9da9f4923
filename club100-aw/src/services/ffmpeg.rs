//! ffmpeg/ffprobe wrappers
//!
//! All segments are normalized to one encoding (44.1kHz stereo mp3 at
//! 192kbit) so final assembly is a pure concatenation with no per-segment
//! re-encoding decisions.

use crate::services::tools::{ensure_output_file, ToolError, ToolRunner};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

/// Standard output encoding arguments, shared by every encode step
const STANDARD_ENCODE_ARGS: [&str; 8] = [
    "-ar", "44100", "-ac", "2", "-codec:a", "libmp3lame", "-b:a", "192k",
];

/// Fade length for a raw snippet of the given duration.
///
/// Clips longer than 2.2s always get a 1.0s fade; at or below that the fade
/// is a tenth of the clip, capped at half a second.
pub fn fade_length(duration: f64) -> f64 {
    if duration > 2.2 {
        1.0
    } else {
        (duration * 0.1).min(0.5)
    }
}

/// ffmpeg/ffprobe client
#[derive(Debug, Clone)]
pub struct FfmpegClient {
    runner: ToolRunner,
}

impl FfmpegClient {
    pub fn new(runner: ToolRunner) -> Self {
        Self { runner }
    }

    /// Duration of a local media file in seconds (ffprobe)
    pub async fn probe_duration(&self, path: &Path) -> Result<f64, ToolError> {
        let stdout = self
            .runner
            .run_stdout(
                "ffprobe",
                Command::new("ffprobe").args([
                    "-v",
                    "error",
                    "-show_entries",
                    "format=duration",
                    "-of",
                    "default=noprint_wrappers=1:nokey=1",
                ])
                .arg(path),
            )
            .await?;

        stdout.parse::<f64>().map_err(|_| ToolError::Parse {
            tool: "ffprobe",
            detail: format!("not a duration: {stdout:?}"),
        })
    }

    /// Re-encode any input to the standard output format
    pub async fn reencode_standard(&self, input: &Path, output: &Path) -> Result<(), ToolError> {
        debug!(input = %input.display(), output = %output.display(), "Re-encoding to standard format");
        self.runner
            .run(
                "ffmpeg",
                Command::new("ffmpeg")
                    .args(["-y", "-i"])
                    .arg(input)
                    .args(STANDARD_ENCODE_ARGS)
                    .arg(output),
            )
            .await?;
        ensure_output_file(output)
    }

    /// Cut a window out of a full-length download and encode it as mp3
    pub async fn trim_window(
        &self,
        input: &Path,
        start_seconds: u64,
        length_seconds: u64,
        output: &Path,
    ) -> Result<(), ToolError> {
        self.runner
            .run(
                "ffmpeg",
                Command::new("ffmpeg")
                    .args(["-y", "-ss"])
                    .arg(start_seconds.to_string())
                    .arg("-i")
                    .arg(input)
                    .arg("-t")
                    .arg(length_seconds.to_string())
                    .args(["-acodec", "mp3"])
                    .arg(output),
            )
            .await?;
        ensure_output_file(output)
    }

    /// Apply a linear fade-in at 0 and fade-out ending at end-of-clip
    pub async fn apply_fade(
        &self,
        input: &Path,
        duration: f64,
        fade: f64,
        output: &Path,
    ) -> Result<(), ToolError> {
        let fade_out_start = (duration - fade).max(0.0);
        let filter = format!(
            "afade=t=in:ss=0:d={fade:.2},afade=t=out:st={fade_out_start:.2}:d={fade:.2}"
        );
        self.runner
            .run(
                "ffmpeg",
                Command::new("ffmpeg")
                    .args(["-y", "-i"])
                    .arg(input)
                    .arg("-af")
                    .arg(&filter)
                    .arg(output),
            )
            .await?;
        ensure_output_file(output)
    }

    /// Concatenate all manifest entries into the final mixtape
    pub async fn concat(&self, manifest: &Path, output: &Path) -> Result<(), ToolError> {
        self.runner
            .run(
                "ffmpeg",
                Command::new("ffmpeg")
                    .args(["-y", "-f", "concat", "-safe", "0", "-i"])
                    .arg(manifest)
                    .args(STANDARD_ENCODE_ARGS)
                    .arg(output),
            )
            .await?;
        ensure_output_file(output)
    }
}

/// Render an ffmpeg concat manifest: one `file '<path>'` line per segment,
/// in the order given
pub fn render_concat_manifest(segments: &[PathBuf]) -> String {
    let mut manifest = String::new();
    for path in segments {
        manifest.push_str(&format!("file '{}'\n", path.display()));
    }
    manifest
}
