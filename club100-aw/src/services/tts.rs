//! Speech synthesis
//!
//! Two backends behind one interface:
//! - Danish goes to the lightweight translate-TTS HTTP endpoint (raw mp3).
//! - Everything else goes to the local `tts` CLI: a dedicated English model,
//!   a generic multilingual model otherwise. Model capabilities (speaker and
//!   language selection) are probed once per model and only the parameters a
//!   model accepts are passed, picking the first listed speaker.
//!
//! All backends share the same post-processing: probe the raw duration,
//! apply a linear fade in/out, re-encode to the standard format. Intermediate
//! files are removed on every path.

use crate::services::ffmpeg::{fade_length, FfmpegClient};
use crate::services::tools::{ensure_output_file, ToolError, ToolRunner};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::process::Command;
use tokio::sync::Mutex;
use tracing::{debug, info};

const REMOTE_TTS_ENDPOINT: &str = "https://translate.google.com/translate_tts";
const ENGLISH_MODEL: &str = "tts_models/en/ljspeech/tacotron2-DDC";
const MULTILINGUAL_MODEL: &str = "tts_models/multilingual/multi-dataset/your_tts";

/// Speech synthesis errors
#[derive(Debug, Error)]
pub enum TtsError {
    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("TTS request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("TTS endpoint returned status {0}")]
    HttpStatus(reqwest::StatusCode),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// What a loaded model accepts
#[derive(Debug, Clone, Default)]
pub struct ModelCapabilities {
    pub speakers: Vec<String>,
    pub languages: Vec<String>,
}

impl ModelCapabilities {
    pub fn is_multi_speaker(&self) -> bool {
        !self.speakers.is_empty()
    }

    pub fn is_multi_lingual(&self) -> bool {
        !self.languages.is_empty()
    }
}

/// Parse a CLI choice listing: one choice per line, log lines (prefixed with
/// `>`) and blanks skipped
pub fn parse_choice_listing(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('>'))
        .map(|line| line.to_string())
        .collect()
}

/// Speech synthesizer with language-dependent backend selection
#[derive(Debug, Clone)]
pub struct SpeechSynthesizer {
    http: reqwest::Client,
    runner: ToolRunner,
    ffmpeg: FfmpegClient,
    // Capability probes are expensive subprocess calls; cache per model name
    capabilities: Arc<Mutex<HashMap<String, ModelCapabilities>>>,
}

impl SpeechSynthesizer {
    pub fn new(runner: ToolRunner, ffmpeg: FfmpegClient) -> Self {
        Self {
            http: reqwest::Client::new(),
            runner,
            ffmpeg,
            capabilities: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Model chosen for a local-synthesis language
    pub fn model_for(language: &str) -> &'static str {
        if language == "en" {
            ENGLISH_MODEL
        } else {
            MULTILINGUAL_MODEL
        }
    }

    /// Turn text into a normalized snippet at `dest`
    pub async fn synthesize(
        &self,
        text: &str,
        language: &str,
        dest: &Path,
    ) -> Result<PathBuf, TtsError> {
        let raw = if language == "da" {
            let raw = dest.with_extension("raw.mp3");
            self.synthesize_remote(text, language, &raw).await?;
            raw
        } else {
            let raw = dest.with_extension("raw.wav");
            self.synthesize_local(text, language, &raw).await?;
            raw
        };

        let result = self.post_process(&raw, dest).await;
        let _ = std::fs::remove_file(&raw);
        result?;
        Ok(dest.to_path_buf())
    }

    /// Lightweight cloud-style synthesizer (raw mp3 over HTTP)
    async fn synthesize_remote(
        &self,
        text: &str,
        language: &str,
        raw: &Path,
    ) -> Result<(), TtsError> {
        debug!(language, "Synthesizing via translate endpoint");
        let response = self
            .http
            .get(REMOTE_TTS_ENDPOINT)
            .query(&[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", language),
                ("q", text),
            ])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(TtsError::HttpStatus(response.status()));
        }
        let bytes = response.bytes().await?;
        std::fs::write(raw, &bytes)?;
        ensure_output_file(raw).map_err(TtsError::Tool)
    }

    /// Local multi-model synthesizer via the `tts` CLI
    async fn synthesize_local(
        &self,
        text: &str,
        language: &str,
        raw: &Path,
    ) -> Result<(), TtsError> {
        let model = Self::model_for(language);
        let caps = self.capabilities_for(model).await;
        debug!(
            model,
            multi_speaker = caps.is_multi_speaker(),
            multi_lingual = caps.is_multi_lingual(),
            "Synthesizing via local model"
        );

        let mut cmd = Command::new("tts");
        cmd.arg("--text")
            .arg(text)
            .arg("--model_name")
            .arg(model)
            .arg("--out_path")
            .arg(raw);
        if let Some(speaker) = caps.speakers.first() {
            cmd.arg("--speaker_idx").arg(speaker);
        }
        if caps.is_multi_lingual() {
            cmd.arg("--language_idx").arg(language);
        }

        self.runner.run("tts", &mut cmd).await?;
        ensure_output_file(raw).map_err(TtsError::Tool)
    }

    /// Probe (once) which parameters a model accepts. A model that rejects a
    /// list flag simply does not support that dimension.
    async fn capabilities_for(&self, model: &str) -> ModelCapabilities {
        let mut cache = self.capabilities.lock().await;
        if let Some(caps) = cache.get(model) {
            return caps.clone();
        }

        let speakers = self.probe_listing(model, "--list_speaker_idxs").await;
        let languages = self.probe_listing(model, "--list_language_idxs").await;
        let caps = ModelCapabilities { speakers, languages };
        info!(
            model,
            speakers = caps.speakers.len(),
            languages = caps.languages.len(),
            "Probed TTS model capabilities"
        );
        cache.insert(model.to_string(), caps.clone());
        caps
    }

    async fn probe_listing(&self, model: &str, flag: &str) -> Vec<String> {
        let result = self
            .runner
            .run_stdout(
                "tts",
                Command::new("tts").arg("--model_name").arg(model).arg(flag),
            )
            .await;
        match result {
            Ok(stdout) => parse_choice_listing(&stdout),
            // Rejected flag or failed probe: treat as "not supported"
            Err(_) => Vec::new(),
        }
    }

    /// Fade in/out then re-encode to the standard format
    async fn post_process(&self, raw: &Path, dest: &Path) -> Result<(), TtsError> {
        let duration = self.ffmpeg.probe_duration(raw).await?;
        let fade = fade_length(duration);
        debug!(duration, fade, "Applying snippet fade");

        let faded = dest.with_extension("faded.mp3");
        let result = async {
            self.ffmpeg.apply_fade(raw, duration, fade, &faded).await?;
            self.ffmpeg.reencode_standard(&faded, dest).await?;
            Ok::<(), TtsError>(())
        }
        .await;
        let _ = std::fs::remove_file(&faded);
        result
    }
}
