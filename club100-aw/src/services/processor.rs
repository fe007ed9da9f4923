//! Timeline item processing
//!
//! Turns one timeline item (plus any prefetched song audio) into one
//! normalized segment file in the job's working directory. Failures are
//! contained here: every error is logged with the item index and converted
//! into "no output", so one bad item never aborts the batch.

use crate::catalog::EffectCatalog;
use crate::models::{SnippetSpec, SongSpec, TimelineItem};
use crate::services::ffmpeg::FfmpegClient;
use crate::services::tts::SpeechSynthesizer;
use anyhow::{bail, Context, Result};
use base64::Engine;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::error;

static DATA_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^data:audio/\w+;base64,(.*)$").unwrap());

/// Decode an uploaded snippet payload: either a raw base64 string or a
/// `data:audio/*;base64,` URL.
pub fn decode_upload_payload(payload: &str) -> Result<Vec<u8>> {
    let b64 = DATA_URL_RE
        .captures(payload)
        .map(|caps| caps.get(1).map_or("", |m| m.as_str()).to_string())
        .unwrap_or_else(|| payload.to_string());
    base64::engine::general_purpose::STANDARD
        .decode(b64.trim())
        .context("invalid base64 audio payload")
}

/// Per-item processor
#[derive(Debug, Clone)]
pub struct ItemProcessor {
    ffmpeg: FfmpegClient,
    synthesizer: SpeechSynthesizer,
    catalog: Arc<EffectCatalog>,
}

impl ItemProcessor {
    pub fn new(
        ffmpeg: FfmpegClient,
        synthesizer: SpeechSynthesizer,
        catalog: Arc<EffectCatalog>,
    ) -> Self {
        Self {
            ffmpeg,
            synthesizer,
            catalog,
        }
    }

    /// Process one item. Never fails outward: errors become `None`.
    pub async fn process(
        &self,
        index: usize,
        item: &TimelineItem,
        prefetched: Option<&Path>,
        job_dir: &Path,
        default_language: &str,
    ) -> Option<PathBuf> {
        match self
            .try_process(index, item, prefetched, job_dir, default_language)
            .await
        {
            Ok(path) => Some(path),
            Err(e) => {
                error!(item_index = index, error = ?e, "Timeline item failed");
                None
            }
        }
    }

    async fn try_process(
        &self,
        index: usize,
        item: &TimelineItem,
        prefetched: Option<&Path>,
        job_dir: &Path,
        default_language: &str,
    ) -> Result<PathBuf> {
        match item {
            TimelineItem::Song { song } => self.process_song(index, song, prefetched, job_dir).await,
            TimelineItem::Snippet { snippet } => {
                self.process_snippet(index, snippet, job_dir, default_language)
                    .await
            }
            TimelineItem::Effect { effect } => self.process_effect(index, &effect.id, job_dir),
        }
    }

    /// Normalize a prefetched song download and drop the intermediate
    async fn process_song(
        &self,
        index: usize,
        song: &SongSpec,
        prefetched: Option<&Path>,
        job_dir: &Path,
    ) -> Result<PathBuf> {
        let Some(raw) = prefetched.filter(|p| p.exists()) else {
            bail!("song download failed for {}", song.url);
        };

        let output = job_dir.join(format!("song_{index:03}.mp3"));
        let encoded = self.ffmpeg.reencode_standard(raw, &output).await;
        let _ = std::fs::remove_file(raw);
        encoded?;
        Ok(output)
    }

    async fn process_snippet(
        &self,
        index: usize,
        snippet: &SnippetSpec,
        job_dir: &Path,
        default_language: &str,
    ) -> Result<PathBuf> {
        let output = job_dir.join(format!("snippet_{index:03}.mp3"));

        if snippet.is_upload() {
            let payload = snippet.audio_url.as_deref().unwrap_or_default();
            let audio = decode_upload_payload(payload)?;

            let temp_upload = job_dir.join(format!("snippet_{index:03}_upload"));
            std::fs::write(&temp_upload, &audio)?;
            let encoded = self.ffmpeg.reencode_standard(&temp_upload, &output).await;
            let _ = std::fs::remove_file(&temp_upload);
            encoded?;
            return Ok(output);
        }

        let Some(text) = snippet.text.as_deref() else {
            bail!("snippet has neither text nor upload payload");
        };
        let language = snippet.language.as_deref().unwrap_or(default_language);
        self.synthesizer.synthesize(text, language, &output).await?;
        Ok(output)
    }

    /// Copy a catalog effect into the working area under an index-stamped name
    fn process_effect(&self, index: usize, effect_id: &str, job_dir: &Path) -> Result<PathBuf> {
        let Some(effect) = self.catalog.get(effect_id) else {
            bail!("unknown effect id: {effect_id}");
        };
        let source = self.catalog.file_path(effect);
        if !source.exists() {
            bail!("effect file not found: {}", source.display());
        }

        let output = job_dir.join(format!("effect_{index:03}.mp3"));
        std::fs::copy(&source, &output)
            .with_context(|| format!("copying effect {effect_id}"))?;
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::tools::ToolRunner;
    use std::time::Duration;

    fn processor_with_effects(effects_dir: &Path) -> ItemProcessor {
        let runner = ToolRunner::new(Duration::from_secs(5));
        let ffmpeg = FfmpegClient::new(runner.clone());
        let synthesizer = SpeechSynthesizer::new(runner, ffmpeg.clone());
        ItemProcessor::new(ffmpeg, synthesizer, Arc::new(EffectCatalog::new(effects_dir)))
    }

    #[test]
    fn decodes_raw_base64() {
        let raw = base64::engine::general_purpose::STANDARD.encode(b"mp3-bytes");
        assert_eq!(decode_upload_payload(&raw).unwrap(), b"mp3-bytes");
    }

    #[test]
    fn decodes_data_url_identically_to_raw() {
        let raw = base64::engine::general_purpose::STANDARD.encode(b"mp3-bytes");
        let data_url = format!("data:audio/mpeg;base64,{raw}");
        assert_eq!(
            decode_upload_payload(&data_url).unwrap(),
            decode_upload_payload(&raw).unwrap()
        );
    }

    #[test]
    fn rejects_garbage_payload() {
        assert!(decode_upload_payload("не base64!").is_err());
    }

    #[tokio::test]
    async fn effect_is_copied_under_index_stamped_name() {
        let tmp = tempfile::tempdir().unwrap();
        let effects_dir = tmp.path().join("effects");
        std::fs::create_dir_all(&effects_dir).unwrap();
        std::fs::write(effects_dir.join("fart.mp3"), b"pffft").unwrap();

        let processor = processor_with_effects(&effects_dir);
        let job_dir = tmp.path().join("job");
        std::fs::create_dir_all(&job_dir).unwrap();

        let item = TimelineItem::Effect {
            effect: crate::models::timeline::EffectRef { id: "fart".into() },
        };
        let output = processor.process(7, &item, None, &job_dir, "da").await.unwrap();
        assert_eq!(output, job_dir.join("effect_007.mp3"));
        assert_eq!(std::fs::read(&output).unwrap(), b"pffft");
    }

    #[tokio::test]
    async fn unknown_effect_yields_none() {
        let tmp = tempfile::tempdir().unwrap();
        let processor = processor_with_effects(tmp.path());
        let item = TimelineItem::Effect {
            effect: crate::models::timeline::EffectRef { id: "no-such-effect".into() },
        };
        assert!(processor.process(0, &item, None, tmp.path(), "da").await.is_none());
    }

    #[tokio::test]
    async fn known_effect_with_missing_file_yields_none() {
        let tmp = tempfile::tempdir().unwrap();
        let processor = processor_with_effects(tmp.path());
        let item = TimelineItem::Effect {
            effect: crate::models::timeline::EffectRef { id: "fart".into() },
        };
        assert!(processor.process(0, &item, None, tmp.path(), "da").await.is_none());
    }

    #[tokio::test]
    async fn song_without_prefetched_download_yields_none() {
        let tmp = tempfile::tempdir().unwrap();
        let processor = processor_with_effects(tmp.path());
        let item = TimelineItem::Song {
            song: SongSpec {
                url: "https://youtu.be/dQw4w9WgXcQ".into(),
                title: "Test".into(),
                start: None,
            },
        };
        assert!(processor.process(0, &item, None, tmp.path(), "da").await.is_none());
    }

    #[tokio::test]
    async fn snippet_without_text_or_payload_yields_none() {
        let tmp = tempfile::tempdir().unwrap();
        let processor = processor_with_effects(tmp.path());
        let item = TimelineItem::Snippet {
            snippet: SnippetSpec {
                text: None,
                language: None,
                kind: None,
                audio_url: None,
            },
        };
        assert!(processor.process(0, &item, None, tmp.path(), "da").await.is_none());
    }
}
