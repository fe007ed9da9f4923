//! Timeline document model
//!
//! A timeline is an ordered list of items; the order defines the final audio
//! sequence and must survive out-of-order concurrent processing. Items are an
//! explicit tagged union: the `type` field selects the variant and the
//! matching payload field must be present, otherwise the item fails to parse
//! and is treated as unprocessable (it keeps its index but produces no
//! segment).

use serde::{Deserialize, Serialize};
use tracing::warn;

/// One entry in a timeline document
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TimelineItem {
    /// A 60-second window out of a remote song
    Song { song: SongSpec },
    /// A spoken (TTS) or uploaded audio insert
    Snippet { snippet: SnippetSpec },
    /// A catalog sound effect
    Effect { effect: EffectRef },
}

/// Song payload
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SongSpec {
    pub url: String,
    #[serde(default)]
    pub title: String,
    /// Optional window start override in seconds; clamped to the valid range
    #[serde(default)]
    pub start: Option<i64>,
}

/// Snippet payload
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SnippetSpec {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    /// `"tts"` (default) or `"upload"`
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// Base64 payload for uploads, raw or as a `data:audio/*;base64,` URL
    #[serde(rename = "audioUrl", default)]
    pub audio_url: Option<String>,
}

impl SnippetSpec {
    pub fn is_upload(&self) -> bool {
        self.kind.as_deref() == Some("upload") && self.audio_url.is_some()
    }
}

/// Effect payload
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EffectRef {
    pub id: String,
}

/// Input document for one generation job
///
/// Either a `timeline` or the legacy `youtubeUrls`/`snippets` pair.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub timeline: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(rename = "youtubeUrls", default)]
    pub youtube_urls: Vec<String>,
    #[serde(default)]
    pub snippets: Vec<serde_json::Value>,
}

impl GenerateRequest {
    /// Raw timeline values, converting the legacy format only when the
    /// `timeline` field is absent: songs and snippets interleaved song-first.
    /// An explicitly empty timeline stays empty.
    pub fn resolve_timeline(&self) -> Vec<serde_json::Value> {
        if let Some(timeline) = &self.timeline {
            return timeline.clone();
        }

        let mut timeline = Vec::new();
        let len = self.youtube_urls.len().max(self.snippets.len());
        for i in 0..len {
            if let Some(url) = self.youtube_urls.get(i) {
                timeline.push(serde_json::json!({
                    "type": "song",
                    "song": { "url": url, "title": format!("Song {}", i + 1) },
                }));
            }
            if let Some(snippet) = self.snippets.get(i) {
                timeline.push(serde_json::json!({
                    "type": "snippet",
                    "snippet": snippet,
                }));
            }
        }
        timeline
    }
}

/// Parse each timeline value individually, preserving indices.
///
/// A malformed item becomes `None` at its index rather than failing the whole
/// request; it is logged here and dropped from the output later.
pub fn parse_items(values: &[serde_json::Value]) -> Vec<Option<TimelineItem>> {
    values
        .iter()
        .enumerate()
        .map(|(index, value)| match serde_json::from_value(value.clone()) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!(item_index = index, error = %e, "Unprocessable timeline item");
                None
            }
        })
        .collect()
}
