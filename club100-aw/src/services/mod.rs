//! Audio worker services

pub mod cache;
pub mod fanout;
pub mod fetcher;
pub mod ffmpeg;
pub mod pipeline;
pub mod processor;
pub mod tools;
pub mod tts;
pub mod youtube;

pub use cache::MediaCache;
pub use fetcher::SongFetcher;
pub use ffmpeg::FfmpegClient;
pub use pipeline::MixtapePipeline;
pub use processor::ItemProcessor;
pub use tools::{ToolError, ToolRunner};
pub use tts::SpeechSynthesizer;
pub use youtube::YoutubeClient;
