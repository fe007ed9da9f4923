//! Request and record types for the audio worker

pub mod job;
pub mod timeline;

pub use job::{Job, JobStatus};
pub use timeline::{GenerateRequest, SnippetSpec, SongSpec, TimelineItem};
