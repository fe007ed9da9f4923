//! Database operations for the audio worker

pub mod jobs;
