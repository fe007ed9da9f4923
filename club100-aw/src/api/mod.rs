//! HTTP API for the audio worker
//!
//! Thin glue over the pipeline and catalog; all real work happens in
//! `services`.

pub mod cache;
pub mod download;
pub mod effects;
pub mod generate;
pub mod health;
pub mod jobs;
pub mod search;
