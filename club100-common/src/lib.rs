//! # club100 Common Library
//!
//! Shared code for the club100 mixtape services:
//! - Common error type
//! - Root folder and worker configuration resolution
//! - SQLite initialization and schema

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
