//! Data models: pipeline configuration and the extraction result record.

pub mod config;
pub mod document;
