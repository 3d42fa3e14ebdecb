// src/snapshot/mod.rs

//! snapshot.debian.org access
//!
//! This module provides:
//! - Configuration of the service endpoint, mirror and archive location
//! - The archive timestamp type (`YYYYMMDDTHHMMSSZ`)
//! - Response models and the [`SnapshotApi`] seam
//! - A blocking HTTP implementation of that seam

mod api;
mod client;
pub mod config;
mod timestamp;

pub use api::{BinaryFile, BinaryFiles, BinaryVersion, FileInfo, SnapshotApi};
pub use client::HttpSnapshotClient;
pub use config::SnapshotConfig;
pub use timestamp::{Timestamp, TIMESTAMP_FORMAT};
