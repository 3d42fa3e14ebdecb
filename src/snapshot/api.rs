// src/snapshot/api.rs

//! Snapshot service models and the service seam

use crate::error::Result;
use serde::Deserialize;
use std::collections::HashMap;
use url::Url;

/// One entry of `/mr/binary/<name>/`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BinaryVersion {
    pub binary_version: String,
    /// Source package the binary was built from
    pub source: String,
    /// Version of that source package
    #[serde(rename = "version")]
    pub source_version: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// One file of `/mr/package/<src>/<ver>/binfiles/<name>/<ver>`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BinaryFile {
    pub architecture: String,
    pub hash: String,
}

/// Where and when a file hash was recorded
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileInfo {
    pub archive_name: String,
    pub first_seen: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

/// Binary files of one package version, with `fileinfo=1` details
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BinaryFiles {
    pub result: Vec<BinaryFile>,
    #[serde(default)]
    pub fileinfo: HashMap<String, Vec<FileInfo>>,
}

impl BinaryFiles {
    /// Presence records for `hash`; empty when the service sent none
    pub fn presence(&self, hash: &str) -> &[FileInfo] {
        self.fileinfo.get(hash).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// `{"result": [...]}` envelope used by list endpoints
#[derive(Debug, Deserialize)]
pub(crate) struct ResultList<T> {
    pub result: Vec<T>,
}

/// Queries against a snapshot archive
///
/// Resolution and verification only talk to the archive through this
/// trait, so they can run against an in-memory archive.
pub trait SnapshotApi {
    /// Every recorded version of binary package `name`, in service order
    fn binary_history(&self, name: &str) -> Result<Vec<BinaryVersion>>;

    /// Files of binary `name` `version` built from `source` `source_version`
    fn binary_files(
        &self,
        source: &str,
        source_version: &str,
        name: &str,
        version: &str,
    ) -> Result<BinaryFiles>;

    /// Raw bytes of a package index, possibly compressed
    fn fetch_package_index(&self, url: &Url) -> Result<Vec<u8>>;
}
