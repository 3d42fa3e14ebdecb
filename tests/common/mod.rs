// tests/common/mod.rs

//! Shared test utilities: an in-memory snapshot archive.

#![allow(dead_code)]

use buildinfo_snapshot::snapshot::{BinaryFile, BinaryFiles, BinaryVersion, FileInfo};
use buildinfo_snapshot::{Error, Result, SnapshotApi, Timestamp};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;
use url::Url;

/// A binary published to the fake archive
#[derive(Debug, Clone)]
pub struct Published {
    pub name: String,
    pub version: String,
    /// Architecture as it appears in the index (`all` or a real arch)
    pub architecture: String,
    pub first_seen: Timestamp,
}

/// In-memory stand-in for snapshot.debian.org
///
/// Snapshots are cumulative: the index served for time T lists every
/// published binary first seen at or before T, unless an explicit index was
/// registered for that URL.
#[derive(Default)]
pub struct FakeSnapshotApi {
    histories: HashMap<String, Vec<BinaryVersion>>,
    binfiles: HashMap<(String, String, String, String), BinaryFiles>,
    published: Vec<Published>,
    indexes: HashMap<String, Vec<u8>>,
    pub calls: RefCell<Vec<String>>,
}

impl FakeSnapshotApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `name` `version` built from `source` `source_version`, first
    /// seen at `first_seen` in "debian"
    ///
    /// An `all` package gets a single file. An arch-specific one is built for
    /// a second architecture too, as the archive does, so the lookup has to
    /// pick its file by architecture.
    pub fn publish(
        &mut self,
        name: &str,
        version: &str,
        source: &str,
        source_version: &str,
        architecture: &str,
        first_seen: &str,
    ) -> &mut Self {
        let mut architectures = vec![architecture];
        if architecture != "all" {
            architectures.push(if architecture == "i386" { "amd64" } else { "i386" });
        }
        let hashes: Vec<String> = architectures
            .iter()
            .map(|arch| format!("{name}-{version}-{arch}"))
            .collect();

        self.add_history(name, version, source, source_version);
        self.add_files(
            (source, source_version, name, version),
            architectures
                .iter()
                .zip(&hashes)
                .map(|(arch, hash)| (*arch, hash.as_str()))
                .collect(),
            hashes
                .iter()
                .map(|hash| (hash.as_str(), "debian", first_seen))
                .collect(),
        );
        self.published.push(Published {
            name: name.to_string(),
            version: version.to_string(),
            architecture: architecture.to_string(),
            first_seen: Timestamp::parse(first_seen).unwrap(),
        });
        self
    }

    /// Append one entry to the history of binary `name`
    pub fn add_history(
        &mut self,
        name: &str,
        binary_version: &str,
        source: &str,
        source_version: &str,
    ) -> &mut Self {
        self.histories
            .entry(name.to_string())
            .or_default()
            .push(BinaryVersion {
                binary_version: binary_version.to_string(),
                source: source.to_string(),
                source_version: source_version.to_string(),
                name: Some(name.to_string()),
            });
        self
    }

    /// Register the binfiles response for `(source, source_version, name, version)`
    pub fn add_files(
        &mut self,
        key: (&str, &str, &str, &str),
        files: Vec<(&str, &str)>,
        presence: Vec<(&str, &str, &str)>,
    ) -> &mut Self {
        let mut response = BinaryFiles {
            result: files
                .into_iter()
                .map(|(architecture, hash)| BinaryFile {
                    architecture: architecture.to_string(),
                    hash: hash.to_string(),
                })
                .collect(),
            fileinfo: HashMap::new(),
        };
        for (hash, archive, first_seen) in presence {
            response
                .fileinfo
                .entry(hash.to_string())
                .or_default()
                .push(FileInfo {
                    archive_name: archive.to_string(),
                    first_seen: first_seen.to_string(),
                    name: None,
                    path: None,
                    size: None,
                });
        }
        let (source, source_version, name, version) = key;
        self.binfiles.insert(
            (
                source.to_string(),
                source_version.to_string(),
                name.to_string(),
                version.to_string(),
            ),
            response,
        );
        self
    }

    /// Serve `entries` as the gzipped index at `url`
    pub fn set_index(&mut self, url: &str, entries: &[(&str, &str, &str)]) -> &mut Self {
        let text: String = entries
            .iter()
            .map(|(name, version, arch)| stanza(name, version, arch))
            .collect::<Vec<_>>()
            .join("\n");
        self.indexes.insert(url.to_string(), gzip(text.as_bytes()));
        self
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }

    /// Cumulative index for the timestamp embedded in a snapshot URL
    fn cumulative_index(&self, url: &Url) -> Result<Vec<u8>> {
        let not_found = || Error::HttpStatus {
            url: url.to_string(),
            status: 404,
        };
        let segments: Vec<&str> = url.path_segments().ok_or_else(not_found)?.collect();
        let position = segments
            .iter()
            .position(|s| *s == "archive")
            .ok_or_else(not_found)?;
        let timestamp = segments
            .get(position + 2)
            .and_then(|s| Timestamp::parse(s).ok())
            .ok_or_else(not_found)?;

        let text = self
            .published
            .iter()
            .filter(|p| p.first_seen <= timestamp)
            .map(|p| stanza(&p.name, &p.version, &p.architecture))
            .collect::<Vec<_>>()
            .join("\n");
        Ok(gzip(text.as_bytes()))
    }
}

impl SnapshotApi for FakeSnapshotApi {
    fn binary_history(&self, name: &str) -> Result<Vec<BinaryVersion>> {
        self.record(format!("binary/{name}"));
        self.histories
            .get(name)
            .cloned()
            .ok_or_else(|| Error::HttpStatus {
                url: format!("http://snapshot.test/mr/binary/{name}/"),
                status: 404,
            })
    }

    fn binary_files(
        &self,
        source: &str,
        source_version: &str,
        name: &str,
        version: &str,
    ) -> Result<BinaryFiles> {
        self.record(format!("binfiles/{source}/{source_version}/{name}/{version}"));
        let key = (
            source.to_string(),
            source_version.to_string(),
            name.to_string(),
            version.to_string(),
        );
        self.binfiles.get(&key).cloned().ok_or_else(|| Error::HttpStatus {
            url: format!("http://snapshot.test/mr/package/{source}/{source_version}/binfiles/{name}/{version}"),
            status: 404,
        })
    }

    fn fetch_package_index(&self, url: &Url) -> Result<Vec<u8>> {
        self.record(format!("index {url}"));
        match self.indexes.get(url.as_str()) {
            Some(data) => Ok(data.clone()),
            None => self.cumulative_index(url),
        }
    }
}

/// One `Packages` stanza with a multi-line description
pub fn stanza(name: &str, version: &str, arch: &str) -> String {
    format!(
        "Package: {name}\nVersion: {version}\nArchitecture: {arch}\nDescription: test package {name}\n long description\n .\n second paragraph\n"
    )
}

pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Write a `.buildinfo` file into a fresh temp dir.
///
/// Returns (TempDir, path) - keep the TempDir alive to prevent cleanup.
pub fn write_buildinfo(arch: &str, environment: &str) -> (TempDir, PathBuf) {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("test_1.0_amd64.buildinfo");
    let content = format!(
        "Format: 1.0\nSource: test\nBinary: test\nArchitecture: {arch}\nVersion: 1.0\nBuild-Architecture: {arch}\nBuild-Environment:\n {}\n",
        environment.replace(", ", ",\n ")
    );
    std::fs::write(&path, content).unwrap();
    (temp_dir, path)
}
