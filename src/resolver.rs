// src/resolver.rs

//! Snapshot resolution
//!
//! Maps each pinned package to the time its exact binary was first recorded
//! in the target archive, then picks the snapshot where all of them
//! coexist.
//!
//! Snapshots are cumulative: a file first seen at time T is present in every
//! snapshot taken at or after T. The earliest snapshot holding all required
//! packages is therefore the latest of their first-seen times.

use crate::control::ARCH_ALL;
use crate::error::{Error, Result};
use crate::package::RequiredPackage;
use crate::snapshot::{BinaryFile, BinaryFiles, BinaryVersion, SnapshotApi, Timestamp};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Required packages grouped by first-seen timestamp
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimestampIndex {
    entries: BTreeMap<Timestamp, Vec<RequiredPackage>>,
}

impl TimestampIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `package` as first seen at `timestamp`
    pub fn insert(&mut self, timestamp: Timestamp, package: RequiredPackage) {
        self.entries.entry(timestamp).or_default().push(package);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct timestamps
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Packages first seen at `timestamp`, in insertion order
    pub fn packages_at(&self, timestamp: &Timestamp) -> &[RequiredPackage] {
        self.entries
            .get(timestamp)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The newest first-seen timestamp
    ///
    /// This is the consensus snapshot. Fails with
    /// [`Error::NoRequiredPackages`] when nothing was recorded.
    pub fn newest(&self) -> Result<Timestamp> {
        self.entries
            .keys()
            .next_back()
            .copied()
            .ok_or(Error::NoRequiredPackages)
    }
}

/// Pick the history entry for `version`
///
/// The first entry whose `binary_version` matches wins; entries are taken in
/// the order the service returned them and no further tie-break applies.
pub fn select_source<'h>(history: &'h [BinaryVersion], version: &str) -> Option<&'h BinaryVersion> {
    history.iter().find(|entry| entry.binary_version == version)
}

/// Pick the file hash that applies to `package`
///
/// A lone file must be an `all` package. With several files the one built
/// for the required architecture is used.
pub fn select_hash<'f>(files: &'f [BinaryFile], package: &RequiredPackage) -> Result<&'f str> {
    match files {
        [only] if only.architecture == ARCH_ALL => Ok(only.hash.as_str()),
        [only] => Err(Error::UnexpectedArchitecture {
            package: package.name.clone(),
            version: package.version.clone(),
            architecture: only.architecture.clone(),
        }),
        _ => files
            .iter()
            .find(|f| f.architecture == package.architecture)
            .map(|f| f.hash.as_str())
            .ok_or_else(|| Error::NoMatchingArchitecture {
                package: package.name.clone(),
                version: package.version.clone(),
                architecture: package.architecture.clone(),
            }),
    }
}

/// First-seen time of `hash` within `archive`
///
/// Exactly one presence record must name the archive.
pub fn first_seen_in_archive(
    files: &BinaryFiles,
    hash: &str,
    archive: &str,
    package: &RequiredPackage,
) -> Result<Timestamp> {
    let matches: Vec<_> = files
        .presence(hash)
        .iter()
        .filter(|info| info.archive_name == archive)
        .collect();

    match matches.as_slice() {
        [info] => Timestamp::parse(&info.first_seen),
        _ => Err(Error::AmbiguousArchivePresence {
            package: package.name.clone(),
            hash: hash.to_string(),
            archive: archive.to_string(),
            count: matches.len(),
        }),
    }
}

/// Looks up first-seen timestamps through a [`SnapshotApi`]
pub struct SnapshotResolver<'a, A: SnapshotApi + ?Sized> {
    api: &'a A,
    archive: &'a str,
}

impl<'a, A: SnapshotApi + ?Sized> SnapshotResolver<'a, A> {
    pub fn new(api: &'a A, archive: &'a str) -> Self {
        Self { api, archive }
    }

    /// When the exact binary of `package` first appeared in the archive
    pub fn first_seen(&self, package: &RequiredPackage) -> Result<Timestamp> {
        let history = self.api.binary_history(&package.name)?;
        let source = select_source(&history, &package.version).ok_or_else(|| {
            Error::NoSourceVersion {
                package: package.name.clone(),
                version: package.version.clone(),
            }
        })?;
        debug!(
            "{} {} built from {} {}",
            package.name, package.version, source.source, source.source_version
        );

        let files = self.api.binary_files(
            &source.source,
            &source.source_version,
            &package.name,
            &package.version,
        )?;
        let hash = select_hash(&files.result, package)?;
        let first_seen = first_seen_in_archive(&files, hash, self.archive, package)?;
        debug!("{} file {} first seen {}", package.name, hash, first_seen);

        Ok(first_seen)
    }

    /// Resolve every package, stopping at the first failure
    pub fn resolve(&self, packages: &[RequiredPackage]) -> Result<TimestampIndex> {
        let mut index = TimestampIndex::new();
        for package in packages {
            info!("{}", package);
            let first_seen = self.first_seen(package)?;
            index.insert(first_seen, package.clone());
        }
        Ok(index)
    }
}
