// src/lib.rs

//! Build environment snapshot resolution
//!
//! Given a `.buildinfo` record pinning every package of a build
//! environment, find the earliest snapshot.debian.org timestamp at which
//! all of those exact binaries were available together.
//!
//! # Pipeline
//!
//! - Parse: read `Build-Architecture` and the `Build-Environment` pins
//! - Resolve: look up when each pinned binary was first seen in the archive
//! - Select: take the newest of those first-seen times
//! - Verify: fetch that snapshot's `Packages` index and check every pin
//! - Report: print the architecture and the snapshot mirror URL
//!
//! Every step is fatal on failure; nothing is retried.

pub mod compression;
pub mod control;
mod error;
pub mod package;
pub mod relation;
pub mod report;
pub mod resolver;
pub mod snapshot;
pub mod verify;

pub use control::{BuildInfo, PackageIndexEntry};
pub use error::{Error, ErrorKind, Result};
pub use package::RequiredPackage;
pub use report::Resolution;
pub use resolver::{SnapshotResolver, TimestampIndex};
pub use snapshot::{HttpSnapshotClient, SnapshotApi, SnapshotConfig, Timestamp};
pub use verify::verify_snapshot;

use tracing::info;

/// Run resolution, selection and verification for `build_info`
pub fn reconcile<A: SnapshotApi + ?Sized>(
    api: &A,
    config: &SnapshotConfig,
    build_info: &BuildInfo,
) -> Result<Resolution> {
    let resolver = SnapshotResolver::new(api, &config.archive);
    let index = resolver.resolve(&build_info.packages)?;

    let timestamp = index.newest()?;
    info!(
        "Selected snapshot {} ({} packages first seen then)",
        timestamp,
        index.packages_at(&timestamp).len()
    );

    verify_snapshot(
        api,
        config,
        timestamp,
        &build_info.architecture,
        &build_info.packages,
    )?;

    Ok(Resolution {
        architecture: build_info.architecture.clone(),
        timestamp,
        mirror: config.snapshot_url(timestamp)?,
    })
}
