// src/snapshot/config.rs

//! Snapshot service configuration
//!
//! Defaults target the Debian snapshot service, sid/main. Values can be
//! loaded from a TOML file and overridden from the command line:
//!
//! ```toml
//! api_url = "http://snapshot.debian.org/mr/"
//! mirror_url = "http://snapshot.debian.org/"
//! archive = "debian-ports"
//! suite = "unstable"
//! area = "main"
//! timeout_secs = 60
//! ```

use crate::error::{Error, Result};
use crate::snapshot::Timestamp;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_API_URL: &str = "http://snapshot.debian.org/mr/";
pub const DEFAULT_MIRROR_URL: &str = "http://snapshot.debian.org/";
pub const DEFAULT_ARCHIVE: &str = "debian";
pub const DEFAULT_SUITE: &str = "sid";
pub const DEFAULT_AREA: &str = "main";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Archives published by snapshot.debian.org
pub const KNOWN_ARCHIVES: [&str; 6] = [
    "debian",
    "debian-archive",
    "debian-backports",
    "debian-ports",
    "debian-security",
    "debian-volatile",
];

/// Where to look up package history and which archive area to pin
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SnapshotConfig {
    /// Base of the machine-readable API (`/mr/`)
    pub api_url: String,
    /// Base under which `archive/<name>/<timestamp>/` trees live
    pub mirror_url: String,
    /// Archive name as recorded in file info (`archive_name`)
    pub archive: String,
    pub suite: String,
    pub area: String,
    /// Per-request timeout; 0 waits indefinitely
    pub timeout_secs: u64,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            mirror_url: DEFAULT_MIRROR_URL.to_string(),
            archive: DEFAULT_ARCHIVE.to_string(),
            suite: DEFAULT_SUITE.to_string(),
            area: DEFAULT_AREA.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl SnapshotConfig {
    /// Load a configuration file; absent keys keep their defaults
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading configuration from {}", path.display());
        let content = fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Check that every value can be used to build URLs
    pub fn validate(&self) -> Result<()> {
        base_url(&self.api_url)?;
        base_url(&self.mirror_url)?;

        for (key, value) in [
            ("archive", &self.archive),
            ("suite", &self.suite),
            ("area", &self.area),
        ] {
            if value.trim().is_empty() || value.contains('/') {
                return Err(Error::Config(format!("invalid {key} '{value}'")));
            }
        }

        if !KNOWN_ARCHIVES.contains(&self.archive.as_str()) {
            warn!(
                "Archive '{}' is not one of the known snapshot archives ({})",
                self.archive,
                KNOWN_ARCHIVES.join(", ")
            );
        }
        Ok(())
    }

    /// Request timeout, `None` when disabled
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    /// Parsed API base, always ending in `/`
    pub fn api_base(&self) -> Result<Url> {
        base_url(&self.api_url)
    }

    /// Mirror root for one snapshot: `{mirror}archive/{archive}/{timestamp}/`
    pub fn snapshot_url(&self, timestamp: Timestamp) -> Result<Url> {
        let mut url = base_url(&self.mirror_url)?;
        let ts = timestamp.to_string();
        push_segments(&mut url, &["archive", &self.archive, &ts, ""])?;
        Ok(url)
    }

    /// Location of the compressed `Packages` index inside a snapshot
    pub fn index_url(&self, timestamp: Timestamp, architecture: &str) -> Result<Url> {
        let mut url = self.snapshot_url(timestamp)?;
        let binary_dir = format!("binary-{architecture}");
        push_segments(
            &mut url,
            &["dists", &self.suite, &self.area, &binary_dir, "Packages.gz"],
        )?;
        Ok(url)
    }
}

/// Parse a URL usable as a base, normalizing the trailing slash
fn base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw).map_err(|e| Error::Config(format!("invalid URL '{raw}': {e}")))?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(Error::Config(format!("'{raw}' is not an http(s) base URL")));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Append percent-encoded path segments after the base's trailing slash
pub(crate) fn push_segments(url: &mut Url, segments: &[&str]) -> Result<()> {
    let display = url.to_string();
    url.path_segments_mut()
        .map_err(|_| Error::Config(format!("'{display}' cannot be a base URL")))?
        .pop_if_empty()
        .extend(segments);
    Ok(())
}
