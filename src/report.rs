// src/report.rs

//! Result of a successful reconciliation

use crate::snapshot::Timestamp;
use std::fmt;
use url::Url;

/// The snapshot that reproduces a build environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub architecture: String,
    pub timestamp: Timestamp,
    /// Mirror root for `timestamp`, usable as an apt source base
    pub mirror: Url,
}

/// Renders the two output lines:
///
/// ```text
/// architecture = amd64
/// mirror = http://snapshot.debian.org/archive/debian/20200101T000000Z/
/// ```
impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "architecture = {}", self.architecture)?;
        write!(f, "mirror = {}", self.mirror)
    }
}
