// src/snapshot/timestamp.rs

//! Archive timestamps as used by snapshot.debian.org

use crate::error::{Error, Result};
use chrono::NaiveDateTime;
use std::fmt;
use std::str::FromStr;

/// Format of `first_seen` values and of timestamps in archive URLs
pub const TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// A point in time on the snapshot archive, always UTC
///
/// Ordering is chronological, so the newest of a set is its maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    /// Parse a `YYYYMMDDTHHMMSSZ` string
    pub fn parse(s: &str) -> Result<Self> {
        NaiveDateTime::parse_from_str(s.trim(), TIMESTAMP_FORMAT)
            .map(Self)
            .map_err(|_| Error::InvalidTimestamp(s.to_string()))
    }
}

impl FromStr for Timestamp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(TIMESTAMP_FORMAT))
    }
}
