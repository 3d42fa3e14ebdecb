// src/error.rs

//! Error types for snapshot reconciliation
//!
//! Every failure is fatal: the pipeline never retries and never keeps
//! partial results. Variants fall into the categories reported by
//! [`Error::kind`].

use crate::compression::CompressionError;
use crate::package::RequiredPackage;
use std::fmt;
use thiserror::Error;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Broad category of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or unsupported input record
    Format,
    /// Transport failure, non-success status, or undecodable payload
    Network,
    /// Expected data absent from a well-formed service response
    Lookup,
    /// Chosen snapshot does not hold every required package
    Validation,
    /// Invalid configuration
    Config,
    /// Local I/O failure
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Format => "format",
            Self::Network => "network",
            Self::Lookup => "lookup",
            Self::Validation => "validation",
            Self::Config => "config",
            Self::Io => "io",
        };
        write!(f, "{name}")
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("expected exactly one paragraph, found {found}")]
    ParagraphCount { found: usize },

    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("failed to parse control data: {0}")]
    ControlParse(String),

    #[error("Build-Environment entry '{0}' must not have alternatives")]
    Disjunction(String),

    #[error("malformed relation '{0}'")]
    MalformedRelation(String),

    #[error("{0} has no version constraint; expected '(= version)'")]
    MissingVersion(String),

    #[error("unsupported relation '{operator}' for {package}; only '=' is allowed")]
    UnsupportedRelation { package: String, operator: String },

    #[error("unsupported architecture qualifier for {package}: {qualifier}")]
    UnsupportedArchQualifier { package: String, qualifier: String },

    #[error("request to {url} failed: {message}")]
    Network { url: String, message: String },

    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("invalid response from {url}: {message}")]
    InvalidResponse { url: String, message: String },

    #[error("failed to decompress package index: {0}")]
    Decompression(#[from] CompressionError),

    #[error("cannot find source version for {package} binary version {version}")]
    NoSourceVersion { package: String, version: String },

    #[error("{package} {version} has a single file for architecture '{architecture}', expected 'all'")]
    UnexpectedArchitecture {
        package: String,
        version: String,
        architecture: String,
    },

    #[error("cannot find architecture {architecture} for {package} {version}")]
    NoMatchingArchitecture {
        package: String,
        version: String,
        architecture: String,
    },

    #[error("expected one '{archive}' entry for {package} file {hash}, found {count}")]
    AmbiguousArchivePresence {
        package: String,
        hash: String,
        archive: String,
        count: usize,
    },

    #[error("invalid snapshot timestamp '{0}'")]
    InvalidTimestamp(String),

    #[error("no required packages; cannot choose a snapshot")]
    NoRequiredPackages,

    #[error("cannot find all package versions in snapshot {timestamp}: {}", format_packages(.missing))]
    MissingPackages {
        timestamp: String,
        missing: Vec<RequiredPackage>,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ParagraphCount { .. }
            | Self::MissingField(_)
            | Self::ControlParse(_)
            | Self::Disjunction(_)
            | Self::MalformedRelation(_)
            | Self::MissingVersion(_)
            | Self::UnsupportedRelation { .. }
            | Self::UnsupportedArchQualifier { .. } => ErrorKind::Format,
            Self::Network { .. }
            | Self::HttpStatus { .. }
            | Self::InvalidResponse { .. }
            | Self::Decompression(_) => ErrorKind::Network,
            Self::NoSourceVersion { .. }
            | Self::UnexpectedArchitecture { .. }
            | Self::NoMatchingArchitecture { .. }
            | Self::AmbiguousArchivePresence { .. }
            | Self::InvalidTimestamp(_) => ErrorKind::Lookup,
            Self::NoRequiredPackages | Self::MissingPackages { .. } => ErrorKind::Validation,
            Self::Config(_) => ErrorKind::Config,
            Self::Io(_) => ErrorKind::Io,
        }
    }
}

fn format_packages(packages: &[RequiredPackage]) -> String {
    packages
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(Error::Disjunction("a | b".into()).kind(), ErrorKind::Format);
        assert_eq!(
            Error::HttpStatus {
                url: "http://x/".into(),
                status: 404
            }
            .kind(),
            ErrorKind::Network
        );
        assert_eq!(Error::NoRequiredPackages.kind(), ErrorKind::Validation);
        assert_eq!(Error::InvalidTimestamp("x".into()).kind(), ErrorKind::Lookup);
    }

    #[test]
    fn test_missing_packages_message_lists_tuples() {
        let err = Error::MissingPackages {
            timestamp: "20200101T000000Z".into(),
            missing: vec![
                RequiredPackage::new("foo", "1.0", "amd64"),
                RequiredPackage::new("bar", "2.0", "all"),
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("20200101T000000Z"));
        assert!(msg.contains("foo 1.0 amd64"));
        assert!(msg.contains("bar 2.0 all"));
    }
}
