// src/control.rs

//! Control-style (deb822) records
//!
//! Two kinds of input share this format: the `.buildinfo` record naming the
//! build environment, and the `Packages` index of a snapshot. Both are
//! deserialized with `rfc822-like` after a light normalization pass.
//!
//! Field names are case-insensitive. The fields read here are rewritten to
//! their canonical spelling before deserialization.

use crate::error::{Error, Result};
use crate::package::RequiredPackage;
use crate::relation::parse_build_environment;
use serde::Deserialize;
use std::fs;
use std::io::BufRead;
use std::path::Path;
use tracing::{debug, info};

const PGP_MESSAGE_HEADER: &str = "-----BEGIN PGP SIGNED MESSAGE-----";
const PGP_SIGNATURE_HEADER: &str = "-----BEGIN PGP SIGNATURE-----";

/// Architecture value meaning "installable on every architecture"
pub const ARCH_ALL: &str = "all";

const BUILDINFO_FIELDS: &[&str] = &["Build-Architecture", "Build-Environment"];
const INDEX_FIELDS: &[&str] = &["Package", "Version", "Architecture"];

#[derive(Debug, Deserialize)]
struct BuildInfoRecord {
    #[serde(rename = "Build-Architecture", default)]
    build_architecture: String,
    #[serde(rename = "Build-Environment", default)]
    build_environment: String,
}

/// The build environment described by a `.buildinfo` record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfo {
    /// Value of `Build-Architecture`
    pub architecture: String,
    /// Pinned packages, deduplicated, in input order
    pub packages: Vec<RequiredPackage>,
}

impl BuildInfo {
    /// Read and parse a `.buildinfo` file
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Reading build record from {}", path.display());
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse a single build record
    ///
    /// Clearsigned input is unwrapped first; the signature itself is not
    /// checked.
    pub fn parse(content: &str) -> Result<Self> {
        let text = normalize(&strip_clearsign(content), BUILDINFO_FIELDS);
        if text.is_empty() {
            return Err(Error::ParagraphCount { found: 0 });
        }
        let mut records: Vec<BuildInfoRecord> =
            rfc822_like::from_str(&text).map_err(|e| Error::ControlParse(e.to_string()))?;

        if records.len() != 1 {
            return Err(Error::ParagraphCount {
                found: records.len(),
            });
        }
        let record = records.remove(0);

        let architecture = record.build_architecture.trim().to_string();
        if architecture.is_empty() {
            return Err(Error::MissingField("Build-Architecture"));
        }
        if record.build_environment.trim().is_empty() {
            return Err(Error::MissingField("Build-Environment"));
        }

        let packages = parse_build_environment(&record.build_environment, &architecture)?;
        info!(
            "Build environment for {} lists {} packages",
            architecture,
            packages.len()
        );

        Ok(Self {
            architecture,
            packages,
        })
    }
}

#[derive(Debug, Deserialize)]
struct IndexRecord {
    #[serde(rename = "Package")]
    package: String,
    #[serde(rename = "Version")]
    version: String,
    #[serde(rename = "Architecture")]
    architecture: String,
}

/// One stanza of a `Packages` index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageIndexEntry {
    pub name: String,
    pub version: String,
    pub architecture: String,
}

impl PackageIndexEntry {
    /// The tuple this entry satisfies when building for `build_arch`
    ///
    /// `Architecture: all` packages are installable on the build
    /// architecture, so they compare as that architecture.
    pub fn as_required(&self, build_arch: &str) -> RequiredPackage {
        let architecture = if self.architecture == ARCH_ALL {
            build_arch
        } else {
            &self.architecture
        };
        RequiredPackage::new(&self.name, &self.version, architecture)
    }
}

/// Streaming reader over the stanzas of an uncompressed `Packages` index
///
/// Only the current stanza is held in memory, so a full suite index can be
/// checked straight out of the decoder. Invalid UTF-8 is replaced lossily.
/// Iteration stops after the first error.
pub struct PackageIndexReader<R> {
    reader: R,
    line: Vec<u8>,
    paragraph: String,
    done: bool,
}

impl<R: BufRead> PackageIndexReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: Vec::new(),
            paragraph: String::new(),
            done: false,
        }
    }

    /// Load the next stanza into `self.paragraph`; false at end of input
    fn read_paragraph(&mut self) -> Result<bool> {
        self.paragraph.clear();
        loop {
            self.line.clear();
            if self.reader.read_until(b'\n', &mut self.line)? == 0 {
                return Ok(!self.paragraph.is_empty());
            }
            let line = String::from_utf8_lossy(&self.line);
            if line.trim().is_empty() {
                if !self.paragraph.is_empty() {
                    return Ok(true);
                }
                continue;
            }
            self.paragraph.push_str(&line);
            if !line.ends_with('\n') {
                self.paragraph.push('\n');
            }
        }
    }
}

impl<R: BufRead> Iterator for PackageIndexReader<R> {
    type Item = Result<PackageIndexEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let entry = match self.read_paragraph() {
            Ok(true) => parse_index_stanza(&self.paragraph),
            Ok(false) => {
                self.done = true;
                return None;
            }
            Err(e) => Err(e),
        };
        if entry.is_err() {
            self.done = true;
        }
        Some(entry)
    }
}

fn parse_index_stanza(text: &str) -> Result<PackageIndexEntry> {
    let mut records: Vec<IndexRecord> = rfc822_like::from_str(&normalize(text, INDEX_FIELDS))
        .map_err(|e| Error::ControlParse(e.to_string()))?;
    if records.len() != 1 {
        return Err(Error::ControlParse(format!(
            "expected one index stanza, found {}",
            records.len()
        )));
    }
    let record = records.remove(0);

    Ok(PackageIndexEntry {
        name: record.package,
        version: record.version,
        architecture: record.architecture,
    })
}

/// Remove an OpenPGP cleartext signature envelope, if present
fn strip_clearsign(content: &str) -> String {
    if content.trim_start().starts_with(PGP_MESSAGE_HEADER) {
        let mut lines = content.lines().skip_while(|l| l.trim() != PGP_MESSAGE_HEADER).skip(1);
        // Armor headers ("Hash: SHA512") run up to the first blank line
        for line in lines.by_ref() {
            if line.trim().is_empty() {
                break;
            }
        }
        let mut body = String::new();
        for line in lines {
            if line.trim_end() == PGP_SIGNATURE_HEADER {
                break;
            }
            body.push_str(line.strip_prefix("- ").unwrap_or(line));
            body.push('\n');
        }
        body
    } else {
        content.to_string()
    }
}

/// Fold continuation lines, collapse blank-line runs and canonicalize the
/// names of `fields`
///
/// Whitespace-only lines separate paragraphs just like empty ones. A line
/// starting with whitespace continues the previous field and is joined to
/// it with a single space, so every field reaches the deserializer on one
/// line.
fn normalize(content: &str, fields: &[&str]) -> String {
    let mut out = String::with_capacity(content.len());
    let mut pending_separator = false;

    for line in content.lines() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            pending_separator = !out.is_empty();
            continue;
        }
        if pending_separator {
            out.push('\n');
            pending_separator = false;
        } else if line.starts_with([' ', '\t']) && out.ends_with('\n') {
            out.pop();
            out.push(' ');
            out.push_str(line.trim());
            out.push('\n');
            continue;
        }
        push_field_line(&mut out, line, fields);
        out.push('\n');
    }

    out
}

/// Append `line`, replacing its field name with the matching entry of
/// `fields` when they differ only in case
fn push_field_line(out: &mut String, line: &str, fields: &[&str]) {
    if let Some((name, value)) = line.split_once(':') {
        if let Some(canonical) = fields.iter().find(|f| f.eq_ignore_ascii_case(name.trim_end())) {
            out.push_str(canonical);
            out.push(':');
            out.push_str(value);
            return;
        }
    }
    out.push_str(line);
}
