// src/relation.rs

//! Parsing of `Build-Environment` relation lists
//!
//! Entries use the usual Debian relation syntax:
//!
//! ```text
//! name[:archqual] (op version) [arch-restriction] <build-profile>
//! ```
//!
//! A build environment pins every package exactly, so only single
//! alternatives with an `=` constraint are accepted.

use crate::error::{Error, Result};
use crate::package::RequiredPackage;
use std::collections::HashSet;
use tracing::debug;

/// Operators Debian allows inside a version constraint
const OPERATORS: [&str; 7] = ["<<", "<=", ">=", ">>", "=", "<", ">"];

/// Architecture qualifiers that do not name a concrete architecture
const WILDCARD_QUALIFIERS: [&str; 2] = ["any", "native"];

/// One relation entry, before the exact-version policy is applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub name: String,
    /// `(operator, version)` when the entry carries a constraint
    pub version: Option<(String, String)>,
    /// Qualifier written as `name:arch`
    pub arch_qualifier: Option<String>,
    /// Tokens of a `[...]` restriction list, negations included
    pub arch_restrictions: Vec<String>,
}

impl Relation {
    /// Parse a single entry such as `libc6:amd64 (= 2.36-9)`
    pub fn parse(entry: &str) -> Result<Self> {
        let entry = entry.trim();
        if entry.contains('|') {
            return Err(Error::Disjunction(entry.to_string()));
        }

        let name_end = entry
            .find(|c: char| c.is_whitespace() || matches!(c, '(' | '[' | '<'))
            .unwrap_or(entry.len());
        let (full_name, mut rest) = entry.split_at(name_end);
        if full_name.is_empty() {
            return Err(Error::MalformedRelation(entry.to_string()));
        }

        let (name, arch_qualifier) = match full_name.split_once(':') {
            Some((n, q)) if !n.is_empty() && !q.is_empty() => (n, Some(q.to_string())),
            Some(_) => return Err(Error::MalformedRelation(entry.to_string())),
            None => (full_name, None),
        };

        let mut version = None;
        let mut arch_restrictions = Vec::new();

        loop {
            rest = rest.trim_start();
            let Some(open) = rest.chars().next() else {
                break;
            };
            let close = match open {
                '(' => ')',
                '[' => ']',
                '<' => '>',
                _ => return Err(Error::MalformedRelation(entry.to_string())),
            };
            let end = rest
                .find(close)
                .ok_or_else(|| Error::MalformedRelation(entry.to_string()))?;
            let inner = rest[1..end].trim();
            rest = &rest[end + 1..];

            match open {
                '(' if version.is_none() => version = Some(parse_constraint(inner, entry)?),
                '[' if arch_restrictions.is_empty() => {
                    arch_restrictions = inner.split_whitespace().map(str::to_string).collect();
                    if arch_restrictions.is_empty() {
                        return Err(Error::MalformedRelation(entry.to_string()));
                    }
                }
                // Build profiles do not affect which binary was installed
                '<' => {}
                _ => return Err(Error::MalformedRelation(entry.to_string())),
            }
        }

        Ok(Self {
            name: name.to_string(),
            version,
            arch_qualifier,
            arch_restrictions,
        })
    }

    /// Convert into a pinned package, defaulting the architecture
    pub fn into_required(self, default_arch: &str) -> Result<RequiredPackage> {
        let (operator, version) = self
            .version
            .clone()
            .ok_or_else(|| Error::MissingVersion(self.name.clone()))?;
        if operator != "=" {
            return Err(Error::UnsupportedRelation {
                package: self.name,
                operator,
            });
        }

        let architecture = self.architecture()?.unwrap_or(default_arch).to_string();
        Ok(RequiredPackage::new(self.name, version, architecture))
    }

    /// Architecture named by the qualifier or restriction list, if any
    fn architecture(&self) -> Result<Option<&str>> {
        let qualifier = self
            .arch_qualifier
            .as_deref()
            .filter(|q| !WILDCARD_QUALIFIERS.contains(q));

        let restriction = match self.arch_restrictions.as_slice() {
            [] => None,
            [arch] if !arch.starts_with('!') => Some(arch.as_str()),
            list => {
                return Err(Error::UnsupportedArchQualifier {
                    package: self.name.clone(),
                    qualifier: format!("[{}]", list.join(" ")),
                });
            }
        };

        match (qualifier, restriction) {
            (Some(q), Some(r)) if q != r => Err(Error::UnsupportedArchQualifier {
                package: self.name.clone(),
                qualifier: format!("{q} [{r}]"),
            }),
            (Some(q), _) => Ok(Some(q)),
            (None, r) => Ok(r),
        }
    }
}

fn parse_constraint(inner: &str, entry: &str) -> Result<(String, String)> {
    let operator = OPERATORS
        .iter()
        .find(|op| inner.starts_with(**op))
        .ok_or_else(|| Error::MalformedRelation(entry.to_string()))?;
    let version = inner[operator.len()..].trim();
    if version.is_empty() || version.contains(char::is_whitespace) {
        return Err(Error::MalformedRelation(entry.to_string()));
    }
    Ok((operator.to_string(), version.to_string()))
}

/// Parse a comma-separated `Build-Environment` value
///
/// Duplicate tuples are dropped; the first occurrence keeps its position.
pub fn parse_build_environment(field: &str, build_arch: &str) -> Result<Vec<RequiredPackage>> {
    let mut seen = HashSet::new();
    let mut packages = Vec::new();

    for entry in field.split(',') {
        if entry.trim().is_empty() {
            continue;
        }
        let required = Relation::parse(entry)?.into_required(build_arch)?;
        if seen.insert(required.clone()) {
            packages.push(required);
        } else {
            debug!("Skipping duplicate relation {}", required);
        }
    }

    Ok(packages)
}
