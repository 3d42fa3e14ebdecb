// src/package.rs

//! Package tuples shared by the parser, resolver and verifier

use std::fmt;

/// A binary package pinned to an exact version and architecture
///
/// Equality, ordering and hashing cover the whole triple, so a set of
/// these behaves like the set of `(name, version, architecture)` tuples.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequiredPackage {
    pub name: String,
    pub version: String,
    pub architecture: String,
}

impl RequiredPackage {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        architecture: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            architecture: architecture.into(),
        }
    }
}

impl fmt::Display for RequiredPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.name, self.version, self.architecture)
    }
}
