// src/verify.rs

//! Cross-check of the chosen snapshot against its package index

use crate::compression::{CompressionError, CompressionFormat, create_decoder};
use crate::control::{PackageIndexEntry, PackageIndexReader};
use crate::error::{Error, Result};
use crate::package::RequiredPackage;
use crate::snapshot::{SnapshotApi, SnapshotConfig, Timestamp};
use std::collections::BTreeSet;
use std::io::BufReader;
use tracing::{debug, info};

/// Required packages that no index entry provides, sorted
///
/// Stops reading as soon as every package has been seen. The first failed
/// entry aborts the check.
pub fn find_missing<I>(
    entries: I,
    build_arch: &str,
    required: &[RequiredPackage],
) -> Result<Vec<RequiredPackage>>
where
    I: IntoIterator<Item = Result<PackageIndexEntry>>,
{
    let mut remaining: BTreeSet<RequiredPackage> = required.iter().cloned().collect();
    let mut read = 0usize;
    for entry in entries {
        if remaining.is_empty() {
            break;
        }
        remaining.remove(&entry?.as_required(build_arch));
        read += 1;
    }
    debug!("Checked {} index entries", read);
    Ok(remaining.into_iter().collect())
}

/// Confirm that `timestamp` really lists every required package
///
/// Downloads the `Packages` index for the build architecture and streams it
/// through the decoder one stanza at a time. Fails with
/// [`Error::MissingPackages`] naming whatever it lacks. An index that does
/// not inflate or parse is a bad response from the service.
pub fn verify_snapshot<A: SnapshotApi + ?Sized>(
    api: &A,
    config: &SnapshotConfig,
    timestamp: Timestamp,
    build_arch: &str,
    required: &[RequiredPackage],
) -> Result<()> {
    let url = config.index_url(timestamp, build_arch)?;
    info!("Verifying snapshot {} against {}", timestamp, url);

    let raw = api.fetch_package_index(&url)?;
    let format = CompressionFormat::from_magic_bytes(&raw);
    debug!("Index is {} bytes, compression: {}", raw.len(), format);

    let entries = PackageIndexReader::new(BufReader::new(create_decoder(raw.as_slice(), format)))
        .map(|entry| {
            entry.map_err(|e| match e {
                Error::Io(source) => Error::from(CompressionError::Decompression {
                    format: format.name(),
                    source,
                }),
                other => Error::InvalidResponse {
                    url: url.to_string(),
                    message: other.to_string(),
                },
            })
        });

    let missing = find_missing(entries, build_arch, required)?;
    if !missing.is_empty() {
        return Err(Error::MissingPackages {
            timestamp: timestamp.to_string(),
            missing,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::snapshot::{BinaryFiles, BinaryVersion};
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;
    use url::Url;

    fn entry(name: &str, version: &str, architecture: &str) -> PackageIndexEntry {
        PackageIndexEntry {
            name: name.to_string(),
            version: version.to_string(),
            architecture: architecture.to_string(),
        }
    }

    fn missing(
        index: Vec<PackageIndexEntry>,
        build_arch: &str,
        required: &[RequiredPackage],
    ) -> Vec<RequiredPackage> {
        find_missing(index.into_iter().map(Ok), build_arch, required).unwrap()
    }

    /// Serves one fixed index body and nothing else
    struct StaticIndex(Vec<u8>);

    impl SnapshotApi for StaticIndex {
        fn binary_history(&self, name: &str) -> Result<Vec<BinaryVersion>> {
            Err(Error::HttpStatus {
                url: name.to_string(),
                status: 404,
            })
        }

        fn binary_files(
            &self,
            _source: &str,
            _source_version: &str,
            name: &str,
            _version: &str,
        ) -> Result<BinaryFiles> {
            Err(Error::HttpStatus {
                url: name.to_string(),
                status: 404,
            })
        }

        fn fetch_package_index(&self, _url: &Url) -> Result<Vec<u8>> {
            Ok(self.0.clone())
        }
    }

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn verify(body: Vec<u8>, required: &[RequiredPackage]) -> Result<()> {
        let timestamp = Timestamp::parse("20230101T000000Z").unwrap();
        verify_snapshot(
            &StaticIndex(body),
            &SnapshotConfig::default(),
            timestamp,
            "amd64",
            required,
        )
    }

    const INDEX: &str = "\
Package: foo
Version: 1.0
Architecture: all
Description: foo
 long text

Package: bar
Version: 2.0
Architecture: amd64
";

    #[test]
    fn test_all_packages_present() {
        let index = vec![entry("foo", "1.0", "all"), entry("bar", "2.0", "amd64")];
        let required = [
            RequiredPackage::new("foo", "1.0", "amd64"),
            RequiredPackage::new("bar", "2.0", "amd64"),
        ];
        assert!(missing(index, "amd64", &required).is_empty());
    }

    #[test]
    fn test_version_and_arch_must_match_exactly() {
        let index = vec![entry("foo", "1.0-1", "all"), entry("bar", "2.0", "i386")];
        let required = [
            RequiredPackage::new("foo", "1.0", "amd64"),
            RequiredPackage::new("bar", "2.0", "amd64"),
        ];
        assert_eq!(
            missing(index, "amd64", &required),
            vec![
                RequiredPackage::new("bar", "2.0", "amd64"),
                RequiredPackage::new("foo", "1.0", "amd64"),
            ]
        );
    }

    #[test]
    fn test_arch_all_maps_to_build_arch_only() {
        // An "all" entry stands in for the build architecture, not any other
        let index = vec![entry("foo", "1.0", "all")];
        let required = [RequiredPackage::new("foo", "1.0", "i386")];
        assert_eq!(missing(index, "amd64", &required).len(), 1);
    }

    #[test]
    fn test_stops_reading_once_satisfied() {
        let entries = vec![
            Ok(entry("foo", "1.0", "all")),
            Err(Error::ControlParse("unreachable".to_string())),
        ];
        let required = [RequiredPackage::new("foo", "1.0", "amd64")];
        assert!(find_missing(entries, "amd64", &required).unwrap().is_empty());
    }

    #[test]
    fn test_verify_gzip_index() {
        let required = [
            RequiredPackage::new("foo", "1.0", "amd64"),
            RequiredPackage::new("bar", "2.0", "amd64"),
        ];
        verify(gzip(INDEX.as_bytes()), &required).unwrap();
        // An index served already inflated is read the same way
        verify(INDEX.as_bytes().to_vec(), &required).unwrap();
    }

    #[test]
    fn test_verify_reports_missing_packages() {
        let required = [
            RequiredPackage::new("foo", "1.0", "amd64"),
            RequiredPackage::new("baz", "3.0", "amd64"),
        ];
        match verify(gzip(INDEX.as_bytes()), &required).unwrap_err() {
            Error::MissingPackages { timestamp, missing } => {
                assert_eq!(timestamp, "20230101T000000Z");
                assert_eq!(missing, vec![RequiredPackage::new("baz", "3.0", "amd64")]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_malformed_index_is_invalid_response() {
        let body = gzip(b"Package: foo\nVersion: 1.0\n");
        let err = verify(body, &[RequiredPackage::new("foo", "1.0", "amd64")]).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Network);
        match err {
            Error::InvalidResponse { url, .. } => assert_eq!(
                url,
                "http://snapshot.debian.org/archive/debian/20230101T000000Z/dists/sid/main/binary-amd64/Packages.gz"
            ),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_truncated_gzip_index() {
        let body = gzip(INDEX.as_bytes());
        let err = verify(body[..12].to_vec(), &[RequiredPackage::new("foo", "1.0", "amd64")])
            .unwrap_err();
        assert!(matches!(err, Error::Decompression(_)));
        assert_eq!(err.kind(), ErrorKind::Network);
    }
}
