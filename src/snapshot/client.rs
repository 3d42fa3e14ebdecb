// src/snapshot/client.rs

//! HTTP client for the snapshot service
//!
//! Provides a wrapper around reqwest for the machine-readable API and for
//! index downloads from the snapshot mirror. Requests are never retried.

use super::api::{BinaryFiles, BinaryVersion, ResultList, SnapshotApi};
use super::config::{SnapshotConfig, push_segments};
use crate::error::{Error, Result};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Blocking client for snapshot.debian.org style services
pub struct HttpSnapshotClient {
    client: Client,
    api_base: Url,
}

impl HttpSnapshotClient {
    /// Create a client for the API configured in `config`
    pub fn new(config: &SnapshotConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base: config.api_base()?,
        })
    }

    /// Build `{api_base}/<segments...>`
    fn api_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.api_base.clone();
        push_segments(&mut url, segments)?;
        Ok(url)
    }

    /// GET a URL and return the body of a successful response
    fn get_bytes(&self, url: &Url) -> Result<Vec<u8>> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url.clone())
            .send()
            .map_err(|e| Error::Network {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().map_err(|e| Error::Network {
            url: url.to_string(),
            message: format!("Failed to read response: {e}"),
        })?;
        debug!("Received {} bytes from {}", bytes.len(), url);
        Ok(bytes.to_vec())
    }

    fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T> {
        let body = self.get_bytes(url)?;
        serde_json::from_slice(&body).map_err(|e| Error::InvalidResponse {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

impl SnapshotApi for HttpSnapshotClient {
    fn binary_history(&self, name: &str) -> Result<Vec<BinaryVersion>> {
        let url = self.api_url(&["binary", name, ""])?;
        let list: ResultList<BinaryVersion> = self.get_json(&url)?;
        Ok(list.result)
    }

    fn binary_files(
        &self,
        source: &str,
        source_version: &str,
        name: &str,
        version: &str,
    ) -> Result<BinaryFiles> {
        let mut url = self.api_url(&[
            "package",
            source,
            source_version,
            "binfiles",
            name,
            version,
        ])?;
        url.query_pairs_mut().append_pair("fileinfo", "1");
        self.get_json(&url)
    }

    fn fetch_package_index(&self, url: &Url) -> Result<Vec<u8>> {
        self.get_bytes(url)
    }
}
