use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use std::time::Duration;
use url::Url;

use super::types::Torrent;
use crate::error::MetadataError;

static ID_QUERY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[^&]*&)*id=([0-9]+)(?:&.*)?$").expect("torrent id regex should compile")
});

/// Numeric torrent id of a `description.php?id=<n>` page, if `url` is one.
pub fn description_id(url: &Url) -> Option<u64> {
    if !url.path().ends_with("description.php") {
        return None;
    }
    let captures = ID_QUERY_REGEX.captures(url.query()?)?;
    captures.get(1)?.as_str().parse().ok()
}

/// Looks up canonical torrent names on the index's JSON API.
#[derive(Debug, Clone)]
pub struct TorrentResolver {
    client: reqwest::Client,
    api: String,
}

#[derive(Debug, Deserialize)]
struct TorrentResponse {
    name: String,
}

impl TorrentResolver {
    pub fn new(client: reqwest::Client, api: impl Into<String>) -> Self {
        Self {
            client,
            api: api.into(),
        }
    }

    /// Metadata for the torrent behind `url`. Any failure is logged and
    /// reported as `None`; the caller keeps the page title.
    pub async fn resolve(&self, url: &Url, timeout: Duration) -> Option<Torrent> {
        let id = description_id(url)?;
        match self.lookup(id, timeout).await {
            Ok(torrent) => Some(torrent),
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "torrent metadata lookup failed");
                None
            }
        }
    }

    /// Single request, no retry.
    pub async fn lookup(&self, id: u64, timeout: Duration) -> Result<Torrent, MetadataError> {
        tracing::debug!(id, api = %self.api, "fetching torrent metadata");
        let request_failed = |message: String| MetadataError::Request { id, message };

        let response = self
            .client
            .get(&self.api)
            .query(&[("id", id)])
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| request_failed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(request_failed(format!("HTTP {status}")));
        }

        let body: TorrentResponse = response
            .json()
            .await
            .map_err(|e| MetadataError::Decode {
                id,
                message: e.to_string(),
            })?;

        let name = body.name.trim();
        if name.is_empty() {
            return Err(MetadataError::NotFound { id });
        }

        Ok(Torrent {
            id,
            name: name.to_string(),
        })
    }
}
