//! Remote listing adapter: parses `remote:/path` addresses into backend
//! calls and maps the returned items into the canonical [`Entry`] shape.
//!
//! This module is the only place that knows both the backend item shape and
//! the suggestion shape.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::entry::Entry;
use crate::errors::{Error, Result};

/// Listing detail switches forwarded to the backend. Suggestion lists do not
/// need modification times or MIME types, so both are suppressed by default.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ListOptions {
    #[serde(rename = "noModTime")]
    pub no_mod_time: bool,
    #[serde(rename = "noMimeType")]
    pub no_mime_type: bool,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            no_mod_time: true,
            no_mime_type: true,
        }
    }
}

/// One item as returned by the remote listing API.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteItem {
    #[serde(rename = "IsDir")]
    pub is_dir: bool,
    #[serde(rename = "Path")]
    pub path: String,
}

/// Seam over the remote listing API so the suggester can be exercised with
/// scripted backends.
pub trait RemoteLister: Send + Sync {
    fn list<'a>(
        &'a self,
        remote: &'a str,
        sub_path: &'a str,
        opts: ListOptions,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<RemoteItem>>> + Send + 'a>>;
}

/// List a remote directory and normalize the items into entries.
///
/// The remote name is re-checked here even though the classifier already
/// rejected empty names.
pub async fn list_remote(
    lister: &dyn RemoteLister,
    remote: &str,
    sub_path: &str,
    opts: ListOptions,
) -> Result<Vec<Entry>> {
    if remote.is_empty() {
        return Err(Error::InvalidAddress);
    }
    let items = lister.list(remote, sub_path, opts).await?;
    debug!(remote, sub_path, count = items.len(), "remote listing done");
    Ok(items
        .into_iter()
        .map(|item| Entry {
            path: format!("{}:/{}", remote, item.path),
            name: item.path,
            is_dir: item.is_dir,
        })
        .collect())
}

/// HTTP client for an rclone-style rc endpoint.
pub struct RcClient {
    http: reqwest::Client,
    base_url: String,
}

impl RcClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[derive(Serialize)]
struct ListRequest<'a> {
    fs: String,
    remote: &'a str,
    opt: ListOptions,
}

#[derive(Deserialize)]
struct ListResponse {
    list: Vec<RemoteItem>,
}

impl RemoteLister for RcClient {
    fn list<'a>(
        &'a self,
        remote: &'a str,
        sub_path: &'a str,
        opts: ListOptions,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<RemoteItem>>> + Send + 'a>> {
        Box::pin(async move {
            let url = format!("{}/operations/list", self.base_url.trim_end_matches('/'));
            let body = ListRequest {
                fs: format!("{remote}:"),
                remote: sub_path,
                opt: opts,
            };
            let resp = self.http.post(&url).json(&body).send().await?;
            if !resp.status().is_success() {
                let status = resp.status();
                let detail = resp.text().await.unwrap_or_default();
                return Err(Error::Listing(format!(
                    "backend returned {status}: {}",
                    detail.trim()
                )));
            }
            let parsed: ListResponse = resp.json().await?;
            Ok(parsed.list)
        })
    }
}
