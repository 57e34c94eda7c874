//! Address classification for local paths and `remote:/path` references.

use crate::errors::{Error, Result};

/// Separator between a remote name and its sub-path.
pub const REMOTE_SEP: &str = ":/";

/// Platform path separator used for local truncation and path rebuilding.
pub const SEPARATOR: char = if cfg!(windows) { '\\' } else { '/' };

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Address {
    /// Empty input: the caller should list all known remotes instead of
    /// filesystem contents.
    Empty,
    /// A native filesystem path.
    Local(String),
    /// A `remote:/sub/path` reference. `sub_path` has no trailing slash.
    Remote { remote: String, sub_path: String },
}

/// Classify an address purely syntactically.
///
/// Everything before the first `":/"` is the remote name; registration of
/// that name is not checked here, so an unknown remote fails later at the
/// listing stage with a backend error.
pub fn classify(path: &str) -> Result<Address> {
    if path.is_empty() {
        return Ok(Address::Empty);
    }
    if let Some(idx) = path.find(REMOTE_SEP) {
        let remote = &path[..idx];
        if remote.is_empty() {
            return Err(Error::InvalidAddress);
        }
        let sub = &path[idx + REMOTE_SEP.len()..];
        let sub = sub.strip_suffix('/').unwrap_or(sub);
        return Ok(Address::Remote {
            remote: remote.to_string(),
            sub_path: sub.to_string(),
        });
    }
    Ok(Address::Local(path.to_string()))
}
