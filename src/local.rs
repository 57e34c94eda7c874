//! Local directory listing with truncate-and-retry recovery.

use tracing::debug;

use crate::address::SEPARATOR;
use crate::entry::Entry;
use crate::errors::{Error, Result};

/// List the children of a local directory.
///
/// Two-attempt policy: the path is tried verbatim first; when that fails
/// (typically because the user typed a file name or a partial component),
/// the path is truncated at the last separator and the parent is tried once.
/// A second failure surfaces as `Error::Listing`.
pub async fn list_local(path: &str) -> Result<Vec<Entry>> {
    match read_dir_entries(path).await {
        Ok(entries) => Ok(entries),
        Err(first_err) => {
            let Some(parent) = truncate_to_parent(path) else {
                return Err(Error::Listing(format!("{}: {}", path, first_err)));
            };
            debug!(path, parent = %parent, "listing failed, retrying parent");
            read_dir_entries(&parent)
                .await
                .map_err(|e| Error::Listing(format!("{}: {}", parent, e)))
        }
    }
}

/// Cut the path at its last platform separator. Returns None when there is
/// nothing to truncate.
fn truncate_to_parent(path: &str) -> Option<String> {
    let idx = path.rfind(SEPARATOR)?;
    if idx == 0 {
        return Some(SEPARATOR.to_string());
    }
    Some(path[..idx].to_string())
}

/// Rebuild a child path under its listed parent so the entry stays
/// re-enterable by the resolution pipeline.
pub(crate) fn join_under(parent: &str, name: &str) -> String {
    if parent.ends_with(SEPARATOR) {
        format!("{parent}{name}")
    } else {
        format!("{parent}{SEPARATOR}{name}")
    }
}

async fn read_dir_entries(dir: &str) -> std::io::Result<Vec<Entry>> {
    let mut rd = tokio::fs::read_dir(dir).await?;
    let mut out = Vec::new();
    while let Some(ent) = rd.next_entry().await? {
        let Ok(file_type) = ent.file_type().await else {
            continue;
        };
        // Symlinks are excluded from suggestions
        if file_type.is_symlink() {
            continue;
        }
        let name = ent.file_name().to_string_lossy().into_owned();
        out.push(Entry {
            is_dir: file_type.is_dir(),
            path: join_under(dir, &name),
            name,
        });
    }
    out.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(out)
}
