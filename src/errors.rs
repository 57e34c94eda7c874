use thiserror::Error;

/// Errors produced by the resolution pipeline and the mount helpers.
///
/// Listing and picker failures are field-scoped: the suggester turns them
/// into a `last_error` string and keeps running. Unmount and download
/// failures propagate to whoever triggered the action.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid address: missing remote name before \":/\"")]
    InvalidAddress,

    #[error("listing failed: {0}")]
    Listing(String),

    #[error("folder picker failed: {0}")]
    Picker(String),

    #[error("mount point is busy")]
    UnmountBusy,

    #[error("unmount failed: {0}")]
    Unmount(String),

    #[error("download failed: {0}")]
    Download(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
