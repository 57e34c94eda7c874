//! Pathscout Library
//!
//! Unified path resolution over local filesystems and named remote storage
//! backends, with live ordered suggestions, a two-field interaction model,
//! and mount-prerequisite/unmount helpers.

pub mod address;
pub mod controller;
pub mod dialog;
pub mod entry;
pub mod errors;
pub mod local;
pub mod mount;
pub mod remote;
pub mod suggest;
