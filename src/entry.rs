//! Canonical listing entry and per-field read model.

/// A single filesystem-like node, normalized across local and remote sources.
///
/// `path` is always re-enterable: feeding a directory entry's `path` back into
/// the resolution pipeline lists its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub is_dir: bool,
    /// Display name. Remote listings may return a relative path segment here
    /// rather than a bare file name.
    pub name: String,
    /// Fully qualified address: a local path or `remote:/sub/path`.
    pub path: String,
}

/// The two logical path inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldId {
    Source,
    Dest,
}

/// Read model for one field. Suggestions are replaced wholesale on each
/// successful resolution, never partially mutated.
#[derive(Debug, Clone, Default)]
pub struct FieldState {
    pub raw_text: String,
    pub suggestions: Vec<Entry>,
    pub is_loading: bool,
    pub last_error: Option<String>,
}
