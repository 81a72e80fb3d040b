//! Path sandboxing: every user-supplied path resolves against a fixed root
//! or not at all.
//!
//! No other module touches the filesystem with an unvalidated path. Escape,
//! missing entry, and kind mismatch all come back as the same `NotFound` so
//! error text cannot be used to probe structure outside the root.

use crate::error::{Result, ViewerError};
use log::debug;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// What a resolved path is expected to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntryKind {
    #[serde(rename = "file")]
    File,
    #[serde(rename = "dir")]
    Directory,
}

impl EntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntryKind::File => "file",
            EntryKind::Directory => "dir",
        }
    }
}

/// A path proven to live under the sandbox root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SandboxedPath {
    /// Canonicalized absolute path
    pub absolute: PathBuf,

    /// Path from the root to the target; empty for the root itself
    pub relative: PathBuf,
}

/// Resolves user-supplied relative paths against a fixed root directory.
#[derive(Debug, Clone)]
pub struct Sandbox {
    root: PathBuf,
}

impl Sandbox {
    /// Create a sandbox rooted at `root`, which must be an existing
    /// directory.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let requested = root.as_ref();
        let root = dunce::canonicalize(requested)
            .map_err(|_| ViewerError::not_found(requested.display().to_string()))?;
        if !root.is_dir() {
            return Err(ViewerError::not_found(requested.display().to_string()));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `requested` against the root.
    ///
    /// The joined path is canonicalized as a whole (resolving `.`, `..` and
    /// symlinks) and must keep the root as a component-wise prefix; `/logs`
    /// does not admit `/logs2`. The entry must exist and match `kind`.
    pub fn resolve(&self, requested: &str, kind: EntryKind) -> Result<SandboxedPath> {
        let joined = self.root.join(requested);
        let absolute =
            dunce::canonicalize(&joined).map_err(|_| ViewerError::not_found(requested))?;

        if !absolute.starts_with(&self.root) {
            debug!("rejected path escaping the root: {requested:?}");
            return Err(ViewerError::not_found(requested));
        }

        let kind_matches = match kind {
            EntryKind::File => absolute.is_file(),
            EntryKind::Directory => absolute.is_dir(),
        };
        if !kind_matches {
            return Err(ViewerError::not_found(requested));
        }

        let relative = absolute
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(SandboxedPath { absolute, relative })
    }
}
