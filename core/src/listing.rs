//! Directory listing, deterministic tree walking, and the small data
//! derivations (breadcrumbs, human-scaled sizes) the host drops into its
//! page templates.

use crate::error::{Result, ViewerError};
use crate::sandbox::{EntryKind, Sandbox, SandboxedPath};
use log::debug;
use serde::Serialize;
use std::ffi::OsStr;
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// One row of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirEntryInfo {
    pub name: String,
    pub kind: EntryKind,

    /// Sandbox-relative path of the entry
    pub relative: PathBuf,

    /// Human-scaled size: byte count for files, child count for directories
    pub size: String,
}

/// One component of a breadcrumb trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Crumb {
    pub name: String,

    /// Sandbox-relative path up to and including this component
    pub relative: PathBuf,

    pub kind: EntryKind,

    /// Whether this is the final component of the trail
    pub last: bool,
}

/// List one directory, non-recursively.
///
/// Subdirectories come first, sorted ascending by name; files follow, sorted
/// descending so date-named log files end up newest first.
pub fn list_dir(sandbox: &Sandbox, relative: &str) -> Result<Vec<DirEntryInfo>> {
    let dir = sandbox.resolve(relative, EntryKind::Directory)?;
    debug!("listing {}", dir.absolute.display());

    let mut dirs = Vec::new();
    let mut files = Vec::new();
    for entry in fs::read_dir(&dir.absolute)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let relative = dir.relative.join(entry.file_name());
        let path = entry.path();
        if path.is_dir() {
            let children = fs::read_dir(&path)?.count();
            dirs.push(DirEntryInfo {
                name,
                kind: EntryKind::Directory,
                relative,
                size: pretty_number(children as u64, "", false),
            });
        } else if path.is_file() {
            let bytes = entry.metadata()?.len();
            files.push(DirEntryInfo {
                name,
                kind: EntryKind::File,
                relative,
                size: pretty_number(bytes, "B", true),
            });
        }
    }

    dirs.sort_by(|a, b| a.name.cmp(&b.name));
    files.sort_by(|a, b| b.name.cmp(&a.name));
    dirs.append(&mut files);
    Ok(dirs)
}

/// Stream every file under `start`, depth-first and deterministically:
/// within each directory, subdirectories (with their whole subtrees) come
/// before files, both ordered ascending by name.
pub fn walk_files(
    sandbox: &Sandbox,
    start: &SandboxedPath,
) -> impl Iterator<Item = Result<SandboxedPath>> + use<> {
    let base = sandbox.root().to_path_buf();
    WalkDir::new(&start.absolute)
        .sort_by(|a, b| {
            let a_dir = a.file_type().is_dir();
            let b_dir = b.file_type().is_dir();
            b_dir.cmp(&a_dir).then_with(|| a.file_name().cmp(b.file_name()))
        })
        .into_iter()
        .filter_map(move |entry| match entry {
            Ok(entry) if entry.file_type().is_file() => {
                let absolute = entry.into_path();
                let relative = absolute
                    .strip_prefix(&base)
                    .map(Path::to_path_buf)
                    .unwrap_or_default();
                Some(Ok(SandboxedPath { absolute, relative }))
            }
            Ok(_) => None,
            Err(err) => Some(Err(ViewerError::Io(err.into()))),
        })
}

/// Breadcrumb trail for a sandbox-relative path. Every component but the
/// last is a directory; the last carries `kind`. The root itself produces an
/// empty trail.
pub fn breadcrumbs(relative: &Path, kind: EntryKind) -> Vec<Crumb> {
    let parts: Vec<&OsStr> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part),
            _ => None,
        })
        .collect();

    let mut so_far = PathBuf::new();
    let count = parts.len();
    parts
        .into_iter()
        .enumerate()
        .map(|(i, part)| {
            so_far.push(part);
            let last = i + 1 == count;
            Crumb {
                name: part.to_string_lossy().into_owned(),
                relative: so_far.clone(),
                kind: if last { kind } else { EntryKind::Directory },
                last,
            }
        })
        .collect()
}

const PREFIXES: [&str; 9] = ["", "k", "M", "G", "T", "P", "E", "Z", "Y"];

/// Scale `n` for humans: divide by 1000 (or 1024 when `binary`) until the
/// value drops below the base, round to nearest, and append the SI prefix.
/// Binary scaling marks the prefix with an `i`, e.g. `4 kiB`.
pub fn pretty_number(n: u64, unit: &str, binary: bool) -> String {
    let base: f64 = if binary { 1024.0 } else { 1000.0 };
    let mut value = n as f64;
    let mut prefix = "";
    for candidate in PREFIXES {
        prefix = candidate;
        if value < base {
            break;
        }
        value /= base;
    }

    let mut out = format!("{}", value.round() as u64);
    let mut suffix = prefix.to_string();
    if binary && !prefix.is_empty() {
        suffix.push('i');
    }
    suffix.push_str(unit);
    if !suffix.is_empty() {
        out.push(' ');
        out.push_str(&suffix);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, Sandbox) {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("freenode/old")).unwrap();
        fs::create_dir(dir.path().join("efnet")).unwrap();
        fs::write(dir.path().join("freenode/2024-01-01.log"), "a\n").unwrap();
        fs::write(dir.path().join("freenode/2024-01-02.log"), "b\n").unwrap();
        fs::write(dir.path().join("freenode/old/2023-12-31.log"), "c\n").unwrap();
        fs::write(dir.path().join("efnet/2024-02-01.log"), "d\n").unwrap();
        fs::write(dir.path().join("status.log"), "s\n").unwrap();
        let sandbox = Sandbox::new(dir.path()).unwrap();
        (dir, sandbox)
    }

    #[test]
    fn test_pretty_number() {
        assert_eq!(pretty_number(500, "B", false), "500 B");
        assert_eq!(pretty_number(10_000, "B", false), "10 kB");
        assert_eq!(pretty_number(1024 * 1024, "", true), "1 Mi");
        assert_eq!(pretty_number(42, "", false), "42");
        assert_eq!(pretty_number(0, "B", false), "0 B");
        assert_eq!(pretty_number(4096, "B", true), "4 kiB");
        assert_eq!(pretty_number(1_500_000, "B", false), "2 MB");
    }

    #[test]
    fn test_list_dir_order_and_sizes() {
        let (_dir, sandbox) = fixture();
        let entries = list_dir(&sandbox, "freenode").unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        // directories ascending, then files descending
        assert_eq!(names, vec!["old", "2024-01-02.log", "2024-01-01.log"]);
        assert_eq!(entries[0].kind, EntryKind::Directory);
        assert_eq!(entries[0].size, "1");
        assert_eq!(entries[1].kind, EntryKind::File);
        assert_eq!(entries[1].size, "2 B");
        assert_eq!(entries[1].relative, PathBuf::from("freenode/2024-01-02.log"));
    }

    #[test]
    fn test_list_dir_rejects_files() {
        let (_dir, sandbox) = fixture();
        assert!(list_dir(&sandbox, "status.log").is_err());
    }

    #[test]
    fn test_walk_is_depth_first_and_deterministic() {
        let (_dir, sandbox) = fixture();
        let root = sandbox.resolve("", EntryKind::Directory).unwrap();
        let files: Vec<PathBuf> = walk_files(&sandbox, &root)
            .collect::<Result<Vec<_>>>()
            .unwrap()
            .into_iter()
            .map(|p| p.relative)
            .collect();
        assert_eq!(
            files,
            vec![
                PathBuf::from("efnet/2024-02-01.log"),
                PathBuf::from("freenode/old/2023-12-31.log"),
                PathBuf::from("freenode/2024-01-01.log"),
                PathBuf::from("freenode/2024-01-02.log"),
                PathBuf::from("status.log"),
            ]
        );
    }

    #[test]
    fn test_walk_subtree() {
        let (_dir, sandbox) = fixture();
        let start = sandbox.resolve("freenode/old", EntryKind::Directory).unwrap();
        let files: Vec<PathBuf> = walk_files(&sandbox, &start)
            .collect::<Result<Vec<_>>>()
            .unwrap()
            .into_iter()
            .map(|p| p.relative)
            .collect();
        assert_eq!(files, vec![PathBuf::from("freenode/old/2023-12-31.log")]);
    }

    #[test]
    fn test_breadcrumbs() {
        let crumbs = breadcrumbs(Path::new("freenode/old/2023-12-31.log"), EntryKind::File);
        assert_eq!(crumbs.len(), 3);
        assert_eq!(crumbs[0].name, "freenode");
        assert_eq!(crumbs[0].kind, EntryKind::Directory);
        assert!(!crumbs[0].last);
        assert_eq!(crumbs[1].relative, PathBuf::from("freenode/old"));
        assert_eq!(crumbs[2].name, "2023-12-31.log");
        assert_eq!(crumbs[2].kind, EntryKind::File);
        assert!(crumbs[2].last);
    }

    #[test]
    fn test_breadcrumbs_for_root_are_empty() {
        assert!(breadcrumbs(Path::new(""), EntryKind::Directory).is_empty());
    }
}
