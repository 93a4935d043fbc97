//! In-memory source archive
//!
//! The archive is the project's own source tree: a map of logical paths to
//! file text. It can be built in memory, loaded from a directory on disk, and
//! written back out after compilation has added the generated files.
//!
//! Paths are normalized: forward slashes, no leading `./`, no trailing `/`.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;

/// Exact-path lookup into a source tree. No globbing.
pub trait SourceTree: Send + Sync {
    /// Contents of the file at `path`, if present.
    fn find_file(&self, path: &str) -> Option<String>;
}

/// A source tree held entirely in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Archive {
    entries: BTreeMap<String, String>,
}

impl Archive {
    /// Create an empty archive.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Archive::add_file`].
    pub fn with_file(mut self, path: &str, contents: impl Into<String>) -> Self {
        self.add_file(path, contents);
        self
    }

    /// Add or replace a file.
    pub fn add_file(&mut self, path: &str, contents: impl Into<String>) {
        self.entries.insert(normalize_path(path), contents.into());
    }

    /// Check if a file exists in the archive.
    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(&normalize_path(path))
    }

    /// All files in path order.
    pub fn files(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, c)| (p.as_str(), c.as_str()))
    }

    /// All paths in order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|p| p.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load every UTF-8 file under `root`, keyed by its path relative to `root`.
    ///
    /// Files that are not valid UTF-8 are skipped.
    pub fn from_dir(root: &Path) -> io::Result<Self> {
        let mut archive = Archive::new();
        collect_files(root, root, &mut archive)?;
        Ok(archive)
    }

    /// Write every file below `dir`, creating directories as needed.
    pub fn write_to(&self, dir: &Path) -> io::Result<()> {
        for (path, contents) in &self.entries {
            let target = dir.join(path);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&target, contents)?;
        }
        Ok(())
    }
}

impl SourceTree for Archive {
    fn find_file(&self, path: &str) -> Option<String> {
        self.entries.get(&normalize_path(path)).cloned()
    }
}

fn collect_files(root: &Path, dir: &Path, archive: &mut Archive) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let path = entry.path();
        if file_type.is_dir() {
            collect_files(root, &path, archive)?;
            continue;
        }
        // Linked directories may loop back into the tree.
        if file_type.is_symlink() && path.is_dir() {
            debug!(path = %path.display(), "skipping symlinked directory");
            continue;
        }

        let relative = path
            .strip_prefix(root)
            .unwrap_or(&path)
            .to_string_lossy()
            .replace('\\', "/");

        match fs::read_to_string(&path) {
            Ok(contents) => archive.add_file(&relative, contents),
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                debug!(path = %relative, "skipping non-UTF-8 file");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

/// Normalize a path for archive lookup.
///
/// - Replace backslashes with forward slashes
/// - Remove leading `./`
/// - Remove trailing `/`
fn normalize_path(path: &str) -> String {
    let mut p = path.replace('\\', "/");
    while let Some(stripped) = p.strip_prefix("./") {
        p = stripped.to_string();
    }
    while p.ends_with('/') {
        p.pop();
    }
    p
}
