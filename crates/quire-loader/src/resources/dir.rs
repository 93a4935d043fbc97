//! Resources unpacked in a directory on disk.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Component, Path, PathBuf};

use super::{ResourceProvider, ResourceStream};

/// A directory root, like an exploded bundle.
///
/// Names that would escape the root (absolute paths, `..` components) are
/// reported as missing.
#[derive(Debug, Clone)]
pub struct DirResources {
    root: PathBuf,
}

impl DirResources {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn locate(&self, name: &str) -> Option<PathBuf> {
        let relative = Path::new(name);
        let contained = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !contained {
            return None;
        }
        Some(self.root.join(relative))
    }
}

impl ResourceProvider for DirResources {
    fn open(&self, name: &str) -> io::Result<Option<ResourceStream>> {
        let Some(path) = self.locate(name) else {
            return Ok(None);
        };
        if !path.is_file() {
            return Ok(None);
        }
        match File::open(&path) {
            Ok(file) => Ok(Some(Box::new(BufReader::new(file)))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}
