//! Resources packed in a zip (or jar) bundle.

use std::fs::File;
use std::io::{self, Cursor, Read, Seek};
use std::path::Path;

use parking_lot::Mutex;
use zip::result::ZipError;
use zip::ZipArchive;

use super::{ResourceProvider, ResourceStream};

/// A zip bundle. Entries are decompressed into memory when opened.
pub struct ZipResources<R = File> {
    label: String,
    archive: Mutex<ZipArchive<R>>,
}

impl ZipResources<File> {
    /// Open a bundle on disk.
    pub fn from_path(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        Self::new(file, path.display().to_string())
    }
}

impl<R: Read + Seek> ZipResources<R> {
    /// Read the central directory of a bundle from any seekable reader.
    pub fn new(reader: R, label: impl Into<String>) -> io::Result<Self> {
        let archive = ZipArchive::new(reader).map_err(zip_to_io)?;
        Ok(Self {
            label: label.into(),
            archive: Mutex::new(archive),
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn len(&self) -> usize {
        self.archive.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<R: Read + Seek + Send> ResourceProvider for ZipResources<R> {
    fn open(&self, name: &str) -> io::Result<Option<ResourceStream>> {
        let name = name.trim_start_matches('/');
        let mut archive = self.archive.lock();
        let mut entry = match archive.by_name(name) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(zip_to_io(e)),
        };
        if entry.is_dir() {
            return Ok(None);
        }
        let mut data = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut data)?;
        Ok(Some(Box::new(Cursor::new(data))))
    }
}

impl<R> std::fmt::Debug for ZipResources<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZipResources")
            .field("label", &self.label)
            .finish()
    }
}

fn zip_to_io(e: ZipError) -> io::Error {
    match e {
        ZipError::Io(e) => e,
        other => io::Error::new(io::ErrorKind::InvalidData, other),
    }
}
