//! Source artifacts
//!
//! A [`SourceArtifact`] is a resolved module: the URI it is known by plus its
//! text. Artifacts are immutable and cheap to clone, so every cache layer can
//! hold the same value.

use std::fmt;
use std::io::{self, Cursor, Read};
use std::sync::Arc;

use crate::error::{LoaderError, LoaderResult};

/// An immutable, resolved source module.
#[derive(Clone, PartialEq, Eq)]
pub struct SourceArtifact {
    inner: Arc<ArtifactData>,
}

#[derive(PartialEq, Eq)]
struct ArtifactData {
    uri: String,
    contents: String,
}

impl SourceArtifact {
    /// Create an artifact from its identity and text.
    pub fn new(uri: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(ArtifactData {
                uri: uri.into(),
                contents: contents.into(),
            }),
        }
    }

    /// Read a UTF-8 byte stream to the end and wrap it under `uri`.
    pub fn from_reader<R: Read>(mut reader: R, uri: impl Into<String>) -> LoaderResult<Self> {
        let uri = uri.into();
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|e| LoaderError::io(uri.as_str(), e))?;
        let contents = String::from_utf8(bytes).map_err(|e| {
            LoaderError::io(uri.as_str(), io::Error::new(io::ErrorKind::InvalidData, e))
        })?;
        Ok(Self::new(uri, contents))
    }

    /// The URI (or logical name) this artifact is known by.
    pub fn uri(&self) -> &str {
        &self.inner.uri
    }

    pub fn contents(&self) -> &str {
        &self.inner.contents
    }

    pub fn bytes(&self) -> &[u8] {
        self.inner.contents.as_bytes()
    }

    /// A reader over the contents. Does not copy the text.
    pub fn open(&self) -> Cursor<SourceArtifact> {
        Cursor::new(self.clone())
    }

    /// Whether both handles point at the very same cached value.
    pub fn same_as(&self, other: &SourceArtifact) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl AsRef<[u8]> for SourceArtifact {
    fn as_ref(&self) -> &[u8] {
        self.bytes()
    }
}

impl fmt::Debug for SourceArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceArtifact")
            .field("uri", &self.inner.uri)
            .field("len", &self.inner.contents.len())
            .finish()
    }
}

impl fmt::Display for SourceArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.uri())
    }
}
