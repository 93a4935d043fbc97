//! Opening absolute module URLs.
//!
//! Two schemes are served: `file:` reads the local filesystem, and the
//! configured resource scheme (`classpath:` by default) reads from the
//! packaged resource space. Any other scheme is treated as absent.

use std::fs::File;
use std::io;
use std::sync::Arc;

use tracing::debug;
use url::Url;

use crate::artifact::SourceArtifact;
use crate::error::{LoaderError, LoaderResult};
use crate::resources::{ResourceProvider, ResourceSpace};

/// Fetches URL-backed artifacts. The artifact identity is the URL string.
#[derive(Debug, Clone)]
pub struct UrlOpener {
    resource_scheme: String,
    resources: Arc<ResourceSpace>,
}

impl UrlOpener {
    pub fn new(resource_scheme: impl Into<String>, resources: Arc<ResourceSpace>) -> Self {
        Self {
            resource_scheme: resource_scheme.into(),
            resources,
        }
    }

    /// Parse `text` as a URL and open it.
    pub fn open_str(&self, text: &str) -> LoaderResult<Option<SourceArtifact>> {
        let url = Url::parse(text).map_err(|e| LoaderError::malformed(text, e))?;
        self.open(&url)
    }

    pub fn open(&self, url: &Url) -> LoaderResult<Option<SourceArtifact>> {
        match url.scheme() {
            "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|()| LoaderError::malformed(url.as_str(), "not a local file path"))?;
                match File::open(&path) {
                    Ok(file) => SourceArtifact::from_reader(file, url.as_str()).map(Some),
                    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
                    Err(e) => Err(LoaderError::io(url.as_str(), e)),
                }
            }
            scheme if scheme == self.resource_scheme => {
                let name = url.path().trim_start_matches('/');
                match self.resources.open(name) {
                    Ok(Some(stream)) => SourceArtifact::from_reader(stream, url.as_str()).map(Some),
                    Ok(None) => Ok(None),
                    Err(e) => Err(LoaderError::io(url.as_str(), e)),
                }
            }
            other => {
                debug!(url = %url, scheme = other, "unsupported URL scheme");
                Ok(None)
            }
        }
    }
}
