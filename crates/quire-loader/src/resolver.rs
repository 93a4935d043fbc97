//! Module resolution
//!
//! Turns a specifier, and optionally the file that mentions it, into a
//! [`SourceArtifact`].
//!
//! # Resolution Order
//! 1. Raw-source cache
//! 2. Relative specifiers (`./x`, `../x`): against the base file, or against
//!    the context artifact when the base is unknown or cannot be found
//! 3. The archive, by exact path, so dependencies bundled with a project
//!    shadow packaged ones
//! 4. Nested dependency paths: `a/node_modules/lodash/x.js` is looked up as
//!    the packaged resource `lodash/x.js`
//! 5. Packaged roots: `node_modules/<name>`, then `.atomist/node_modules/<name>`
//! 6. Absolute URLs, then the packaged resources by exact name
//!
//! Successful lookups are cached under the specifier that was asked for.
//! Relative specifiers are cached under the name they resolved to, since the
//! same `./x` means different files from different bases.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, trace};
use url::Url;

use crate::archive::SourceTree;
use crate::artifact::SourceArtifact;
use crate::compile::SourceLookup;
use crate::config::LoaderConfig;
use crate::error::{LoaderError, LoaderResult};
use crate::fetch::UrlOpener;
use crate::resources::{ResourceProvider, ResourceSpace};
use crate::uri;

/// Resolves specifiers against the archive, the packaged resources, and URLs.
pub struct Resolver {
    archive: Arc<dyn SourceTree>,
    resources: Arc<ResourceSpace>,
    urls: UrlOpener,
    dependency_marker: String,
    package_roots: Vec<String>,
    /// Raw-source cache. Entries are never replaced once written.
    cache: DashMap<String, SourceArtifact>,
}

impl Resolver {
    /// Create a resolver over an archive and a resource space.
    pub fn new(
        config: &LoaderConfig,
        archive: Arc<dyn SourceTree>,
        resources: Arc<ResourceSpace>,
    ) -> Self {
        Self {
            archive,
            urls: UrlOpener::new(config.resource_scheme.as_str(), Arc::clone(&resources)),
            resources,
            dependency_marker: config.dependency_marker.clone(),
            package_roots: config.package_roots.clone(),
            cache: DashMap::new(),
        }
    }

    /// Resolve `specifier`, relative to `base` when it is a relative reference.
    pub fn resolve(
        &self,
        specifier: &str,
        base: Option<&str>,
    ) -> LoaderResult<Option<SourceArtifact>> {
        self.resolve_in(specifier, base, None)
    }

    /// Like [`Resolver::resolve`], with the artifact currently being executed
    /// as a fallback anchor for relative references.
    pub fn resolve_in(
        &self,
        specifier: &str,
        base: Option<&str>,
        context: Option<&SourceArtifact>,
    ) -> LoaderResult<Option<SourceArtifact>> {
        if let Some(hit) = self.cached(specifier) {
            trace!(specifier, "raw-source cache hit");
            return Ok(Some(hit));
        }

        if uri::is_relative(specifier) {
            let base_artifact = match base {
                Some(base) => self.resolve_in(base, None, None)?,
                None => None,
            };
            if let Some(base_artifact) = base_artifact {
                let target = uri::resolve_reference(base_artifact.uri(), specifier)?;
                trace!(
                    specifier,
                    base = base_artifact.uri(),
                    resolved = %target,
                    "rebased relative reference"
                );
                return self.resolve_in(&target, None, None);
            }

            if let Some(context) = context {
                if let Some(found) = self.resolve_from_context(specifier, context)? {
                    return Ok(Some(found));
                }
            }

            // Nothing anchors the reference; the text itself may still name a resource.
            return self.lookup(specifier);
        }

        Ok(self
            .lookup(specifier)?
            .map(|found| self.remember(specifier, found)))
    }

    /// Cached artifact for `specifier`, if it has been resolved before.
    pub fn cached(&self, specifier: &str) -> Option<SourceArtifact> {
        self.cache.get(specifier).map(|entry| entry.value().clone())
    }

    /// Number of entries in the raw-source cache.
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    fn resolve_from_context(
        &self,
        specifier: &str,
        context: &SourceArtifact,
    ) -> LoaderResult<Option<SourceArtifact>> {
        let target = uri::resolve_reference(context.uri(), specifier)?;
        trace!(specifier, context = context.uri(), resolved = %target, "resolving against context");

        if uri::is_absolute(&target) {
            return Ok(self
                .urls
                .open_str(&target)?
                .map(|found| self.remember(&target, found)));
        }
        self.resolve_in(&target, None, None)
    }

    /// The archive, then steps 3 to 5. I/O failures are held back until every branch has had
    /// its turn; the first one is returned if nothing is found.
    fn lookup(&self, specifier: &str) -> LoaderResult<Option<SourceArtifact>> {
        if let Some(contents) = self.archive.find_file(specifier) {
            trace!(specifier, "found in archive");
            return Ok(Some(SourceArtifact::new(specifier, contents)));
        }

        let mut failure = None;

        let inner = match self.dependency_inner_name(specifier) {
            Some(inner) => {
                if let Some(found) = settle(self.open_resource(inner, specifier), &mut failure)? {
                    return Ok(Some(found));
                }
                inner
            }
            None => specifier,
        };

        for root in &self.package_roots {
            let name = format!("{}{}", root, inner);
            if let Some(found) = settle(self.open_resource(&name, specifier), &mut failure)? {
                return Ok(Some(found));
            }
        }

        if uri::looks_like_url(specifier) {
            match Url::parse(specifier) {
                Ok(url) => match self.urls.open(&url) {
                    Ok(Some(found)) => return Ok(Some(found)),
                    Ok(None) => {}
                    Err(LoaderError::MalformedReference { reason, .. }) => {
                        debug!(specifier, %reason, "not an openable URL, trying as a name");
                    }
                    Err(e) => {
                        if failure.is_none() {
                            failure = Some(e);
                        }
                    }
                },
                Err(e) => {
                    debug!(specifier, error = %e, "not a URL, trying as a name");
                }
            }
        }

        if let Some(found) = settle(self.open_resource(specifier, specifier), &mut failure)? {
            return Ok(Some(found));
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(None),
        }
    }

    /// The part of `specifier` after its last dependency-root segment.
    fn dependency_inner_name<'a>(&self, specifier: &'a str) -> Option<&'a str> {
        let marker = self.dependency_marker.as_str();
        specifier
            .rmatch_indices(marker)
            .find(|(ix, _)| *ix == 0 || specifier[..*ix].ends_with('/'))
            .map(|(ix, _)| &specifier[ix + marker.len()..])
    }

    fn open_resource(&self, name: &str, identity: &str) -> LoaderResult<Option<SourceArtifact>> {
        match self.resources.open(name) {
            Ok(Some(stream)) => SourceArtifact::from_reader(stream, identity).map(Some),
            Ok(None) => Ok(None),
            Err(e) => Err(LoaderError::io(name, e)),
        }
    }

    /// Cache `artifact` under `key` unless another thread got there first;
    /// either way return the cached value.
    fn remember(&self, key: &str, artifact: SourceArtifact) -> SourceArtifact {
        self.cache
            .entry(key.to_string())
            .or_insert(artifact)
            .value()
            .clone()
    }
}

impl SourceLookup for Resolver {
    fn source_for(&self, specifier: &str, base: Option<&str>) -> LoaderResult<Option<SourceArtifact>> {
        self.resolve(specifier, base)
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("dependency_marker", &self.dependency_marker)
            .field("package_roots", &self.package_roots)
            .field("cached", &self.cache.len())
            .finish()
    }
}

/// Hold back an I/O failure so the next branch can run. Other errors end the lookup.
fn settle(
    result: LoaderResult<Option<SourceArtifact>>,
    failure: &mut Option<LoaderError>,
) -> LoaderResult<Option<SourceArtifact>> {
    match result {
        Err(e @ LoaderError::Io { .. }) => {
            debug!(error = %e, "byte provider failed, trying next branch");
            if failure.is_none() {
                *failure = Some(e);
            }
            Ok(None)
        }
        other => other,
    }
}
