//! Packaged resources
//!
//! A resource space is the set of module bundles shipped next to the project:
//! dependency trees unpacked on disk, zip bundles, or bytes embedded by the
//! host. Lookups are by exact name and return a byte stream. A missing
//! resource is not an error.

mod bundle;
mod dir;
mod memory;

pub use self::bundle::ZipResources;
pub use self::dir::DirResources;
pub use self::memory::MemoryResources;

use std::io::{self, Read};
use std::sync::Arc;

use tracing::debug;

/// A readable resource body.
pub type ResourceStream = Box<dyn Read + Send>;

/// Something that can open resources by name.
pub trait ResourceProvider: Send + Sync {
    /// Open the resource called `name`. `Ok(None)` when it does not exist.
    fn open(&self, name: &str) -> io::Result<Option<ResourceStream>>;
}

/// An ordered list of providers; the first one to yield a stream wins.
#[derive(Clone, Default)]
pub struct ResourceSpace {
    providers: Vec<Arc<dyn ResourceProvider>>,
}

impl ResourceSpace {
    /// Create an empty resource space (every lookup misses).
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`ResourceSpace::push`].
    pub fn with(mut self, provider: impl ResourceProvider + 'static) -> Self {
        self.push(provider);
        self
    }

    /// Append a provider with the lowest precedence so far.
    pub fn push(&mut self, provider: impl ResourceProvider + 'static) {
        self.providers.push(Arc::new(provider));
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl ResourceProvider for ResourceSpace {
    /// A failing provider does not hide later ones. The first failure is only
    /// reported when no provider has the resource.
    fn open(&self, name: &str) -> io::Result<Option<ResourceStream>> {
        let mut failure = None;
        for provider in &self.providers {
            match provider.open(name) {
                Ok(Some(stream)) => return Ok(Some(stream)),
                Ok(None) => {}
                Err(e) => {
                    debug!(resource = name, error = %e, "resource provider failed");
                    if failure.is_none() {
                        failure = Some(e);
                    }
                }
            }
        }
        match failure {
            Some(e) => Err(e),
            None => Ok(None),
        }
    }
}

impl std::fmt::Debug for ResourceSpace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceSpace")
            .field("providers", &self.providers.len())
            .finish()
    }
}
