//! Resources embedded in memory.

use std::collections::HashMap;
use std::io::{self, Cursor};
use std::sync::Arc;

use super::{ResourceProvider, ResourceStream};

/// Name → bytes map.
#[derive(Debug, Clone, Default)]
pub struct MemoryResources {
    entries: HashMap<String, Arc<[u8]>>,
}

impl MemoryResources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`MemoryResources::insert`].
    pub fn with(mut self, name: &str, data: impl AsRef<[u8]>) -> Self {
        self.insert(name, data);
        self
    }

    pub fn insert(&mut self, name: &str, data: impl AsRef<[u8]>) {
        self.entries.insert(name.to_string(), Arc::from(data.as_ref()));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ResourceProvider for MemoryResources {
    fn open(&self, name: &str) -> io::Result<Option<ResourceStream>> {
        Ok(self
            .entries
            .get(name)
            .map(|data| Box::new(Cursor::new(Arc::clone(data))) as ResourceStream))
    }
}
