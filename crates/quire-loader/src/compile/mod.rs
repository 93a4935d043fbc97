//! On-demand compilation
//!
//! Executable modules (`.js`) may not exist yet: only their source form
//! (`.ts`) is in the archive. [`CompileCache`] finds the source, hands it to a
//! [`Compiler`], and keeps the output so each source is compiled at most once.

mod batch;
mod command;
mod diagnostic;

pub use self::batch::ArchiveCompiler;
pub use self::command::CommandCompiler;
pub use self::diagnostic::{CompilationError, Diagnostic};

use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::OnceCell;
use tracing::{debug, trace};

use crate::artifact::SourceArtifact;
use crate::error::LoaderResult;
use crate::kind::{ArtifactKind, SuffixConvention};
use crate::resolver::Resolver;

/// Resolution as seen by a compiler that needs to follow imports.
pub trait SourceLookup: Send + Sync {
    /// Find the module `specifier`, relative to `base` when it is a relative reference.
    fn source_for(&self, specifier: &str, base: Option<&str>)
        -> LoaderResult<Option<SourceArtifact>>;
}

/// Turns a source module into executable text.
pub trait Compiler: Send + Sync {
    /// Compile the module known as `source_name`. Its text, and the text of
    /// anything it imports, comes from `sources`.
    fn compile(&self, source_name: &str, sources: &dyn SourceLookup)
        -> Result<String, CompilationError>;
}

impl<F> Compiler for F
where
    F: Fn(&str, &dyn SourceLookup) -> Result<String, CompilationError> + Send + Sync,
{
    fn compile(
        &self,
        source_name: &str,
        sources: &dyn SourceLookup,
    ) -> Result<String, CompilationError> {
        self(source_name, sources)
    }
}

/// Resolver plus compile-on-miss for executable modules.
///
/// Compiled output is keyed by the resolved source identity. Concurrent
/// requests for the same source wait for one compilation; a failed
/// compilation leaves nothing behind, so the next request tries again.
pub struct CompileCache {
    resolver: Arc<Resolver>,
    compiler: Arc<dyn Compiler>,
    convention: SuffixConvention,
    compiled: DashMap<String, Arc<OnceCell<SourceArtifact>>>,
}

impl CompileCache {
    pub fn new(
        resolver: Arc<Resolver>,
        compiler: Arc<dyn Compiler>,
        convention: SuffixConvention,
    ) -> Self {
        Self {
            resolver,
            compiler,
            convention,
            compiled: DashMap::new(),
        }
    }

    /// Resolve `specifier`, compiling its source form when only that exists.
    pub fn resolve_executable(
        &self,
        specifier: &str,
        base: Option<&str>,
    ) -> LoaderResult<Option<SourceArtifact>> {
        self.resolve_executable_in(specifier, base, None)
    }

    /// Like [`CompileCache::resolve_executable`], with a context artifact for
    /// relative references that have no usable base.
    pub fn resolve_executable_in(
        &self,
        specifier: &str,
        base: Option<&str>,
        context: Option<&SourceArtifact>,
    ) -> LoaderResult<Option<SourceArtifact>> {
        if let Some(found) = self.resolver.resolve_in(specifier, base, context)? {
            return Ok(Some(found));
        }

        if self.convention.kind_of(specifier) != ArtifactKind::Compiled {
            return Ok(None);
        }
        let counterpart = match self.convention.source_counterpart(specifier) {
            Some(counterpart) => counterpart,
            None => return Ok(None),
        };
        let source = match self.resolver.resolve_in(&counterpart, base, context)? {
            Some(source) => source,
            None => {
                trace!(specifier, %counterpart, "no source counterpart");
                return Ok(None);
            }
        };

        let slot = Arc::clone(
            self.compiled
                .entry(source.uri().to_string())
                .or_default()
                .value(),
        );
        if let Some(hit) = slot.get() {
            trace!(specifier, source = source.uri(), "compiled cache hit");
            return Ok(Some(hit.clone()));
        }

        let compiled = slot.get_or_try_init(|| self.compile(&source, specifier))?;
        Ok(Some(compiled.clone()))
    }

    fn compile(&self, source: &SourceArtifact, requested: &str) -> LoaderResult<SourceArtifact> {
        debug!(source = source.uri(), requested, "compiling");
        let output = self.compiler.compile(source.uri(), &*self.resolver)?;
        let identity = self
            .convention
            .compiled_counterpart(source.uri())
            .unwrap_or_else(|| requested.to_string());
        debug!(identity = %identity, bytes = output.len(), "compiled");
        Ok(SourceArtifact::new(identity, output))
    }

    pub fn resolver(&self) -> &Arc<Resolver> {
        &self.resolver
    }

    pub fn convention(&self) -> &SuffixConvention {
        &self.convention
    }
}

impl std::fmt::Debug for CompileCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompileCache")
            .field("resolver", &self.resolver)
            .field("convention", &self.convention)
            .field("compiled", &self.compiled.len())
            .finish()
    }
}
