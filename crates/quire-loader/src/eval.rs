//! Module evaluation
//!
//! [`EvaluationTracker`] sits on top of the [`CompileCache`] and runs each
//! executable module in the host runtime at most once. While a module runs it
//! is on the context stack, so relative `require`s issued by that module
//! resolve against it even when the runtime does not say who is asking.

use std::io::Cursor;
use std::sync::Arc;

use dashmap::DashSet;
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::artifact::SourceArtifact;
use crate::compile::CompileCache;
use crate::error::{ExecutionError, LoaderError, LoaderResult};
use crate::kind::{ArtifactKind, SuffixConvention};

/// The embedding runtime that executes compiled modules.
pub trait HostRuntime: Send + Sync {
    /// Execute `artifact`. Nested loads go through `loader`.
    fn execute(&self, artifact: &SourceArtifact, loader: &dyn ModuleLoader)
        -> Result<(), ExecutionError>;
}

/// Entry point for modules that load other modules.
pub trait ModuleLoader {
    fn load(&self, specifier: &str, base: Option<&str>) -> LoaderResult<Option<SourceArtifact>>;
}

/// Tracks which modules have run and which one is running now.
pub struct EvaluationTracker {
    cache: CompileCache,
    runtime: Option<Arc<dyn HostRuntime>>,
    /// Identities of modules that executed successfully
    evaluated: DashSet<String>,
    context: Mutex<Vec<SourceArtifact>>,
}

impl EvaluationTracker {
    /// A tracker with no runtime: loads resolve and compile but never execute.
    pub fn new(cache: CompileCache) -> Self {
        Self {
            cache,
            runtime: None,
            evaluated: DashSet::new(),
            context: Mutex::new(Vec::new()),
        }
    }

    pub fn with_runtime(mut self, runtime: Arc<dyn HostRuntime>) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Resolve (compiling if needed) and, for executable modules, run once.
    ///
    /// The artifact is returned whether or not it was executed by this call.
    /// A failed execution is not recorded, so loading again retries it.
    pub fn load_and_run(
        &self,
        specifier: &str,
        base: Option<&str>,
    ) -> LoaderResult<Option<SourceArtifact>> {
        let context = self.current_context();
        let artifact = match self
            .cache
            .resolve_executable_in(specifier, base, context.as_ref())?
        {
            Some(artifact) => artifact,
            None => {
                warn!(specifier, ?base, "module not found");
                return Ok(None);
            }
        };

        if self.convention().kind_of(specifier) != ArtifactKind::Compiled {
            return Ok(Some(artifact));
        }
        let runtime = match &self.runtime {
            Some(runtime) => runtime,
            None => return Ok(Some(artifact)),
        };
        if self.evaluated.contains(artifact.uri()) {
            trace!(specifier, uri = artifact.uri(), "already evaluated");
            return Ok(Some(artifact));
        }
        if self.is_running(artifact.uri()) {
            debug!(specifier, uri = artifact.uri(), "circular load, not re-entering");
            return Ok(Some(artifact));
        }

        debug!(specifier, uri = artifact.uri(), "evaluating");
        {
            let _frame = ContextFrame::push(&self.context, artifact.clone());
            runtime
                .execute(&artifact, self)
                .map_err(|source| LoaderError::Load {
                    specifier: specifier.to_string(),
                    source,
                })?;
        }
        self.evaluated.insert(artifact.uri().to_string());

        Ok(Some(artifact))
    }

    /// [`EvaluationTracker::load_and_run`], then a reader over the artifact.
    pub fn source_as_stream(
        &self,
        specifier: &str,
        base: Option<&str>,
    ) -> LoaderResult<Option<Cursor<SourceArtifact>>> {
        Ok(self.load_and_run(specifier, base)?.map(|artifact| artifact.open()))
    }

    /// Whether the module with this identity has executed successfully.
    pub fn is_evaluated(&self, uri: &str) -> bool {
        self.evaluated.contains(uri)
    }

    /// Number of modules currently executing.
    pub fn context_depth(&self) -> usize {
        self.context.lock().len()
    }

    /// The innermost module currently executing.
    pub fn current_context(&self) -> Option<SourceArtifact> {
        self.context.lock().last().cloned()
    }

    pub fn compile_cache(&self) -> &CompileCache {
        &self.cache
    }

    fn convention(&self) -> &SuffixConvention {
        self.cache.convention()
    }

    fn is_running(&self, uri: &str) -> bool {
        self.context.lock().iter().any(|frame| frame.uri() == uri)
    }
}

impl ModuleLoader for EvaluationTracker {
    fn load(&self, specifier: &str, base: Option<&str>) -> LoaderResult<Option<SourceArtifact>> {
        self.load_and_run(specifier, base)
    }
}

impl std::fmt::Debug for EvaluationTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvaluationTracker")
            .field("cache", &self.cache)
            .field("has_runtime", &self.runtime.is_some())
            .field("evaluated", &self.evaluated.len())
            .field("context_depth", &self.context_depth())
            .finish()
    }
}

/// One entry on the context stack, popped when dropped.
///
/// The stack lock is only taken to push and pop, never while the module runs.
struct ContextFrame<'a> {
    stack: &'a Mutex<Vec<SourceArtifact>>,
    depth: usize,
}

impl<'a> ContextFrame<'a> {
    fn push(stack: &'a Mutex<Vec<SourceArtifact>>, artifact: SourceArtifact) -> Self {
        let mut frames = stack.lock();
        frames.push(artifact);
        let depth = frames.len();
        Self { stack, depth }
    }
}

impl Drop for ContextFrame<'_> {
    fn drop(&mut self) {
        self.stack.lock().truncate(self.depth - 1);
    }
}
