//! Whole-archive compilation
//!
//! Compiles every source module under the project root of an archive and
//! returns a copy of the archive with the compiled files added next to their
//! sources. Failures are collected so one broken file does not hide another.

use std::sync::Arc;

use tracing::{debug, info};

use super::{CompilationError, Compiler};
use crate::archive::Archive;
use crate::config::LoaderConfig;
use crate::resolver::Resolver;
use crate::resources::ResourceSpace;

/// Compiles the project sources of an [`Archive`].
pub struct ArchiveCompiler {
    config: LoaderConfig,
    compiler: Arc<dyn Compiler>,
    resources: Arc<ResourceSpace>,
}

impl ArchiveCompiler {
    /// `resources` backs imports of packaged dependencies while compiling.
    pub fn new(
        config: LoaderConfig,
        compiler: Arc<dyn Compiler>,
        resources: Arc<ResourceSpace>,
    ) -> Self {
        Self {
            config,
            compiler,
            resources,
        }
    }

    /// Whether `archive` has anything to compile.
    pub fn supports(&self, archive: &Archive) -> bool {
        !self.sources(archive).is_empty()
    }

    /// Compile every project source in path order.
    ///
    /// Stale compiled files in the input are replaced. If any source fails,
    /// the errors of all failing sources are returned together.
    pub fn compile(&self, archive: &Archive) -> Result<Archive, CompilationError> {
        let sources = self.sources(archive);
        info!(count = sources.len(), "compiling archive");

        let resolver = Resolver::new(
            &self.config,
            Arc::new(archive.clone()),
            Arc::clone(&self.resources),
        );
        let convention = self.config.convention();

        let mut output = archive.clone();
        let mut failures = Vec::new();
        for source in &sources {
            match self.compiler.compile(source, &resolver) {
                Ok(compiled) => {
                    if let Some(target) = convention.compiled_counterpart(source) {
                        debug!(source = %source, output = %target, "compiled");
                        output.add_file(&target, compiled);
                    }
                }
                Err(e) => {
                    debug!(source = %source, "compilation failed");
                    failures.push(e);
                }
            }
        }

        match CompilationError::merge(failures) {
            Some(error) => Err(error),
            None => Ok(output),
        }
    }

    /// Source-form files under the project root, excluding bundled dependencies.
    /// A successful [`ArchiveCompiler::compile`] produces one output for each.
    pub fn sources(&self, archive: &Archive) -> Vec<String> {
        let root = format!("{}/", self.config.project_root.trim_end_matches('/'));
        let marker = self.config.dependency_marker.as_str();
        let suffix = self.config.source_suffix.as_str();

        archive
            .paths()
            .filter(|path| path.starts_with(&root) && path.ends_with(suffix))
            .filter(|path| !path.contains(marker))
            .map(str::to_string)
            .collect()
    }
}

impl std::fmt::Debug for ArchiveCompiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveCompiler")
            .field("config", &self.config)
            .field("resources", &self.resources)
            .finish()
    }
}
