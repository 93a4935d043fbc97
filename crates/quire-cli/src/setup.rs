//! Building loader components from command line arguments.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Args;
use quire_loader::{
    Archive, CommandCompiler, CompilationError, CompileCache, Compiler, DirResources,
    LoaderConfig, ResourceSpace, Resolver, SourceLookup, ZipResources,
};
use tracing::debug;

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct LoaderArgs {
    /// Packaged resources: a directory, or a .zip/.jar bundle (repeatable, first wins)
    #[arg(long = "resources", value_name = "PATH")]
    pub resources: Vec<PathBuf>,

    /// Loader configuration (TOML)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Compiler command; `{file}` is replaced by the source name, source text arrives on stdin
    #[arg(long, value_name = "CMD")]
    pub compile_with: Option<String>,
}

/// Stands in when no compiler command was given.
struct Unconfigured;

impl Compiler for Unconfigured {
    fn compile(
        &self,
        source_name: &str,
        _sources: &dyn SourceLookup,
    ) -> Result<String, CompilationError> {
        Err(CompilationError::new(
            source_name,
            format!("cannot compile {}: no compiler configured; pass --compile-with", source_name),
        ))
    }
}

impl LoaderArgs {
    pub fn config(&self) -> anyhow::Result<LoaderConfig> {
        match &self.config {
            Some(path) => LoaderConfig::from_file(path)
                .with_context(|| format!("failed to load config {}", path.display())),
            None => Ok(LoaderConfig::default()),
        }
    }

    pub fn resource_space(&self) -> anyhow::Result<ResourceSpace> {
        let mut space = ResourceSpace::new();
        for path in &self.resources {
            if path.is_dir() {
                debug!(path = %path.display(), "mounting resource directory");
                space.push(DirResources::new(path.clone()));
            } else if is_bundle(path) {
                debug!(path = %path.display(), "mounting resource bundle");
                let bundle = ZipResources::from_path(path)
                    .with_context(|| format!("failed to open bundle {}", path.display()))?;
                space.push(bundle);
            } else {
                bail!(
                    "resources must be a directory or a .zip/.jar bundle: {}",
                    path.display()
                );
            }
        }
        Ok(space)
    }

    pub fn compiler(&self) -> anyhow::Result<Arc<dyn Compiler>> {
        match &self.compile_with {
            Some(command) => match CommandCompiler::parse(command) {
                Some(compiler) => Ok(Arc::new(compiler)),
                None => bail!("--compile-with needs a command"),
            },
            None => Ok(Arc::new(Unconfigured)),
        }
    }

    /// Resolver and compile cache over `archive` (an empty archive when absent).
    pub fn compile_cache(&self, archive: Option<&Path>) -> anyhow::Result<CompileCache> {
        let config = self.config()?;
        let archive = match archive {
            Some(dir) => load_archive(dir)?,
            None => Archive::new(),
        };
        let resolver = Resolver::new(
            &config,
            Arc::new(archive),
            Arc::new(self.resource_space()?),
        );
        Ok(CompileCache::new(
            Arc::new(resolver),
            self.compiler()?,
            config.convention(),
        ))
    }
}

pub fn load_archive(dir: &Path) -> anyhow::Result<Archive> {
    if !dir.is_dir() {
        bail!("archive directory not found: {}", dir.display());
    }
    let archive = Archive::from_dir(dir)
        .with_context(|| format!("failed to read archive {}", dir.display()))?;
    debug!(path = %dir.display(), files = archive.len(), "loaded archive");
    Ok(archive)
}

fn is_bundle(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("zip") | Some("jar")
    )
}
