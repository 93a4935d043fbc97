//! Quire module loader
//!
//! Finds, compiles, and runs source modules without a real filesystem. Modules
//! come from an in-memory archive, packaged resource bundles, or URLs.
//!
//! The loader is layered:
//! - [`Resolver`]: specifier (plus optional base file) → [`SourceArtifact`]
//! - [`CompileCache`]: compiles `.ts` on demand when only the source form exists
//! - [`EvaluationTracker`]: runs each executable module once in a [`HostRuntime`]
//!
//! Each layer caches its own results. Not finding a module is `Ok(None)`;
//! errors are reserved for malformed references, I/O, compilation, and
//! execution failures.

pub mod archive;
pub mod artifact;
pub mod compile;
pub mod config;
pub mod error;
pub mod eval;
pub mod fetch;
pub mod kind;
pub mod resolver;
pub mod resources;
pub mod uri;

pub use archive::{Archive, SourceTree};
pub use artifact::SourceArtifact;
pub use compile::{
    ArchiveCompiler, CommandCompiler, CompilationError, CompileCache, Compiler, Diagnostic,
    SourceLookup,
};
pub use config::{ConfigError, LoaderConfig};
pub use error::{ExecutionError, LoaderError, LoaderResult};
pub use eval::{EvaluationTracker, HostRuntime, ModuleLoader};
pub use fetch::UrlOpener;
pub use kind::{ArtifactKind, SuffixConvention};
pub use resolver::Resolver;
pub use resources::{
    DirResources, MemoryResources, ResourceProvider, ResourceSpace, ResourceStream, ZipResources,
};
