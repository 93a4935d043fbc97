//! Loader error types.
//!
//! A module that cannot be found is not an error: lookups return `Ok(None)`.
//! Everything here is a failure the caller has to see.

use std::io;

use thiserror::Error;

use crate::compile::CompilationError;

/// Boxed error raised by a host runtime while executing a module.
pub type ExecutionError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while resolving, compiling, or evaluating a module.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// A reference could not be parsed or normalized into a URI
    #[error("Malformed reference '{reference}': {reason}")]
    MalformedReference { reference: String, reason: String },

    /// A byte provider failed while reading a resource that exists
    #[error("I/O error reading {resource}: {source}")]
    Io {
        resource: String,
        #[source]
        source: io::Error,
    },

    /// The compiler rejected a source module (message is the compiler output)
    #[error(transparent)]
    Compilation(#[from] CompilationError),

    /// The host runtime failed while executing a module
    #[error("Error loading {specifier}: {source}")]
    Load {
        specifier: String,
        #[source]
        source: ExecutionError,
    },
}

impl LoaderError {
    pub(crate) fn io(resource: impl Into<String>, source: io::Error) -> Self {
        LoaderError::Io {
            resource: resource.into(),
            source,
        }
    }

    pub(crate) fn malformed(reference: impl Into<String>, reason: impl ToString) -> Self {
        LoaderError::MalformedReference {
            reference: reference.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result alias used throughout the loader.
pub type LoaderResult<T> = Result<T, LoaderError>;
