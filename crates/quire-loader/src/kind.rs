//! Artifact kinds and the suffix convention that maps between them.

/// What a specifier asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// Higher-level source that has to be compiled before it can run
    Source,
    /// Executable output, possibly produced on demand from a source
    Compiled,
    /// Anything else (data files, declarations)
    Other,
}

/// Maps executable names to their source counterparts and back.
///
/// Only the trailing suffix is ever rewritten, so `lib.js/util.js` maps to
/// `lib.js/util.ts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuffixConvention {
    compiled: String,
    source: String,
}

impl SuffixConvention {
    pub fn new(compiled: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            compiled: compiled.into(),
            source: source.into(),
        }
    }

    pub fn compiled_suffix(&self) -> &str {
        &self.compiled
    }

    pub fn source_suffix(&self) -> &str {
        &self.source
    }

    pub fn kind_of(&self, specifier: &str) -> ArtifactKind {
        if specifier.ends_with(&self.compiled) {
            ArtifactKind::Compiled
        } else if specifier.ends_with(&self.source) {
            ArtifactKind::Source
        } else {
            ArtifactKind::Other
        }
    }

    /// `a/b.js` → `a/b.ts`. `None` unless `specifier` is compiled-form.
    pub fn source_counterpart(&self, specifier: &str) -> Option<String> {
        let stem = specifier.strip_suffix(self.compiled.as_str())?;
        Some(format!("{}{}", stem, self.source))
    }

    /// `a/b.ts` → `a/b.js`. `None` unless `specifier` is source-form.
    pub fn compiled_counterpart(&self, specifier: &str) -> Option<String> {
        let stem = specifier.strip_suffix(self.source.as_str())?;
        Some(format!("{}{}", stem, self.compiled))
    }
}

impl Default for SuffixConvention {
    fn default() -> Self {
        Self::new(".js", ".ts")
    }
}
