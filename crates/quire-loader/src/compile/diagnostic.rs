//! Compiler diagnostics
//!
//! Compilers report problems as text, one diagnostic per line:
//!
//! ```text
//! .atomist/editors/MyEditor1.ts(4,23): error TS2304: Cannot find name 'Test'.
//!         let bla = new Test();
//!                       ^
//! ```
//!
//! Lines that do not start a new diagnostic (source snippets, carets) are kept
//! as notes on the one before them. Some compile hosts wrap each message in
//! `<#>` sentinels; those are removed before anything else.

use std::fmt;

use thiserror::Error;

const MARKER: &str = "<#>";

/// One parsed compiler message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub file: Option<String>,
    pub line: Option<u32>,
    pub column: Option<u32>,
    /// `error`, `warning`, ...
    pub category: String,
    /// Compiler-specific code such as `TS2304`
    pub code: Option<String>,
    pub message: String,
    /// Continuation lines printed after the message
    pub notes: Vec<String>,
}

impl Diagnostic {
    /// Parse the first line of a diagnostic. `None` if `line` does not start one.
    pub fn parse(line: &str) -> Option<Diagnostic> {
        let (file, line_no, column, rest) = match split_location(line) {
            Some((file, line_no, column, rest)) => (Some(file), Some(line_no), Some(column), rest),
            None => (None, None, None, line),
        };

        let (category, rest) = rest.split_once(' ')?;
        if !matches!(category, "error" | "warning" | "message" | "suggestion") {
            return None;
        }

        let (code, message) = match rest.split_once(": ") {
            Some((code, message)) if !code.is_empty() && !code.contains(char::is_whitespace) => {
                (Some(code.to_string()), message)
            }
            _ => (None, rest.strip_prefix(": ").unwrap_or(rest)),
        };

        Some(Diagnostic {
            file: file.map(str::to_string),
            line: line_no,
            column,
            category: category.to_string(),
            code,
            message: message.to_string(),
            notes: Vec::new(),
        })
    }

    pub fn is_error(&self) -> bool {
        self.category == "error"
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(file) = &self.file {
            write!(f, "{}", file)?;
            if let (Some(line), Some(column)) = (self.line, self.column) {
                write!(f, "({},{})", line, column)?;
            }
            write!(f, ": ")?;
        }
        write!(f, "{}", self.category)?;
        if let Some(code) = &self.code {
            write!(f, " {}", code)?;
        }
        write!(f, ": {}", self.message)
    }
}

/// `file(line,col): rest` → its parts.
fn split_location(line: &str) -> Option<(&str, u32, u32, &str)> {
    let close = line.find("): ")?;
    let head = &line[..close];
    let open = head.rfind('(')?;
    let (line_no, column) = head[open + 1..].split_once(',')?;
    let line_no = line_no.trim().parse().ok()?;
    let column = column.trim().parse().ok()?;
    if open == 0 {
        return None;
    }
    Some((&head[..open], line_no, column, &line[close + 3..]))
}

/// A compiler rejected a source module.
///
/// Displays the compiler's own output, so users see exactly what the compiler said.
#[derive(Debug, Clone, Error)]
#[error("{output}")]
pub struct CompilationError {
    source_name: String,
    output: String,
    diagnostics: Vec<Diagnostic>,
}

impl CompilationError {
    /// An error with a plain message and no parsed diagnostics.
    pub fn new(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            output: message.into(),
            diagnostics: Vec::new(),
        }
    }

    /// Build an error from raw compiler output.
    pub fn from_output(source_name: impl Into<String>, output: &str) -> Self {
        let output = output.replace(MARKER, "");
        let output = output.trim_end().to_string();

        let mut diagnostics: Vec<Diagnostic> = Vec::new();
        for line in output.lines() {
            match Diagnostic::parse(line) {
                Some(diagnostic) => diagnostics.push(diagnostic),
                None => {
                    if let Some(last) = diagnostics.last_mut() {
                        last.notes.push(line.to_string());
                    }
                }
            }
        }

        Self {
            source_name: source_name.into(),
            output,
            diagnostics,
        }
    }

    /// Combine errors from several sources into one, in the order given.
    /// `None` if there is nothing to combine.
    pub fn merge(errors: impl IntoIterator<Item = CompilationError>) -> Option<Self> {
        let mut errors = errors.into_iter();
        let mut merged = errors.next()?;
        for error in errors {
            merged.source_name.push_str(", ");
            merged.source_name.push_str(&error.source_name);
            merged.output.push_str("\n\n");
            merged.output.push_str(&error.output);
            merged.diagnostics.extend(error.diagnostics);
        }
        Some(merged)
    }

    /// The source (or comma-separated sources, after a merge) that failed.
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Compiler output, sentinels removed.
    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BROKEN: &str = "<#>.atomist/editors/MyEditor1.ts(4,23): error TS2304: Cannot find name 'Test'.\n        let bla = new Test();\n                      ^\n<#>";

    #[test]
    fn test_parse_located_diagnostic() {
        let d = Diagnostic::parse(
            ".atomist/editors/MyEditor1.ts(4,23): error TS2304: Cannot find name 'Test'.",
        )
        .unwrap();
        assert_eq!(d.file.as_deref(), Some(".atomist/editors/MyEditor1.ts"));
        assert_eq!(d.line, Some(4));
        assert_eq!(d.column, Some(23));
        assert_eq!(d.category, "error");
        assert_eq!(d.code.as_deref(), Some("TS2304"));
        assert_eq!(d.message, "Cannot find name 'Test'.");
        assert!(d.is_error());
    }

    #[test]
    fn test_parse_global_diagnostic() {
        let d = Diagnostic::parse("error TS5023: Unknown compiler option 'foo'.").unwrap();
        assert!(d.file.is_none());
        assert_eq!(d.code.as_deref(), Some("TS5023"));
        assert_eq!(d.to_string(), "error TS5023: Unknown compiler option 'foo'.");
    }

    #[test]
    fn test_snippet_lines_are_not_diagnostics() {
        assert!(Diagnostic::parse("        let bla = new Test();").is_none());
        assert!(Diagnostic::parse("                      ^").is_none());
    }

    #[test]
    fn test_from_output_strips_markers_and_keeps_notes() {
        let err = CompilationError::from_output(".atomist/editors/MyEditor1.ts", BROKEN);
        assert!(!err.output().contains(MARKER));
        assert!(err.to_string().starts_with(".atomist/editors/MyEditor1.ts(4,23): error TS2304"));

        let diagnostics = err.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].notes.len(), 2);
        assert_eq!(diagnostics[0].notes[0].trim(), "let bla = new Test();");
    }

    #[test]
    fn test_display_round_trips_diagnostic_line() {
        let line = "a.ts(1,5): error TS1005: ';' expected.";
        assert_eq!(Diagnostic::parse(line).unwrap().to_string(), line);
    }

    #[test]
    fn test_merge_keeps_order() {
        let first = CompilationError::from_output("a.ts", "a.ts(1,1): error TS1: first");
        let second = CompilationError::from_output("b.ts", "b.ts(2,2): error TS2: second");
        let merged = CompilationError::merge(vec![first, second]).unwrap();

        assert_eq!(merged.source_name(), "a.ts, b.ts");
        assert_eq!(
            merged.to_string(),
            "a.ts(1,1): error TS1: first\n\nb.ts(2,2): error TS2: second"
        );
        let files: Vec<_> = merged.diagnostics().iter().map(|d| d.file.clone().unwrap()).collect();
        assert_eq!(files, vec!["a.ts", "b.ts"]);
    }

    #[test]
    fn test_merge_nothing() {
        assert!(CompilationError::merge(Vec::new()).is_none());
    }
}
