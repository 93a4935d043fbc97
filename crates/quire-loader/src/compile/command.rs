//! External compiler processes
//!
//! Runs a transpiler as a child process: the source text goes in on stdin and
//! the compiled text comes back on stdout. A `{file}` argument is replaced by
//! the source name, so the compiler can name the file in its diagnostics.

use std::io::Write;
use std::process::{Command, Stdio};
use std::thread;

use tracing::debug;

use super::{CompilationError, Compiler, SourceLookup};

const FILE_PLACEHOLDER: &str = "{file}";

/// A [`Compiler`] backed by an external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandCompiler {
    program: String,
    args: Vec<String>,
}

impl CommandCompiler {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append an argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Split a command line on whitespace. No quoting.
    pub fn parse(command_line: &str) -> Option<Self> {
        let mut words = command_line.split_whitespace();
        let program = words.next()?;
        Some(Self {
            program: program.to_string(),
            args: words.map(str::to_string).collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Compiler for CommandCompiler {
    fn compile(
        &self,
        source_name: &str,
        sources: &dyn SourceLookup,
    ) -> Result<String, CompilationError> {
        let source = match sources.source_for(source_name, None) {
            Ok(Some(source)) => source,
            Ok(None) => {
                return Err(CompilationError::new(
                    source_name,
                    format!("cannot find source {}", source_name),
                ))
            }
            Err(e) => return Err(CompilationError::new(source_name, e.to_string())),
        };

        let args: Vec<String> = self
            .args
            .iter()
            .map(|arg| arg.replace(FILE_PLACEHOLDER, source_name))
            .collect();
        debug!(program = %self.program, ?args, source = source_name, "spawning compiler");

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                CompilationError::new(
                    source_name,
                    format!("failed to run compiler '{}': {}", self.program, e),
                )
            })?;

        // Feed stdin from another thread so a chatty compiler cannot deadlock us.
        let writer = child.stdin.take().map(|mut stdin| {
            let text = source.clone();
            thread::spawn(move || stdin.write_all(text.bytes()))
        });

        let output = child.wait_with_output().map_err(|e| {
            CompilationError::new(
                source_name,
                format!("failed to wait for compiler '{}': {}", self.program, e),
            )
        })?;

        if let Some(writer) = writer {
            if let Ok(Err(e)) = writer.join() {
                debug!(error = %e, "compiler closed stdin early");
            }
        }

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if output.status.success() {
            return Ok(stdout);
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let text = if !stderr.trim().is_empty() {
            stderr.into_owned()
        } else if !stdout.trim().is_empty() {
            stdout
        } else {
            format!("compiler '{}' failed with {}", self.program, output.status)
        };
        Err(CompilationError::from_output(source_name, &text))
    }
}
