//! Executing modules in an external process.

use std::io::Write;
use std::process::{Command, Stdio};

use quire_loader::{ExecutionError, HostRuntime, ModuleLoader, SourceArtifact};
use tracing::debug;

/// Pipes each module to a runtime command (e.g. `node`) on stdin.
///
/// The child shares our stdout and stderr. Nested loads happen inside the
/// child, so `loader` is not used.
#[derive(Debug, Clone)]
pub struct CommandRuntime {
    program: String,
    args: Vec<String>,
}

impl CommandRuntime {
    /// Split a command line on whitespace. `None` if it is blank.
    pub fn parse(command_line: &str) -> Option<Self> {
        let mut words = command_line.split_whitespace();
        let program = words.next()?.to_string();
        Some(Self {
            program,
            args: words.map(str::to_string).collect(),
        })
    }
}

impl HostRuntime for CommandRuntime {
    fn execute(
        &self,
        artifact: &SourceArtifact,
        _loader: &dyn ModuleLoader,
    ) -> Result<(), ExecutionError> {
        debug!(program = %self.program, module = artifact.uri(), "starting runtime");
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|e| format!("failed to start runtime '{}': {}", self.program, e))?;

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(artifact.bytes()) {
                debug!(error = %e, "runtime closed stdin early");
            }
        }

        let status = child.wait()?;
        if !status.success() {
            return Err(format!("runtime '{}' exited with {}", self.program, status).into());
        }
        Ok(())
    }
}
