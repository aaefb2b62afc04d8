//! Command execution for pipeline stages.
//!
//! Stages are planned as [`CommandSpec`] data before anything runs, so the
//! plan can be inspected, tested, and printed by `--dry-run`. Child output
//! streams straight to the terminal like any CI runner.

use std::fmt;
use std::io::Write;
use std::process::{Command, ExitStatus, Stdio};

/// A fully planned external command.
#[derive(Clone, Debug, PartialEq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Payload written to the child's stdin. Used to hand the registry
    /// password to `docker login --password-stdin` so it never reaches argv.
    pub stdin: Option<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| (*a).to_string()).collect(),
            stdin: None,
        }
    }

    pub fn with_stdin(mut self, payload: impl Into<String>) -> Self {
        self.stdin = Some(payload.into());
        self
    }
}

impl fmt::Display for CommandSpec {
    /// Render the command line for logs and dry-run output. The stdin
    /// payload is never shown.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        if self.stdin.is_some() {
            write!(f, "  [stdin: redacted]")?;
        }
        Ok(())
    }
}

/// Run a command to completion, feeding its stdin when a payload is set.
pub fn run(spec: &CommandSpec) -> std::io::Result<ExitStatus> {
    let mut command = Command::new(&spec.program);
    command.args(&spec.args);
    command.stdin(if spec.stdin.is_some() {
        Stdio::piped()
    } else {
        Stdio::null()
    });

    let mut child = command.spawn()?;

    if let Some(payload) = &spec.stdin
        && let Some(mut stdin) = child.stdin.take()
    {
        stdin.write_all(payload.as_bytes())?;
        // Dropping the handle closes the pipe so the child sees EOF.
    }

    child.wait()
}
