// SPDX-License-Identifier: GPL-3.0-only

//! Command execution seam
//!
//! Status queries are captured and validated through
//! [`CommandOutcome::into_report`]; mutating commands run attached to the
//! terminal so `bioctl` can prompt for the passphrase.

use std::fmt;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};

use tracing::debug;
use which::which;

use crate::error::{Result, SysError};

/// Program name plus arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.args.is_empty() {
            f.write_str(&self.program)
        } else {
            write!(f, "{} {}", self.program, self.args.join(" "))
        }
    }
}

/// Exit status of a finished command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandStatus {
    /// Exit code, `None` when the process was killed by a signal
    pub code: Option<i32>,
}

impl CommandStatus {
    pub const SUCCESS: Self = Self { code: Some(0) };

    pub fn exited(code: i32) -> Self {
        Self { code: Some(code) }
    }

    pub fn success(self) -> bool {
        self.code == Some(0)
    }
}

impl From<ExitStatus> for CommandStatus {
    fn from(status: ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

impl fmt::Display for CommandStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit code {code}"),
            None => f.write_str("terminated by signal"),
        }
    }
}

/// Captured result of a status query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    pub command: String,
    pub status: CommandStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutcome {
    /// Stdout and stderr joined, for diagnostics.
    pub fn combined(&self) -> String {
        let mut output = self.stdout.clone();
        if !self.stderr.is_empty() {
            if !output.is_empty() && !output.ends_with('\n') {
                output.push('\n');
            }
            output.push_str(&self.stderr);
        }
        output
    }

    /// Stdout of a successful query.
    ///
    /// A nonzero exit is a failure, and so is any text on stderr even when
    /// the exit status is zero: the report is then likely partial.
    pub fn into_report(self) -> Result<String> {
        if !self.status.success() {
            let output = self.combined();
            return Err(SysError::CommandFailed {
                command: self.command,
                status: self.status,
                output,
            });
        }

        if !self.stderr.trim().is_empty() {
            return Err(SysError::UnexpectedStderr {
                command: self.command,
                stderr: self.stderr.trim().to_string(),
            });
        }

        Ok(self.stdout)
    }
}

/// Runs external commands on behalf of the probes and the orchestrator
pub trait CommandRunner {
    /// Run a read-only query, capturing its output.
    fn capture(&self, spec: &CommandSpec) -> Result<CommandOutcome>;

    /// Run a mutating command with the terminal attached and wait for it.
    fn run_interactive(&self, spec: &CommandSpec) -> Result<CommandStatus>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn capture(&self, spec: &CommandSpec) -> Result<CommandOutcome> {
        (**self).capture(spec)
    }

    fn run_interactive(&self, spec: &CommandSpec) -> Result<CommandStatus> {
        (**self).run_interactive(spec)
    }
}

/// Runs commands on the host with `std::process`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    fn binary(program: &str) -> Result<PathBuf> {
        which(program).map_err(|_| SysError::ToolNotFound(program.to_string()))
    }
}

impl CommandRunner for SystemRunner {
    fn capture(&self, spec: &CommandSpec) -> Result<CommandOutcome> {
        let binary = Self::binary(&spec.program)?;
        debug!("Running {}", spec);

        let output = Command::new(binary)
            .args(&spec.args)
            .stdin(Stdio::null())
            .output()?;

        Ok(CommandOutcome {
            command: spec.to_string(),
            status: output.status.into(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    fn run_interactive(&self, spec: &CommandSpec) -> Result<CommandStatus> {
        let binary = Self::binary(&spec.program)?;
        debug!("Running {} on the terminal", spec);

        let status = Command::new(binary)
            .args(&spec.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()?;

        Ok(status.into())
    }
}
