// SPDX-License-Identifier: GPL-3.0-only

use cryptmount_types::{DiskSpec, IllegalTransition, Transition};
use thiserror::Error;

use crate::command::CommandStatus;

/// Error types for system-level operations
#[derive(Error, Debug)]
pub enum SysError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("command not found: {0}")]
    ToolNotFound(String),

    #[error("command {command:?} failed ({status}): {output}")]
    CommandFailed {
        command: String,
        status: CommandStatus,
        output: String,
    },

    #[error("command {command:?} reported errors: {stderr}")]
    UnexpectedStderr { command: String, stderr: String },

    #[error("malformed report from {command:?}: {report:?}")]
    MalformedReport { command: String, report: String },

    #[error("DUID {duid} is reported by both {first} and {second}")]
    DuplicateDuid {
        duid: String,
        first: String,
        second: String,
    },

    #[error("disk not present: {0}")]
    DiskNotPresent(DiskSpec),

    #[error("{transition}: command {command:?} failed ({status})")]
    StageFailed {
        transition: Transition,
        command: String,
        status: CommandStatus,
    },

    #[error(transparent)]
    IllegalTransition(#[from] IllegalTransition),
}

impl SysError {
    /// True when the failure is a required disk that is not plugged in,
    /// as opposed to a broken command or environment.
    pub fn is_absence(&self) -> bool {
        matches!(self, Self::DiskNotPresent(_))
    }
}

/// Result type alias for system operations
pub type Result<T> = std::result::Result<T, SysError>;
