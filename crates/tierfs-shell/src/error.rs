//! Shell error type.

use thiserror::Error;

/// Errors returned by [`crate::Shell::execute`].
#[derive(Debug, Error)]
pub enum ShellError {
    /// No command is registered under this name.
    #[error("{0} is an unknown command")]
    UnknownCommand(String),

    /// Argument count did not match; the command was not run.
    #[error("{command} takes {expected} argument(s), not {got}")]
    WrongArgCount {
        /// Command name as typed.
        command: String,
        /// Arguments the command takes.
        expected: usize,
        /// Arguments given.
        got: usize,
    },

    /// Any failure while running a command, reduced to its message.
    #[error("{command}: {message}")]
    Failed {
        /// Command name as typed.
        command: String,
        /// Display text of the underlying error.
        message: String,
    },
}

impl ShellError {
    /// Wraps any displayable failure of `command`.
    pub fn failed(command: &str, err: impl std::fmt::Display) -> Self {
        ShellError::Failed {
            command: command.to_string(),
            message: err.to_string(),
        }
    }
}

/// Result type for shell commands.
pub type Result<T> = std::result::Result<T, ShellError>;
