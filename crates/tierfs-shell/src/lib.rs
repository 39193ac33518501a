#![warn(missing_docs)]

//! TierFS shell: named commands over the client file system operations

pub mod command;
pub mod commands;
pub mod error;

#[cfg(test)]
pub(crate) mod fake;

pub use command::{CommandTable, Shell, ShellCommand};
pub use error::{Result, ShellError};
