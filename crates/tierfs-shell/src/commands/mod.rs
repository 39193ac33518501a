//! Built-in shell commands.
//!
//! Each command parses its arguments into [`TierUri`]s, makes one file
//! system call and prints a confirmation line. Any failure, including a bad
//! path argument, comes back as [`ShellError::Failed`].

mod inspect;
mod mount;
mod namespace;
mod tiering;

use std::fmt::Display;
use std::io::Write;

use tierfs_client::TierUri;

use crate::command::ShellCommand;
use crate::error::{Result, ShellError};

pub use inspect::{CatCommand, ExistsCommand, LsCommand, StatCommand};
pub use mount::{MountCommand, UnmountCommand};
pub use namespace::{MkdirCommand, MvCommand, RmCommand, RmrCommand, TouchCommand};
pub use tiering::{
    FreeCommand, LoadMetadataCommand, PinCommand, SetTtlCommand, UnpinCommand, UnsetTtlCommand,
};

/// Every built-in command, boxed for a [`crate::CommandTable`].
pub fn builtins() -> Vec<Box<dyn ShellCommand>> {
    vec![
        Box::new(MkdirCommand),
        Box::new(TouchCommand),
        Box::new(RmCommand),
        Box::new(RmrCommand),
        Box::new(MvCommand),
        Box::new(LsCommand),
        Box::new(StatCommand),
        Box::new(CatCommand),
        Box::new(ExistsCommand),
        Box::new(MountCommand),
        Box::new(UnmountCommand),
        Box::new(FreeCommand),
        Box::new(LoadMetadataCommand),
        Box::new(PinCommand),
        Box::new(UnpinCommand),
        Box::new(SetTtlCommand),
        Box::new(UnsetTtlCommand),
    ]
}

fn parse_path(command: &str, raw: &str) -> Result<TierUri> {
    TierUri::parse(raw).map_err(|e| ShellError::failed(command, e))
}

fn print(out: &mut dyn Write, command: &str, line: impl Display) -> Result<()> {
    writeln!(out, "{}", line).map_err(|e| ShellError::failed(command, e))
}
