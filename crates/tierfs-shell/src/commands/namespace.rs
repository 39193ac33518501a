use std::io::Write;

use tierfs_client::options::{CreateDirectoryOptions, DeleteOptions};
use tierfs_client::FileSystem;

use super::{parse_path, print};
use crate::command::ShellCommand;
use crate::error::{Result, ShellError};

/// `mkdir <path>`: creates a directory and any missing parents.
pub struct MkdirCommand;

impl ShellCommand for MkdirCommand {
    fn name(&self) -> &'static str {
        "mkdir"
    }

    fn expected_arg_count(&self) -> usize {
        1
    }

    fn usage(&self) -> &'static str {
        "mkdir <path>"
    }

    fn run(&self, args: &[String], fs: &dyn FileSystem, out: &mut dyn Write) -> Result<()> {
        let path = parse_path(self.name(), &args[0])?;
        let options = CreateDirectoryOptions::DEFAULT.with_recursive(true);
        fs.create_directory(&path, Some(options))
            .map_err(|e| ShellError::failed(self.name(), e))?;
        print(out, self.name(), format!("Successfully created directory {}", path))
    }
}

/// `touch <path>`: creates an empty file.
pub struct TouchCommand;

impl ShellCommand for TouchCommand {
    fn name(&self) -> &'static str {
        "touch"
    }

    fn expected_arg_count(&self) -> usize {
        1
    }

    fn usage(&self) -> &'static str {
        "touch <path>"
    }

    fn run(&self, args: &[String], fs: &dyn FileSystem, out: &mut dyn Write) -> Result<()> {
        let path = parse_path(self.name(), &args[0])?;
        let stream = fs
            .create_file(&path, None)
            .map_err(|e| ShellError::failed(self.name(), e))?;
        stream
            .close()
            .map_err(|e| ShellError::failed(self.name(), e))?;
        print(out, self.name(), format!("{} has been created", path))
    }
}

fn remove(
    command: &str,
    recursive: bool,
    args: &[String],
    fs: &dyn FileSystem,
    out: &mut dyn Write,
) -> Result<()> {
    let path = parse_path(command, &args[0])?;
    let options = DeleteOptions::DEFAULT.with_recursive(recursive);
    fs.delete(&path, Some(options))
        .map_err(|e| ShellError::failed(command, e))?;
    print(out, command, format!("{} has been removed", path))
}

/// `rm <path>`: removes a file or an empty directory.
pub struct RmCommand;

impl ShellCommand for RmCommand {
    fn name(&self) -> &'static str {
        "rm"
    }

    fn expected_arg_count(&self) -> usize {
        1
    }

    fn usage(&self) -> &'static str {
        "rm <path>"
    }

    fn run(&self, args: &[String], fs: &dyn FileSystem, out: &mut dyn Write) -> Result<()> {
        remove(self.name(), false, args, fs, out)
    }
}

/// `rmr <path>`: removes a path and everything below it.
pub struct RmrCommand;

impl ShellCommand for RmrCommand {
    fn name(&self) -> &'static str {
        "rmr"
    }

    fn expected_arg_count(&self) -> usize {
        1
    }

    fn usage(&self) -> &'static str {
        "rmr <path>"
    }

    fn run(&self, args: &[String], fs: &dyn FileSystem, out: &mut dyn Write) -> Result<()> {
        remove(self.name(), true, args, fs, out)
    }
}

/// `mv <src> <dst>`
pub struct MvCommand;

impl ShellCommand for MvCommand {
    fn name(&self) -> &'static str {
        "mv"
    }

    fn expected_arg_count(&self) -> usize {
        2
    }

    fn usage(&self) -> &'static str {
        "mv <src> <dst>"
    }

    fn run(&self, args: &[String], fs: &dyn FileSystem, out: &mut dyn Write) -> Result<()> {
        let src = parse_path(self.name(), &args[0])?;
        let dst = parse_path(self.name(), &args[1])?;
        fs.rename(&src, &dst, None)
            .map_err(|e| ShellError::failed(self.name(), e))?;
        print(out, self.name(), format!("Renamed {} to {}", src, dst))
    }
}
