use std::io::{self, Write};

use tierfs_client::{FileSystem, UriStatus};

use super::{parse_path, print};
use crate::command::ShellCommand;
use crate::error::{Result, ShellError};

fn memory_label(status: &UriStatus) -> &'static str {
    if status.folder {
        "directory"
    } else if status.in_memory_percentage == 100 {
        "In Memory"
    } else {
        "Not In Memory"
    }
}

fn format_entry(status: &UriStatus) -> String {
    let size = if status.folder {
        "-".to_string()
    } else {
        status.length.to_string()
    };
    format!("{:>12}  {:<15}{}", size, memory_label(status), status.path)
}

/// `ls <path>`: one line per child of a directory, or the file itself.
pub struct LsCommand;

impl ShellCommand for LsCommand {
    fn name(&self) -> &'static str {
        "ls"
    }

    fn expected_arg_count(&self) -> usize {
        1
    }

    fn usage(&self) -> &'static str {
        "ls <path>"
    }

    fn run(&self, args: &[String], fs: &dyn FileSystem, out: &mut dyn Write) -> Result<()> {
        let path = parse_path(self.name(), &args[0])?;
        let mut entries = fs
            .list_status(&path, None)
            .map_err(|e| ShellError::failed(self.name(), e))?;
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        for status in &entries {
            print(out, self.name(), format_entry(status))?;
        }
        Ok(())
    }
}

/// `stat <path>`
pub struct StatCommand;

impl ShellCommand for StatCommand {
    fn name(&self) -> &'static str {
        "stat"
    }

    fn expected_arg_count(&self) -> usize {
        1
    }

    fn usage(&self) -> &'static str {
        "stat <path>"
    }

    fn run(&self, args: &[String], fs: &dyn FileSystem, out: &mut dyn Write) -> Result<()> {
        let path = parse_path(self.name(), &args[0])?;
        let status = fs
            .get_status(&path, None)
            .map_err(|e| ShellError::failed(self.name(), e))?;
        let kind = if status.folder { "directory" } else { "file" };
        let ttl = status
            .ttl
            .map_or_else(|| "none".to_string(), |ms| format!("{} ms", ms));
        let lines = [
            format!("{} is a {} path.", path, kind),
            format!("  id:        {}", status.file_id),
            format!("  length:    {}", status.length),
            format!("  blockSize: {}", status.block_size_bytes),
            format!("  pinned:    {}", status.pinned),
            format!("  persisted: {}", status.persisted),
            format!("  inMemory:  {}%", status.in_memory_percentage),
            format!("  ttl:       {}", ttl),
        ];
        for line in lines {
            print(out, self.name(), line)?;
        }
        Ok(())
    }
}

/// `cat <path>`: copies a file's bytes to the output.
pub struct CatCommand;

impl ShellCommand for CatCommand {
    fn name(&self) -> &'static str {
        "cat"
    }

    fn expected_arg_count(&self) -> usize {
        1
    }

    fn usage(&self) -> &'static str {
        "cat <path>"
    }

    fn run(&self, args: &[String], fs: &dyn FileSystem, out: &mut dyn Write) -> Result<()> {
        let path = parse_path(self.name(), &args[0])?;
        let mut stream = fs
            .open_file(&path, None)
            .map_err(|e| ShellError::failed(self.name(), e))?;
        io::copy(&mut stream, &mut *out).map_err(|e| ShellError::failed(self.name(), e))?;
        Ok(())
    }
}

/// `exists <path>`
pub struct ExistsCommand;

impl ShellCommand for ExistsCommand {
    fn name(&self) -> &'static str {
        "exists"
    }

    fn expected_arg_count(&self) -> usize {
        1
    }

    fn usage(&self) -> &'static str {
        "exists <path>"
    }

    fn run(&self, args: &[String], fs: &dyn FileSystem, out: &mut dyn Write) -> Result<()> {
        let path = parse_path(self.name(), &args[0])?;
        let found = fs
            .exists(&path, None)
            .map_err(|e| ShellError::failed(self.name(), e))?;
        if found {
            print(out, self.name(), format!("{} exists", path))
        } else {
            print(out, self.name(), format!("{} does not exist", path))
        }
    }
}
