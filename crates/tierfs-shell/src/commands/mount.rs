use std::io::Write;

use tierfs_client::FileSystem;

use super::{parse_path, print};
use crate::command::ShellCommand;
use crate::error::{Result, ShellError};

/// `mount <path> <ufsPath>`: attaches an under storage location at a
/// namespace path.
pub struct MountCommand;

impl ShellCommand for MountCommand {
    fn name(&self) -> &'static str {
        "mount"
    }

    fn expected_arg_count(&self) -> usize {
        2
    }

    fn usage(&self) -> &'static str {
        "mount <path> <ufsPath>"
    }

    fn run(&self, args: &[String], fs: &dyn FileSystem, out: &mut dyn Write) -> Result<()> {
        let path = parse_path(self.name(), &args[0])?;
        let ufs_path = parse_path(self.name(), &args[1])?;
        fs.mount(&path, &ufs_path, None)
            .map_err(|e| ShellError::failed(self.name(), e))?;
        print(out, self.name(), format!("Mounted {} at {}", ufs_path, path))
    }
}

/// `unmount <path>`
pub struct UnmountCommand;

impl ShellCommand for UnmountCommand {
    fn name(&self) -> &'static str {
        "unmount"
    }

    fn expected_arg_count(&self) -> usize {
        1
    }

    fn usage(&self) -> &'static str {
        "unmount <path>"
    }

    fn run(&self, args: &[String], fs: &dyn FileSystem, out: &mut dyn Write) -> Result<()> {
        let path = parse_path(self.name(), &args[0])?;
        fs.unmount(&path, None)
            .map_err(|e| ShellError::failed(self.name(), e))?;
        print(out, self.name(), format!("Unmounted {}", path))
    }
}
