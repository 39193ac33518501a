use std::io::Write;

use tierfs_client::options::{FreeOptions, LoadMetadataOptions, SetAttributeOptions};
use tierfs_client::{FileSystem, TierUri};

use super::{parse_path, print};
use crate::command::ShellCommand;
use crate::error::{Result, ShellError};

/// `free <path>`: evicts the path and everything below it from the cache tier.
pub struct FreeCommand;

impl ShellCommand for FreeCommand {
    fn name(&self) -> &'static str {
        "free"
    }

    fn expected_arg_count(&self) -> usize {
        1
    }

    fn usage(&self) -> &'static str {
        "free <path>"
    }

    fn run(&self, args: &[String], fs: &dyn FileSystem, out: &mut dyn Write) -> Result<()> {
        let path = parse_path(self.name(), &args[0])?;
        fs.free(&path, Some(FreeOptions::DEFAULT.with_recursive(true)))
            .map_err(|e| ShellError::failed(self.name(), e))?;
        print(
            out,
            self.name(),
            format!("{} was successfully freed from memory.", path),
        )
    }
}

/// `loadMetadata <path>`
pub struct LoadMetadataCommand;

impl ShellCommand for LoadMetadataCommand {
    fn name(&self) -> &'static str {
        "loadMetadata"
    }

    fn expected_arg_count(&self) -> usize {
        1
    }

    fn usage(&self) -> &'static str {
        "loadMetadata <path>"
    }

    fn run(&self, args: &[String], fs: &dyn FileSystem, out: &mut dyn Write) -> Result<()> {
        let path = parse_path(self.name(), &args[0])?;
        let options = LoadMetadataOptions::DEFAULT.with_recursive(true);
        fs.load_metadata(&path, Some(options))
            .map_err(|e| ShellError::failed(self.name(), e))?;
        print(out, self.name(), format!("Loaded metadata for {}", path))
    }
}

fn set_attribute(
    command: &str,
    path: &TierUri,
    options: SetAttributeOptions,
    fs: &dyn FileSystem,
) -> Result<()> {
    fs.set_attribute(path, Some(options))
        .map_err(|e| ShellError::failed(command, e))
}

/// `pin <path>`: keeps the file in the cache tier.
pub struct PinCommand;

impl ShellCommand for PinCommand {
    fn name(&self) -> &'static str {
        "pin"
    }

    fn expected_arg_count(&self) -> usize {
        1
    }

    fn usage(&self) -> &'static str {
        "pin <path>"
    }

    fn run(&self, args: &[String], fs: &dyn FileSystem, out: &mut dyn Write) -> Result<()> {
        let path = parse_path(self.name(), &args[0])?;
        set_attribute(
            self.name(),
            &path,
            SetAttributeOptions::DEFAULT.with_pinned(true),
            fs,
        )?;
        print(
            out,
            self.name(),
            format!("File '{}' was successfully pinned.", path),
        )
    }
}

/// `unpin <path>`
pub struct UnpinCommand;

impl ShellCommand for UnpinCommand {
    fn name(&self) -> &'static str {
        "unpin"
    }

    fn expected_arg_count(&self) -> usize {
        1
    }

    fn usage(&self) -> &'static str {
        "unpin <path>"
    }

    fn run(&self, args: &[String], fs: &dyn FileSystem, out: &mut dyn Write) -> Result<()> {
        let path = parse_path(self.name(), &args[0])?;
        set_attribute(
            self.name(),
            &path,
            SetAttributeOptions::DEFAULT.with_pinned(false),
            fs,
        )?;
        print(
            out,
            self.name(),
            format!("File '{}' was successfully unpinned.", path),
        )
    }
}

/// `setTtl <path> <ttlMs>`
pub struct SetTtlCommand;

impl ShellCommand for SetTtlCommand {
    fn name(&self) -> &'static str {
        "setTtl"
    }

    fn expected_arg_count(&self) -> usize {
        2
    }

    fn usage(&self) -> &'static str {
        "setTtl <path> <ttlMs>"
    }

    fn run(&self, args: &[String], fs: &dyn FileSystem, out: &mut dyn Write) -> Result<()> {
        let path = parse_path(self.name(), &args[0])?;
        let ttl: u64 = args[1].parse().map_err(|_| {
            ShellError::failed(
                self.name(),
                format!("TTL must be a non-negative number of milliseconds, got '{}'", args[1]),
            )
        })?;
        set_attribute(
            self.name(),
            &path,
            SetAttributeOptions::DEFAULT.with_ttl(Some(ttl)),
            fs,
        )?;
        print(
            out,
            self.name(),
            format!(
                "TTL of file '{}' was successfully set to {} milliseconds.",
                path, ttl
            ),
        )
    }
}

/// `unsetTtl <path>`
pub struct UnsetTtlCommand;

impl ShellCommand for UnsetTtlCommand {
    fn name(&self) -> &'static str {
        "unsetTtl"
    }

    fn expected_arg_count(&self) -> usize {
        1
    }

    fn usage(&self) -> &'static str {
        "unsetTtl <path>"
    }

    fn run(&self, args: &[String], fs: &dyn FileSystem, out: &mut dyn Write) -> Result<()> {
        let path = parse_path(self.name(), &args[0])?;
        set_attribute(
            self.name(),
            &path,
            SetAttributeOptions::DEFAULT.with_ttl(None),
            fs,
        )?;
        print(
            out,
            self.name(),
            format!("TTL of file '{}' was successfully removed.", path),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tierfs_client::options::SetAttributeOptions;

    use crate::commands::test_util::run;
    use crate::error::ShellError;
    use crate::fake::FakeFs;

    #[test]
    fn test_free_and_load_metadata_are_recursive() {
        let fs = Arc::new(FakeFs::new());
        let (result, out) = run(&fs, &["free", "/cold"]);
        result.unwrap();
        assert_eq!(out, "/cold was successfully freed from memory.\n");
        run(&fs, &["loadMetadata", "/ufs/only"]).0.unwrap();
        assert_eq!(
            fs.calls(),
            vec![
                "free /cold recursive=true",
                "load_metadata /ufs/only recursive=true"
            ]
        );
    }

    #[test]
    fn test_pin_and_unpin_touch_only_pinned() {
        let fs = Arc::new(FakeFs::new());
        run(&fs, &["pin", "/hot"]).0.unwrap();
        let (result, out) = run(&fs, &["unpin", "/hot"]);
        result.unwrap();
        assert_eq!(out, "File '/hot' was successfully unpinned.\n");
        assert_eq!(
            fs.attributes(),
            vec![
                SetAttributeOptions::DEFAULT.with_pinned(true),
                SetAttributeOptions::DEFAULT.with_pinned(false),
            ]
        );
    }

    #[test]
    fn test_set_and_unset_ttl() {
        let fs = Arc::new(FakeFs::new());
        let (result, out) = run(&fs, &["setTtl", "/tmp/x", "60000"]);
        result.unwrap();
        assert_eq!(
            out,
            "TTL of file '/tmp/x' was successfully set to 60000 milliseconds.\n"
        );
        run(&fs, &["unsetTtl", "/tmp/x"]).0.unwrap();
        let attributes = fs.attributes();
        assert_eq!(attributes[0].ttl, Some(Some(60000)));
        assert_eq!(attributes[1].ttl, Some(None));
        assert_eq!(attributes[1].pinned, None);
    }

    #[test]
    fn test_set_ttl_rejects_garbage() {
        let fs = Arc::new(FakeFs::new());
        let (result, _) = run(&fs, &["setTtl", "/tmp/x", "-5"]);
        assert!(matches!(result.unwrap_err(), ShellError::Failed { ref command, .. } if command == "setTtl"));
        assert!(fs.calls().is_empty());
    }
}
