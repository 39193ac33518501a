//! Command trait, name lookup table and the shell that drives them.

use std::collections::BTreeMap;
use std::io::Write;
use std::sync::Arc;

use tierfs_client::FileSystem;
use tracing::debug;

use crate::commands;
use crate::error::{Result, ShellError};

/// One named shell command with a fixed number of arguments.
pub trait ShellCommand: Send + Sync {
    /// Name typed on the command line.
    fn name(&self) -> &'static str;

    /// Exact number of arguments after the command name.
    fn expected_arg_count(&self) -> usize;

    /// One-line usage, e.g. `mv <src> <dst>`.
    fn usage(&self) -> &'static str;

    /// Runs the command. `args` has already been checked against
    /// [`ShellCommand::expected_arg_count`].
    fn run(&self, args: &[String], fs: &dyn FileSystem, out: &mut dyn Write) -> Result<()>;
}

/// Commands keyed by name.
#[derive(Default)]
pub struct CommandTable {
    commands: BTreeMap<&'static str, Box<dyn ShellCommand>>,
}

impl CommandTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Table holding every built-in command.
    pub fn with_builtins() -> Self {
        let mut table = Self::new();
        for command in commands::builtins() {
            table.register(command);
        }
        table
    }

    /// Adds a command, replacing any existing one with the same name.
    pub fn register(&mut self, command: Box<dyn ShellCommand>) {
        self.commands.insert(command.name(), command);
    }

    /// Looks a command up by name.
    pub fn get(&self, name: &str) -> Option<&dyn ShellCommand> {
        self.commands.get(name).map(|c| c.as_ref())
    }

    /// Registered commands in name order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn ShellCommand> {
        self.commands.values().map(|c| c.as_ref())
    }

    /// Number of registered commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// True if no command is registered.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Parses an argument vector and runs the named command against a file system.
pub struct Shell {
    fs: Arc<dyn FileSystem>,
    commands: CommandTable,
}

impl Shell {
    /// Shell with the built-in commands.
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self::with_commands(fs, CommandTable::with_builtins())
    }

    /// Shell with a caller-supplied command table.
    pub fn with_commands(fs: Arc<dyn FileSystem>, commands: CommandTable) -> Self {
        Self { fs, commands }
    }

    /// The command table.
    pub fn commands(&self) -> &CommandTable {
        &self.commands
    }

    /// Runs `argv[0]` with the remaining elements as its arguments.
    pub fn execute(&self, argv: &[String], out: &mut dyn Write) -> Result<()> {
        let (name, args) = argv
            .split_first()
            .ok_or_else(|| ShellError::UnknownCommand(String::new()))?;
        let command = self
            .commands
            .get(name)
            .ok_or_else(|| ShellError::UnknownCommand(name.clone()))?;
        if args.len() != command.expected_arg_count() {
            return Err(ShellError::WrongArgCount {
                command: name.clone(),
                expected: command.expected_arg_count(),
                got: args.len(),
            });
        }
        debug!(command = %name, args = ?args, "running shell command");
        command.run(args, self.fs.as_ref(), out)
    }

    /// Writes one usage line per command.
    pub fn print_usage(&self, out: &mut dyn Write) -> std::io::Result<()> {
        writeln!(out, "Usage: tfs <command> [args]")?;
        for command in self.commands.iter() {
            writeln!(out, "       [{}]", command.usage())?;
        }
        Ok(())
    }
}
