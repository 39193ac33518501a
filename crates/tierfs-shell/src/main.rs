#![warn(missing_docs)]
//! TierFS shell

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tierfs_client::{BaseFileSystem, ClientConfig, FileSystemContext};
use tierfs_shell::Shell;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "tfs")]
#[command(about = "TierFS shell", long_about = None)]
struct Cli {
    /// Client config file (toml or json)
    #[arg(short, long, env = "TIERFS_CONFIG")]
    config: Option<PathBuf>,

    /// Master address, overrides the config file
    #[arg(short, long, env = "TIERFS_MASTER")]
    master: Option<String>,

    /// Command name followed by its arguments
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

fn load_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = match &cli.config {
        Some(path) => ClientConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ClientConfig::default(),
    };
    if let Some(master) = &cli.master {
        config.master_address = master.clone();
    }
    Ok(config)
}

/// Runs the requested command and shuts the context down on every path.
/// Returns the process exit code.
fn run(cli: &Cli, context: Arc<FileSystemContext>, out: &mut dyn Write) -> Result<u8> {
    let result = dispatch(cli, &context, out);
    context.shutdown();
    result
}

fn dispatch(cli: &Cli, context: &Arc<FileSystemContext>, out: &mut dyn Write) -> Result<u8> {
    let shell = Shell::new(Arc::new(BaseFileSystem::new(context.clone())));
    if cli.command.is_empty() {
        shell.print_usage(out)?;
        out.flush()?;
        return Ok(1);
    }
    let result = shell.execute(&cli.command, out);
    out.flush()?;
    result?;
    Ok(0)
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let context = Arc::new(FileSystemContext::connect(&config));

    let stdout = io::stdout();
    let code = run(&cli, context, &mut stdout.lock())?;
    Ok(ExitCode::from(code))
}
