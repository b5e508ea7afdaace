// Operator CLI for the onelease hook
use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, Result, WrapErr};
use onelease_dhcp4::OneleaseConfig;
use std::io::stderr;
use std::path::Path;
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

mod cmd;

use cmd::check::CheckArgs;
use cmd::derive::DeriveArgs;
use cmd::simulate::SimulateArgs;

#[derive(Parser, Debug)]
#[command(author, version, about = "onelease DHCPv4 hook tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output - shows more detailed logs
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validates a hook parameters file and prints the effective configuration.
    Check(CheckArgs),
    /// Prints the address a hardware address derives to.
    Derive(DeriveArgs),
    /// Runs one full transaction against an in-memory subnet and lease.
    Simulate(SimulateArgs),
}

impl Commands {
    fn params(&self) -> Option<&Path> {
        match self {
            Commands::Check(args) => Some(args.params.as_path()),
            Commands::Derive(args) => args.params.as_deref(),
            Commands::Simulate(args) => args.params.as_deref(),
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    // Parameters decide where the debug log goes, so they load first
    let config = cmd::load_config(cli.command.params())?;
    let _guard = init_logging(cli.verbose, &config)?;
    debug!(config = ?config, "Hook parameters loaded");

    match &cli.command {
        Commands::Check(args) => cmd::check::run_check(args, &config)?,
        Commands::Derive(args) => cmd::derive::run_derive(args, config)?,
        Commands::Simulate(args) => cmd::simulate::run_simulate(args, config)?,
    }

    Ok(())
}

/// Install the global subscriber
///
/// Logs go to stderr. With `debug` set in the parameters they are also
/// appended to the configured debug log file. The returned guard flushes
/// that file and must live until the process exits.
fn init_logging(verbose: bool, config: &OneleaseConfig) -> Result<Option<WorkerGuard>> {
    let default_level = if verbose { "debug" } else { "info" };
    let default_directives = format!(
        "onelease={level},onelease_dhcp4={level}",
        level = default_level
    );
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

    let (file_layer, guard) = if config.debug {
        let path = &config.debug_logfile;
        let dir = path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| eyre!("Invalid debug-logfile {}", path.display()))?;

        let appender = RollingFileAppender::builder()
            .rotation(Rotation::NEVER)
            .filename_prefix(file_name)
            .build(dir)
            .wrap_err_with(|| format!("Unable to open debug-logfile {}", path.display()))?;
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = fmt::layer().with_writer(writer).with_ansi(false);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    registry()
        .with(filter)
        .with(fmt::layer().with_writer(stderr))
        .with(file_layer)
        .init();

    if config.debug {
        info!(
            logger = %config.logger_name,
            path = %config.debug_logfile.display(),
            "Debug log enabled"
        );
    }

    Ok(guard)
}
