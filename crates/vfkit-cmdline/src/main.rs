//! vfkit-cmdline entry point.
//!
//! Parses a vfkit command line, validates every component and prints the
//! normalized launcher invocation. Logs go to stderr, the invocation to
//! stdout.

use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use vfkit_cmdline::{LauncherConfig, Options};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Launcher path then one argument per line
    #[default]
    Lines,
    /// `{"launcher": ..., "args": [...]}`
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "vfkit-cmdline", version, about)]
struct Args {
    #[command(flatten)]
    options: Options,

    /// How to print the launcher invocation
    #[arg(long, value_enum, default_value_t = OutputFormat::Lines)]
    format: OutputFormat,
}

#[derive(Serialize)]
struct Invocation<'a> {
    launcher: &'a Path,
    args: &'a [String],
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("vfkit_cmdline=info".parse()?))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let config = LauncherConfig::from_env();
    tracing::debug!(?config, "Configuration loaded");
    config.validate_warn();

    let vm = args.options.to_virtual_machine(&config)?;
    let launcher_args = vm.to_cmdline()?;
    tracing::info!(
        devices = vm.devices().len(),
        args = launcher_args.len(),
        "Launcher arguments ready"
    );

    match args.format {
        OutputFormat::Lines => {
            println!("{}", config.launcher_path.display());
            for arg in &launcher_args {
                println!("{arg}");
            }
        }
        OutputFormat::Json => {
            let invocation = Invocation {
                launcher: &config.launcher_path,
                args: &launcher_args,
            };
            println!("{}", serde_json::to_string_pretty(&invocation)?);
        }
    }

    Ok(())
}
