mod cli;

use std::io::IsTerminal;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, ColorChoice, Command};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log, cli.color)?;

    let rendered = match cli.command {
        Command::Normalize { config } => {
            let spec = trtspec_cli::load_spec(&config)?;
            tracing::info!(path = %config.display(), inputs = spec.input_ranges.len(), "normalized compile spec");
            serde_json::to_string_pretty(&spec)?
        }
        Command::Encode { config } => {
            let spec = trtspec_cli::load_spec(&config)?;
            let report = trtspec_cli::EncodedReport::from(spec);
            tracing::info!(path = %config.display(), flags = ?report.builder_flags, "encoded compile spec");
            serde_json::to_string_pretty(&report)?
        }
    };

    println!("{rendered}");
    Ok(())
}

fn init_tracing(log: &str, color: ColorChoice) -> Result<()> {
    let filter = EnvFilter::try_new(log).with_context(|| format!("invalid log filter `{log}`"))?;
    let ansi = match color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => std::io::stderr().is_terminal(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(ansi)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}
