use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod script;

use script::{replay, Script};

#[derive(Parser)]
#[command(
    name = "dtpick",
    version,
    about = "Replay date-time picker event scripts and print caller notifications",
    long_about = None
)]
struct Cli {
    /// Script file (JSON). Reads stdin when omitted or "-".
    script: Option<PathBuf>,

    /// Override the script's IANA timezone (e.g. America/New_York)
    #[arg(short, long)]
    timezone: Option<String>,

    /// Override the script's date display pattern (e.g. DD.MM.YYYY)
    #[arg(short = 'f', long)]
    date_format: Option<String>,

    /// Print only the final hidden form field
    #[arg(long)]
    final_only: bool,

    /// Pretty-print JSON output
    #[arg(short, long)]
    pretty: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let input = read_input(cli.script.as_ref())?;
    let mut script: Script =
        serde_json::from_str(&input).context("failed to parse event script")?;

    if let Some(tz) = cli.timezone {
        script.config.timezone = tz;
    }
    if let Some(fmt) = cli.date_format {
        script.date_format = Some(fmt);
    }

    let result = replay(&script)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if cli.final_only {
        write_json(&mut out, &result.hidden_field, cli.pretty)?;
    } else {
        for step in &result.steps {
            write_json(&mut out, step, cli.pretty)?;
        }
        write_json(&mut out, &result.hidden_field, cli.pretty)?;
    }

    Ok(())
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(p) if p.as_os_str() != "-" => {
            fs::read_to_string(p).with_context(|| format!("failed to read {}", p.display()))
        }
        _ => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn write_json<T: serde::Serialize>(out: &mut impl Write, value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    writeln!(out, "{json}")?;
    Ok(())
}
