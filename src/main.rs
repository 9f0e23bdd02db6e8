//! `codepad`: replay an editor command script against a file.

use anyhow::{Context, Result};
use clap::Parser;
use codepad::replay::{parse_script, Replayer};
use codepad::EditorConfig;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "codepad", about = "Replay editor scripts against a document", version)]
struct Cli {
    /// Document to load (`-` reads stdin)
    input: PathBuf,

    /// Command script to replay
    #[arg(short, long, env = "CODEPAD_SCRIPT")]
    script: Option<PathBuf>,

    /// Write the edited document here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print a JSON status and span dump instead of the document
    #[arg(short, long)]
    json: bool,

    /// Carry leading whitespace onto new lines
    #[arg(long)]
    auto_indent: bool,

    /// Log highlight lifecycle events
    #[arg(long)]
    trace_highlight: bool,
}

fn read_input(path: &PathBuf) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("reading stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "codepad=warn,codepad_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = EditorConfig::from_env();
    config.auto_indent |= cli.auto_indent;
    config.trace_highlight |= cli.trace_highlight;
    let config = config.validated()?;

    let content = read_input(&cli.input)?;
    let commands = match &cli.script {
        Some(path) => parse_script(&read_input(path)?)?,
        None => Vec::new(),
    };
    tracing::debug!(commands = commands.len(), "loaded script");

    let mut replayer = Replayer::new(config, &content)?;
    replayer.run(&commands)?;
    let report = replayer.finish();

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    match &cli.output {
        Some(path) => std::fs::write(path, &report.content)
            .with_context(|| format!("writing {}", path.display()))?,
        None if !cli.json => io::stdout().write_all(report.content.as_bytes())?,
        None => {}
    }
    Ok(())
}
