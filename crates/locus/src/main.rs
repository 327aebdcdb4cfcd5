use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use locus::app::classify::classify;
use locus::app::normalize::normalize_frames;
use locus::app::parser::parse_stack_text;
use locus::app::report;
use locus::app::validate::validate;
use locus::infra::bridge::Bridge;
use locus::infra::config::Config;
use locus::infra::store::SelectionStore;

/// Locate the React component that rendered a selected DOM element.
#[derive(Parser)]
#[command(name = "locus", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the loopback bridge accepting selections from the browser side
    Serve {
        /// Override the configured bind host
        #[arg(long)]
        host: Option<String>,
        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Classify a selection from a JSON payload or raw stack text
    Classify {
        /// Input file; reads stdin when omitted
        file: Option<PathBuf>,
        /// Treat the input as raw stack text instead of a JSON payload
        #[arg(long)]
        text: bool,
    },
}

fn main() -> ExitCode {
    locus::init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Serve { host, port } => serve(host, port).map(|()| ExitCode::SUCCESS),
        Commands::Classify { file, text } => classify_input(file, text),
    }
}

fn serve(host: Option<String>, port: Option<u16>) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(host) = host {
        config.bridge.host = host;
    }
    if let Some(port) = port {
        config.bridge.port = port;
    }

    let store = Arc::new(SelectionStore::new());
    let bridge = Bridge::bind(config.bridge, store)?;
    bridge.run()
}

fn classify_input(file: Option<PathBuf>, text: bool) -> Result<ExitCode> {
    let config = Config::load()?;
    let input = read_input(file)?;

    let (dom_label, frames) = if text {
        (None, parse_stack_text(&input, &config.parser.extensions))
    } else {
        let document: serde_json::Value =
            serde_json::from_str(&input).context("input is not valid JSON")?;
        match validate(&document) {
            Ok(payload) => (payload.dom_label, payload.frames),
            Err(err) => {
                eprintln!("invalid payload: {err}");
                return Ok(ExitCode::FAILURE);
            }
        }
    };

    let frames = normalize_frames(frames);
    let classification = classify(&frames);
    print!(
        "{}",
        report::render(dom_label.as_deref(), &classification, &frames)
    );

    Ok(ExitCode::SUCCESS)
}

fn read_input(file: Option<PathBuf>) -> Result<String> {
    match file {
        Some(path) => {
            fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))
        }
        None => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("failed to read stdin")?;
            Ok(input)
        }
    }
}
