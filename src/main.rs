//! bunker - inventory and repair console for the survival bunker
//!
//! Reads slash commands from a script or stdin and prints the results.

mod alerts;
mod bunker;
mod command_script;
mod commands;
mod config;
mod session;

use anyhow::{Context, Result};
use bunker_core::catalog_from_file;
use command_script::CommandScript;
use commands::{execute_command, parse_command, GameCommand};
use config::{BunkerConfig, DEFAULT_CATALOG_PATH, DEFAULT_CONFIG_PATH};
use session::Session;
use std::io::{self, BufRead, Write};
use std::{env, path::PathBuf};
use tracing::info;

fn main() -> Result<()> {
    // WARN by default; RUST_LOG overrides.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    info!("Starting bunker v{}", env!("CARGO_PKG_VERSION"));

    let cli = CliOptions::parse(env::args().skip(1));
    if cli.help {
        println!("{}", usage());
        return Ok(());
    }

    let config = BunkerConfig::load_from_path(&cli.config);
    let catalog = catalog_from_file(&cli.catalog)
        .with_context(|| format!("failed to load item catalog {}", cli.catalog.display()))?;
    let mut session = Session::new(&config, catalog)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.script {
        Some(path) => {
            let script = CommandScript::from_path(&path)?;
            info!(steps = script.commands().len(), script = %path.display(), "running command script");
            for line in script.commands() {
                writeln!(out, "> {line}")?;
                if !run_line(&mut session, line, &mut out)? {
                    break;
                }
            }
        }
        None => {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                if !run_line(&mut session, &line, &mut out)? {
                    break;
                }
            }
        }
    }

    for system in session.bunker().systems() {
        info!(
            system = system.kind().id(),
            durability = system.durability(),
            status = ?system.status(),
            "final state"
        );
    }
    Ok(())
}

/// Execute one command line. Returns `false` once the player quits.
fn run_line(session: &mut Session, line: &str, out: &mut impl Write) -> Result<bool> {
    let cmd = match parse_command(line, session.catalog()) {
        Ok(cmd) => cmd,
        Err(err) => {
            writeln!(out, "Error: {err}")?;
            return Ok(true);
        }
    };
    let quit = matches!(cmd, GameCommand::Quit);
    let output = execute_command(session, cmd);
    for text in output.lines {
        writeln!(out, "{text}")?;
    }
    for alert in session.settle() {
        writeln!(out, "{alert}")?;
    }
    Ok(!quit)
}

fn usage() -> &'static str {
    "Usage: bunker [--config <path>] [--catalog <path>] [--script <path>]\n\
     \n\
     Without --script, commands are read from stdin, one per line."
}

#[derive(Debug)]
struct CliOptions {
    config: PathBuf,
    catalog: PathBuf,
    script: Option<PathBuf>,
    help: bool,
}

impl CliOptions {
    fn parse<I: Iterator<Item = String>>(mut args: I) -> Self {
        let mut opts = CliOptions {
            config: PathBuf::from(DEFAULT_CONFIG_PATH),
            catalog: PathBuf::from(DEFAULT_CATALOG_PATH),
            script: None,
            help: false,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => {
                    if let Some(path) = args.next() {
                        opts.config = PathBuf::from(path);
                    } else {
                        tracing::error!("--config requires a file path");
                    }
                }
                "--catalog" => {
                    if let Some(path) = args.next() {
                        opts.catalog = PathBuf::from(path);
                    } else {
                        tracing::error!("--catalog requires a file path");
                    }
                }
                "--script" => {
                    if let Some(path) = args.next() {
                        opts.script = Some(PathBuf::from(path));
                    } else {
                        tracing::error!("--script requires a file path");
                    }
                }
                "-h" | "--help" => opts.help = true,
                other => {
                    tracing::warn!(arg = other, "ignoring unknown argument");
                }
            }
        }

        opts
    }
}
