//! `smartstore` - drive the store engine from command scripts.
//!
//! ```bash
//! smartstore run demos/store.script
//! smartstore --sink jsonl:state.jsonl run demos/store.script
//! smartstore exec show store store_123
//! ```
//!
//! Logs go to stderr; command output goes to stdout.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use smartstore_cli::CommandProcessor;
use smartstore_engine::{EngineConfig, SinkConfig, SinkPolicy, StoreService};

#[derive(Parser, Debug)]
#[command(name = "smartstore")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Persistence sink: none, memory or jsonl:<path>. Overrides SMARTSTORE_SINK.
    #[arg(long, global = true)]
    sink: Option<String>,

    /// strict or best-effort. Overrides SMARTSTORE_SINK_POLICY.
    #[arg(long, global = true)]
    sink_policy: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Execute a command script line by line
    Run {
        script: PathBuf,
    },
    /// Execute a single command
    Exec {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        line: Vec<String>,
    },
}

fn engine_config(cli: &Cli) -> anyhow::Result<EngineConfig> {
    let mut config = EngineConfig::from_env().context("reading engine configuration")?;
    if let Some(raw) = &cli.sink {
        config.sink = SinkConfig::parse(raw)?;
    }
    if let Some(raw) = &cli.sink_policy {
        config.sink_policy = raw
            .parse::<SinkPolicy>()
            .with_context(|| format!("invalid --sink-policy '{raw}'"))?;
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    smartstore_observability::init();

    let cli = Cli::parse();
    let config = engine_config(&cli)?;
    let service = StoreService::from_config(&config).context("opening persistence sink")?;
    tracing::info!(sink = ?config.sink, policy = ?config.sink_policy, "engine ready");
    let processor = CommandProcessor::new(Arc::new(service));

    match cli.command {
        Commands::Run { script } => {
            let file = File::open(&script)
                .with_context(|| format!("opening script {}", script.display()))?;
            let summary = processor
                .run_script(BufReader::new(file), io::stdout().lock())
                .context("running script")?;
            tracing::info!(
                executed = summary.executed,
                failed = summary.failed,
                skipped = summary.skipped,
                "script finished"
            );
        }
        Commands::Exec { line } => {
            // The shell already stripped quotes; restore them around multi-word values.
            let line = line
                .iter()
                .map(|word| match word.contains(char::is_whitespace) {
                    true => format!("\"{word}\""),
                    false => word.clone(),
                })
                .collect::<Vec<_>>()
                .join(" ");
            let output = processor
                .process_line(&line)
                .with_context(|| format!("command failed: {line}"))?;
            println!("{output}");
        }
    }

    Ok(())
}
