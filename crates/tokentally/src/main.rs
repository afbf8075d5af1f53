// SPDX-FileCopyrightText: 2026 Tokentally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! tokentally - LLM token usage and cost accounting.
//!
//! Reads a batch of JSON records from a file or stdin, runs one transformer
//! over it, and writes the transformed batch to stdout. Logs go to stderr.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod io;
mod models;
mod price;
mod track;
mod usage;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tokentally_config::TallyConfig;
use tokentally_core::TallyError;

/// tokentally - LLM token usage and cost accounting.
#[derive(Parser, Debug)]
#[command(name = "tokentally", version, about, long_about = None)]
struct Cli {
    /// Load this config file instead of the standard search path.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Turn failed records into `{"error": ...}` records instead of aborting.
    #[arg(long, global = true)]
    continue_on_fail: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Token usage of past workflow executions.
    Usage {
        #[command(subcommand)]
        action: UsageAction,
    },
    /// Attach per-call costs to usage reports.
    Price {
        #[command(flatten)]
        io: IoArgs,
    },
    /// Attach a `tokenCost` object to each record.
    Track {
        #[command(flatten)]
        io: IoArgs,
        /// Emit only `tokenCost` (and `rawResponse`), not the input fields.
        #[arg(long)]
        no_pass_through: bool,
        /// Attach the generation stats as `rawResponse`.
        #[arg(long)]
        include_raw_response: bool,
        #[command(subcommand)]
        mode: TrackCommand,
    },
    /// List priced models.
    Models {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
        /// Disable colors.
        #[arg(long)]
        plain: bool,
    },
}

#[derive(Subcommand, Debug)]
enum UsageAction {
    /// Fetch an execution and report its language-model token usage.
    Fetch {
        /// Execution to report on.
        execution_id: String,
    },
    /// Emit the current execution id so it can be fetched later.
    Save {
        #[arg(long, env = "TOKENTALLY_EXECUTION_ID")]
        execution_id: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum TrackCommand {
    /// Read model and token counts from each record.
    FromInput,
    /// Look up exact costs by generation id.
    Generation {
        /// Use this id for every record.
        #[arg(long, conflicts_with = "id_field")]
        generation_id: Option<String>,
        /// Record field holding the generation id.
        #[arg(long, default_value = "id")]
        id_field: String,
    },
    /// Price operator-supplied counts.
    Manual {
        #[arg(long)]
        model: String,
        #[arg(long)]
        input_tokens: u64,
        #[arg(long)]
        output_tokens: u64,
    },
}

/// Batch input/output options.
#[derive(Args, Debug, Clone)]
struct IoArgs {
    /// Read records from this file (`-` or absent: stdin).
    #[arg(long, short = 'i', value_name = "FILE")]
    input: Option<PathBuf>,
    /// Write newline-delimited JSON instead of a pretty array.
    #[arg(long)]
    ndjson: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => tokentally_config::load_and_validate_path(path),
        None => tokentally_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            tokentally_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.runtime.log_level);
    tracing::debug!(command = ?cli.command, "config loaded");

    if let Err(e) = run(cli, &config).await {
        if std::io::stderr().is_terminal() {
            use colored::Colorize;
            eprintln!("{} {e}", "error:".red().bold());
        } else {
            eprintln!("error: {e}");
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &TallyConfig) -> Result<(), TallyError> {
    let continue_on_fail = cli.continue_on_fail || config.runtime.continue_on_fail;
    let timeout = Duration::from_secs(config.runtime.http_timeout_secs);

    match cli.command {
        Commands::Usage {
            action: UsageAction::Fetch { execution_id },
        } => usage::run_fetch(config, timeout, &execution_id).await,
        Commands::Usage {
            action: UsageAction::Save { execution_id },
        } => usage::run_save(execution_id.as_deref()),
        Commands::Price { io } => price::run_price(config, timeout, &io).await,
        Commands::Track {
            io,
            no_pass_through,
            include_raw_response,
            mode,
        } => {
            let options = tokentally_transform::TrackOptions {
                pass_through_input: !no_pass_through,
                include_raw_response,
                continue_on_fail,
            };
            track::run_track(config, timeout, &io, mode, options).await
        }
        Commands::Models { json, plain } => models::run_models(config, timeout, json, plain).await,
    }
}

/// Initializes the tracing subscriber on stderr so stdout stays JSON.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tokentally={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
