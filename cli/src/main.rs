//! QueueBatch CLI — inspect queue-trigger events and dry-run batch dispatch.
//!
//! # Commands
//! ```text
//! queuebatch inspect  --event <path|->
//! queuebatch dispatch --event <path|-> [--require <field>...] [--concurrency N]
//!                     [--timeout-ms MS] [--budget-ms MS] [--json]
//! queuebatch config
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use queuebatch_core::{Batch, InvocationContext};
use queuebatch_dispatch::{BatchDispatcher, BatchReport};
use queuebatch_observability::{init_tracing, DispatchMetrics};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

mod config;
mod validate;

use config::AppConfig;
use validate::RequiredFields;

#[derive(Parser)]
#[command(
    name = "queuebatch",
    about = "Partial-failure batch dispatch for queue-triggered functions — QueueBatch CLI",
    long_about = "
QueueBatch CLI: inspect captured queue-trigger events and replay them through
the batch dispatcher to see which messages would be reported for redelivery.

Events use the queue-trigger shape: {\"Records\": [{\"messageId\", \"body\", \"eventSource\", ...}]}.
The response is printed as {\"batchItemFailures\": [{\"itemIdentifier\": ...}]}.

ENVIRONMENT VARIABLES:
  RUST_LOG    Overrides the log filter from the config file
",
    version
)]
struct Cli {
    /// YAML config file with `dispatch` and `log` sections
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarise a queue-trigger event file
    Inspect {
        /// Event file, or `-` for stdin
        #[arg(short, long)]
        event: String,
    },

    /// Dispatch an event through a validating handler and print the batch response
    Dispatch {
        /// Event file, or `-` for stdin
        #[arg(short, long)]
        event: String,
        /// Top-level JSON fields every payload must carry (repeatable)
        #[arg(long = "require", num_args = 1..)]
        require: Vec<String>,
        /// Messages processed at once (overrides config)
        #[arg(long)]
        concurrency: Option<usize>,
        /// Per-message timeout in milliseconds (overrides config)
        #[arg(long)]
        timeout_ms: Option<u64>,
        /// Simulated invocation time budget in milliseconds
        #[arg(long)]
        budget_ms: Option<u64>,
        /// Print only the JSON batch response
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration as YAML
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut app = AppConfig::load(cli.config.as_deref())?;

    if cli.verbose {
        app.log.level = "debug".into();
    }
    if let Ok(filter) = std::env::var("RUST_LOG") {
        app.log.level = filter;
    }
    init_tracing(&app.log);

    match cli.command {
        Commands::Inspect { event } => cmd_inspect(&event),
        Commands::Dispatch {
            event,
            require,
            concurrency,
            timeout_ms,
            budget_ms,
            json,
        } => {
            if let Some(n) = concurrency {
                app.dispatch.max_concurrency = n;
            }
            if timeout_ms.is_some() {
                app.dispatch.message_timeout_ms = timeout_ms;
            }
            cmd_dispatch(&app, &event, require, budget_ms, json).await
        }
        Commands::Config => {
            print!("{}", app.to_yaml()?);
            Ok(())
        }
    }
}

fn read_event(source: &str) -> Result<Batch> {
    let text = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("cannot read event from stdin")?;
        buf
    } else {
        std::fs::read_to_string(source).with_context(|| format!("cannot read event file {source}"))?
    };
    Batch::from_json(&text).with_context(|| format!("{source} is not a queue-trigger event"))
}

fn cmd_inspect(source: &str) -> Result<()> {
    let batch = read_event(source)?;

    println!("Batch: {} message(s)", batch.len());
    for (i, envelope) in batch.iter().enumerate() {
        let valid_json = serde_json::from_str::<serde_json::Value>(&envelope.body).is_ok();
        println!(
            "  [{i}] {}  source={}  body={}B  json={}",
            envelope.identifier,
            if envelope.source.is_empty() { "-" } else { &envelope.source },
            envelope.body.len(),
            if valid_json { "yes" } else { "no" },
        );
    }

    let dupes = batch.duplicate_identifiers();
    if !dupes.is_empty() {
        println!("\n  ⚠ duplicate identifiers: {}", dupes.join(", "));
    }
    Ok(())
}

async fn cmd_dispatch(
    app: &AppConfig,
    source: &str,
    require: Vec<String>,
    budget_ms: Option<u64>,
    json: bool,
) -> Result<()> {
    let batch = read_event(source)?;

    let mut ctx = InvocationContext::new(uuid::Uuid::new_v4().to_string())
        .with_function_name("queuebatch-cli");
    if let Some(ms) = budget_ms {
        ctx = ctx.with_time_budget(Duration::from_millis(ms));
    }

    info!(
        request_id = %ctx.request_id,
        event = source,
        required_fields = require.len(),
        "replaying event"
    );

    let dispatcher = BatchDispatcher::new(Arc::new(RequiredFields::new(require)))
        .with_config(app.dispatch.clone())
        .with_metrics(DispatchMetrics::global());

    let report = dispatcher
        .handle_with_report(&batch, &ctx)
        .await
        .context("batch dispatch failed")?;

    if !json {
        print_report(&report);
    }
    println!("{}", serde_json::to_string_pretty(&report.result())?);
    Ok(())
}

fn print_report(report: &BatchReport) {
    println!("─── Outcomes ────────────────────────────────────────────");
    for outcome in report.outcomes() {
        let detail = outcome
            .error
            .as_ref()
            .map(|e| format!("  ({e})"))
            .unwrap_or_default();
        println!(
            "  [{}] {:<40} {:<14} {:>6.1}ms{}",
            outcome.index,
            outcome.identifier,
            outcome.status.to_string(),
            outcome.elapsed.as_secs_f64() * 1000.0,
            detail
        );
    }
    println!(
        "\n  total: {}  succeeded: {}  failed: {}",
        report.total(),
        report.succeeded(),
        report.failed()
    );
    println!("\n─── Batch response ──────────────────────────────────────");
}
