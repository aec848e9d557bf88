// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, error, info};
use zonesync::{
    config::load_task_file,
    constants::{CONFIG_PATH_ENV, TOKIO_WORKER_THREADS},
    dns_errors::ReconcileError,
    metrics::gather_metrics,
    reconcilers::{run_task, ReconcileResult},
    records::RecordSet,
};

#[derive(Parser, Debug)]
#[command(name = "zonesync")]
#[command(about = "Reconcile DNS record sets at Hetzner DNS or Hosttech DNS", long_about = None)]
struct Args {
    /// Task file (YAML)
    #[arg(short, long, env = CONFIG_PATH_ENV)]
    config: PathBuf,

    /// Report changes without applying them
    #[arg(long)]
    check: bool,

    /// Include before/after record sets in the output
    #[arg(long)]
    diff: bool,

    /// Print Prometheus metrics to stderr when done
    #[arg(long)]
    metrics: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("zonesync")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(args))
}

fn init_logging() {
    // RUST_LOG selects the level (default info), RUST_LOG_FORMAT=json switches
    // to JSON. Logs go to stderr; stdout carries the result document.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .compact()
                .init();
        }
    }
}

async fn async_main(args: Args) -> Result<()> {
    init_logging();
    debug!(config = %args.config.display(), "Logging initialized");

    let mut task_file = load_task_file(&args.config)?;
    if args.check {
        task_file.check_mode = true;
    }

    let client = task_file.provider.build_client()?;
    let task = task_file
        .into_task(client.information())
        .context("Invalid task")?;

    info!(
        provider = client.information().name,
        mode = task.mode(),
        "Starting reconciliation"
    );

    let outcome = run_task(client.as_ref(), &task).await;

    if args.metrics {
        match gather_metrics() {
            Ok(text) => eprintln!("{text}"),
            Err(e) => error!(error = %e, "Failed to gather metrics"),
        }
    }

    match outcome {
        Ok(result) => {
            println!("{}", render_result(&result, args.diff)?);
            Ok(())
        }
        Err(e) => {
            if let Some(partial) = e.partial_snapshot() {
                println!("{}", render_failure(&e, partial)?);
            }
            Err(e.into())
        }
    }
}

/// Render the result document; `diff` is dropped unless requested.
fn render_result(result: &ReconcileResult, show_diff: bool) -> Result<String> {
    let mut value = serde_json::to_value(result)?;
    if !show_diff {
        if let Some(map) = value.as_object_mut() {
            map.remove("diff");
        }
    }
    Ok(serde_json::to_string_pretty(&value)?)
}

/// Render what a failed apply left behind at the provider.
fn render_failure(err: &ReconcileError, partial: &[RecordSet]) -> Result<String> {
    let value = serde_json::json!({
        "changed": true,
        "failed": true,
        "reason": err.reason(),
        "msg": err.to_string(),
        "after": partial,
    });
    Ok(serde_json::to_string_pretty(&value)?)
}
