//! extract-metrics - consolidate build and analysis logs into one table
//!
//! A CLI tool that walks a folder of per-repository log directories,
//! extracts build time, CodeQL phase timings, CPU/memory statistics,
//! code-size counts and result counts, and writes one row per repository.
//!
//! Exit codes:
//!   0 - Batch completed (individual repositories may have been skipped)
//!   1 - Batch-level error (bad arguments, config, unreadable top directory,
//!       unwritable output)

mod analysis;
mod batch;
mod cli;
mod config;
mod error;
mod models;
mod parsers;
mod report;
mod scanner;

use analysis::Aggregator;
use anyhow::Result;
use cli::Args;
use config::Config;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

fn main() {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Config decides the default log level, so it loads before logging
    let mut config = match Config::load_default() {
        Ok(Some(config)) => config,
        Ok(None) => Config::default(),
        Err(e) => {
            eprintln!("❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    init_logging(&config);

    info!("extract-metrics v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    debug!("Config: {:?}", config);

    if let Err(e) = run(&args, &config) {
        error!("Batch failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Initialize logging; `RUST_LOG` takes precedence over the config file.
fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.general.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

/// Run the batch and print the summary.
fn run(args: &Args, config: &Config) -> Result<()> {
    let start_time = Instant::now();
    let output = PathBuf::from(&config.general.output);
    let aggregator = Aggregator::from_config(config);

    println!(
        "📂 Scanning repositories in: {}",
        args.top_directory.display()
    );

    let outcome = batch::run_batch(&args.top_directory, &output, &aggregator)?;

    info!(
        processed = outcome.processed(),
        skipped = outcome.skipped(),
        duration_secs = start_time.elapsed().as_secs_f64(),
        "batch complete"
    );

    println!("\n📊 Summary:");
    println!("   Repositories processed: {}", outcome.processed());
    println!("   Repositories skipped: {}", outcome.skipped());
    for failure in &outcome.failures {
        let pass = if failure.pass.is_empty() {
            String::new()
        } else {
            format!(" [{}]", failure.pass)
        };
        let action = if failure.skipped { "skipped" } else { "columns left empty" };
        println!(
            "   ⚠️  {}{} ({}): {}",
            failure.repo, pass, action, failure.error
        );
    }
    println!("\n✅ Metrics written to: {}", output.display());

    Ok(())
}
