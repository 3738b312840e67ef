// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Install the tracing subscriber (RUST_LOG controls verbosity)
// 2. Parse command-line arguments using clap
// 3. Wire up the collaborators: sqlmap engine client, page fetcher,
//    reporter, cancellation token (flipped by Ctrl-C)
// 4. Run the injection operation and block on the task monitor
// 5. Exit with proper code (0 = done, 1 = stopped by Ctrl-C, 2 = error)
// =============================================================================

// Module declarations - tells Rust about our other source files
mod cli; // src/cli.rs - command-line parsing
mod crawl; // src/crawl/ - website crawling and cookie propagation
mod engine; // src/engine/ - the external scanning engine boundary
mod error; // src/error.rs - the error taxonomy
mod inject; // src/inject/ - orchestrator and task dispatcher
mod monitor; // src/monitor/ - task polling and reporting
mod page; // src/page/ - page fetching, form and link extraction

use clap::Parser;
use cli::{Cli, Commands};
use engine::SqlmapEngine;
use inject::{InjectOutcome, Injector};
use monitor::{ConsoleReporter, JsonReporter, MonitorExit, TaskReporter};
use page::HttpFetcher;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

// anyhow::Result lets us return any error type with the ? operator
use anyhow::Result;

#[tokio::main]
async fn main() {
    // Diagnostics go to stderr via tracing; reports go to stdout
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = callback path completed (unused from the CLI today)
//   Ok(1) = monitoring stopped by Ctrl-C
//   Ok(2) = internal error
async fn run() -> Result<i32> {
    let cli = Cli::parse();

    // Both subcommands collapse into the one orchestrator operation;
    // `forms` is the mode switch
    let (forms, target_url, max_depth, api_url, json, poll_interval) = match cli.command {
        Commands::Url {
            target_url,
            api_url,
            json,
            poll_interval,
        } => (false, target_url, None, api_url, json, poll_interval),
        Commands::Forms {
            target_url,
            max_depth,
            api_url,
            json,
            poll_interval,
        } => (true, target_url, max_depth, api_url, json, poll_interval),
    };

    println!("🔍 Target: {target_url}");
    if forms {
        match max_depth {
            Some(depth) => println!("📊 Max crawl depth: {depth}"),
            None => println!("📊 Max crawl depth: unlimited"),
        }
    }
    println!("🧪 Engine API: {api_url}");

    let scan_engine = SqlmapEngine::new(&api_url)?;
    let fetcher = HttpFetcher::new()?;

    // Ctrl-C flips the token so the crawl and the monitor stop cleanly
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    let reporter: Box<dyn TaskReporter> = if json {
        Box::new(JsonReporter)
    } else {
        Box::new(ConsoleReporter)
    };

    let injector = Injector::new(&scan_engine, &fetcher, reporter.as_ref(), cancel)
        .with_poll_interval(Duration::from_secs(poll_interval));

    // No callback from the CLI: block on the monitor until Ctrl-C
    match injector.inject::<()>(forms, &target_url, max_depth, None).await? {
        InjectOutcome::Monitored(MonitorExit::Cancelled) => {
            println!("\n🛑 Monitoring stopped");
            Ok(1)
        }
        InjectOutcome::Delegated(()) => Ok(0),
    }
}
