// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Two subcommands, mirroring the two injection modes:
// - url:   inject directly against one URL, no crawling
// - forms: crawl a website for forms and inject every discovered page
//
// Both then monitor the resulting scan tasks until Ctrl-C.
// =============================================================================

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "sql-scout",
    version = "0.1.0",
    about = "Crawl websites for injectable forms and drive SQL injection scan tasks",
    long_about = "sql-scout discovers HTML forms and injectable URLs on a target website, \
                  hands each one to a sqlmap REST API server for SQL injection testing, \
                  and reports scan progress until stopped with Ctrl-C."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inject directly against a single URL (no crawling)
    ///
    /// Example: sql-scout url "https://target.example/item?id=1"
    Url {
        /// The URL to inject (e.g. https://target.example/item?id=1)
        target_url: String,

        /// Base URL of the sqlmap REST API server
        #[arg(long, default_value = "http://127.0.0.1:8775")]
        api_url: String,

        /// Emit task reports as JSON lines instead of human-readable blocks
        #[arg(long)]
        json: bool,

        /// Seconds between task status polls
        #[arg(long, default_value_t = 3)]
        poll_interval: u64,
    },

    /// Crawl a website for forms and inject every discovered page
    ///
    /// Example: sql-scout forms https://target.example --max-depth 2
    Forms {
        /// The URL to start crawling from; the crawl never leaves its
        /// scheme+host
        target_url: String,

        /// Maximum crawl depth (link hops from the start URL).
        /// Omit for unlimited depth.
        #[arg(long)]
        max_depth: Option<usize>,

        /// Base URL of the sqlmap REST API server
        #[arg(long, default_value = "http://127.0.0.1:8775")]
        api_url: String,

        /// Emit task reports as JSON lines instead of human-readable blocks
        #[arg(long)]
        json: bool,

        /// Seconds between task status polls
        #[arg(long, default_value_t = 3)]
        poll_interval: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forms_subcommand() {
        let cli = Cli::try_parse_from([
            "sql-scout",
            "forms",
            "https://example.com/",
            "--max-depth",
            "2",
            "--json",
        ])
        .unwrap();

        match cli.command {
            Commands::Forms {
                target_url,
                max_depth,
                json,
                poll_interval,
                ..
            } => {
                assert_eq!(target_url, "https://example.com/");
                assert_eq!(max_depth, Some(2));
                assert!(json);
                assert_eq!(poll_interval, 3);
            }
            _ => panic!("expected the forms subcommand"),
        }
    }

    #[test]
    fn test_max_depth_defaults_to_unlimited() {
        let cli =
            Cli::try_parse_from(["sql-scout", "forms", "https://example.com/"]).unwrap();
        match cli.command {
            Commands::Forms { max_depth, .. } => assert_eq!(max_depth, None),
            _ => panic!("expected the forms subcommand"),
        }
    }
}
