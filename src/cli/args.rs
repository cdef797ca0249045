//! Command line argument parsing for the Halberd CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// Halberd - shard-local search execution over JSON lines documents
#[derive(Parser, Debug, Clone)]
#[command(name = "halberd")]
#[command(about = "Run shard-local searches over a JSON lines document file")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct HalberdArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl HalberdArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1,
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Search a document file
    Search(SearchArgs),

    /// Show index statistics for a document file
    Stats(StatsArgs),
}

/// Arguments for searching
#[derive(Parser, Debug, Clone)]
pub struct SearchArgs {
    /// JSON lines file, one document object per line
    #[arg(long, value_name = "FILE")]
    pub docs: PathBuf,

    /// Query text
    #[arg(long)]
    pub query: String,

    /// Field to search
    #[arg(long, default_value = "body")]
    pub field: String,

    /// Treat the last query word as a prefix
    #[arg(long)]
    pub prefix: bool,

    /// Only return documents with this `field:value` term
    #[arg(long, value_name = "FIELD:VALUE")]
    pub filter: Option<String>,

    /// Number of hits to return (overrides the config file)
    #[arg(short = 'n', long)]
    pub size: Option<usize>,

    /// First hit to return (overrides the config file)
    #[arg(long)]
    pub from: Option<usize>,

    /// Scan deadline in milliseconds (overrides the config file)
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Compute a terms facet over this field
    #[arg(long, value_name = "FIELD")]
    pub facet: Option<String>,

    /// Number of facet terms to report
    #[arg(long, default_value = "10")]
    pub facet_size: usize,

    /// Compute the facet over every document instead of the hits
    #[arg(long)]
    pub global_facet: bool,

    /// Documents per segment
    #[arg(long, default_value = "10000")]
    pub segment_size: usize,

    /// Search settings file (JSON)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Arguments for showing statistics
#[derive(Parser, Debug, Clone)]
pub struct StatsArgs {
    /// JSON lines file, one document object per line
    #[arg(long, value_name = "FILE")]
    pub docs: PathBuf,

    /// Documents per segment
    #[arg(long, default_value = "10000")]
    pub segment_size: usize,
}

/// Output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_args() {
        let args = HalberdArgs::try_parse_from([
            "halberd",
            "-f",
            "json",
            "search",
            "--docs",
            "docs.jsonl",
            "--query",
            "rust search",
            "--field",
            "title",
            "--prefix",
            "--timeout-ms",
            "50",
            "--facet",
            "tags",
        ])
        .unwrap();

        assert_eq!(args.output_format, OutputFormat::Json);
        match args.command {
            Command::Search(search) => {
                assert_eq!(search.query, "rust search");
                assert_eq!(search.field, "title");
                assert!(search.prefix);
                assert_eq!(search.timeout_ms, Some(50));
                assert_eq!(search.facet.as_deref(), Some("tags"));
                assert_eq!(search.size, None);
                assert_eq!(search.facet_size, 10);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_verbosity() {
        let args = HalberdArgs::try_parse_from(["halberd", "-vvv", "stats", "--docs", "d.jsonl"]).unwrap();
        assert_eq!(args.verbosity(), 3);

        let args = HalberdArgs::try_parse_from(["halberd", "-q", "stats", "--docs", "d.jsonl"]).unwrap();
        assert_eq!(args.verbosity(), 0);

        let args = HalberdArgs::try_parse_from(["halberd", "stats", "--docs", "d.jsonl"]).unwrap();
        assert_eq!(args.verbosity(), 1);
    }
}
