//! CLI commands and argument parsing

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Paginate a time-windowed REST endpoint
#[derive(Parser, Debug)]
#[command(name = "windowed-pager")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch every page and report each one
    Fetch(FetchArgs),

    /// Validate a config file and show the resolved run
    Validate {
        /// Configuration file (YAML or JSON)
        config: PathBuf,
    },
}

/// Arguments for `fetch`; flags override values from `--config`
#[derive(Args, Debug, Default, Clone)]
pub struct FetchArgs {
    /// Configuration file (YAML or JSON)
    #[arg(short = 'C', long)]
    pub config: Option<PathBuf>,

    /// API base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Endpoint path
    #[arg(long)]
    pub path: Option<String>,

    /// Initial window start (ISO-8601)
    #[arg(long)]
    pub start: Option<String>,

    /// Initial window end (ISO-8601)
    #[arg(long)]
    pub end: Option<String>,

    /// Fetch exactly this many pages
    #[arg(long, conflicts_with_all = ["until_last_page", "max_pages"])]
    pub total_pages: Option<u32>,

    /// Fetch until a page reports it is the last one
    #[arg(long)]
    pub until_last_page: bool,

    /// Cap on pages when fetching until the last page
    #[arg(long)]
    pub max_pages: Option<u32>,

    /// Take the next window from each response
    #[arg(long)]
    pub rotate_windows: bool,

    /// Response decoder
    #[arg(long)]
    pub decoder: Option<DecoderKind>,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Retries for retryable failures
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Print each page's body
    #[arg(long)]
    pub print_body: bool,
}

/// Built-in decoders selectable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum DecoderKind {
    /// `meta.page` / `meta.pages` / `meta.startTime` / `meta.endTime`
    Meta,
    /// Do not inspect bodies
    PageIndex,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One status line per page
    Text,
    /// One JSON object per page
    Json,
}
