use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "md-fetch")]
#[command(about = "A CLI tool for fetching web pages and converting their main content to Markdown")]
#[command(version = "0.1.0")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// JSON configuration file (extraction patterns, fetch settings)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch pages and print them as JSON-wrapped Markdown
    Fetch(FetchArgs),

    /// Convert a directory of saved HTML files to Markdown files
    Batch(BatchArgs),

    /// Validate input sources
    Validate(ValidateArgs),
}

#[derive(Args)]
pub struct FetchArgs {
    /// Input sources (URLs or HTML file paths)
    #[arg(required = true, value_name = "SOURCE")]
    pub sources: Vec<String>,

    /// Base URL for resolving relative image paths
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Include extraction statistics in the response
    #[arg(long)]
    pub stats: bool,

    /// Print plain Markdown instead of JSON
    #[arg(long)]
    pub markdown: bool,

    /// Write all responses to a JSON file
    #[arg(long, value_name = "FILE")]
    pub json_output: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// User-Agent header sent with requests
    #[arg(long, value_name = "UA")]
    pub user_agent: Option<String>,
}

#[derive(Args)]
pub struct BatchArgs {
    /// Directory containing .html/.htm files
    #[arg(value_name = "DIR")]
    pub input: PathBuf,

    /// Output directory for Markdown files
    #[arg(short, long, default_value = "./output")]
    pub output: PathBuf,

    /// Base URL for resolving relative image paths
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Write into a non-empty output directory
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Input sources (URLs or HTML file paths)
    #[arg(required = true, value_name = "SOURCE")]
    pub sources: Vec<String>,

    /// Check if sources are accessible
    #[arg(long)]
    pub check_access: bool,
}
