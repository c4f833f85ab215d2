//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// Evaldash - teacher-evaluation survey dashboard
///
/// Aggregates survey results from a published sheet (or a local CSV
/// export) per teacher and per question, and renders summary reports.
///
/// Examples:
///   evaldash
///   evaldash --sheet https://docs.google.com/spreadsheets/d/e/SHEET-ID/pub?output=json
///   evaldash --local evaluations.csv --teacher Ana
///   evaldash --teacher Ana --format csv --output ana_evaluation.csv
///   evaldash --search ann
///   evaldash --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Published sheet feed URL to fetch records from
    ///
    /// Overrides the `source.sheet_url` config setting. When neither is
    /// set, the built-in sample dataset is used.
    #[arg(long, value_name = "URL", env = "EVALDASH_SHEET_URL")]
    pub sheet: Option<String>,

    /// Local CSV export to read instead of fetching the sheet
    #[arg(long, value_name = "FILE", conflicts_with = "sheet")]
    pub local: Option<PathBuf>,

    /// Use the built-in sample dataset, skipping any fetch
    #[arg(long, conflicts_with_all = ["sheet", "local"])]
    pub sample: bool,

    /// Teacher to drill into (exact name, case-sensitive)
    #[arg(short, long, value_name = "NAME")]
    pub teacher: Option<String>,

    /// Search the teacher list instead of rendering a report
    #[arg(long, value_name = "QUERY", conflicts_with = "teacher")]
    pub search: Option<String>,

    /// Maximum number of search results
    #[arg(long, default_value = "5", value_name = "COUNT")]
    pub search_limit: usize,

    /// Output format (markdown, json, csv)
    ///
    /// `csv` exports the selected teacher's question table and requires
    /// --teacher.
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .evaldash.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Fetch timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Dry run: fetch and validate records, print counts, render nothing
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .evaldash.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
    /// CSV export of the selected teacher's question table
    Csv,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.format == OutputFormat::Csv && self.teacher.is_none() {
            return Err("--format csv exports one teacher's table; add --teacher".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if self.search_limit == 0 {
            return Err("Search limit must be at least 1".to_string());
        }

        if let Some(ref url) = self.sheet {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("Sheet URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(ref local_path) = self.local {
            if !local_path.exists() {
                return Err(format!(
                    "Local CSV file does not exist: {}",
                    local_path.display()
                ));
            }
            if !local_path.is_file() {
                return Err(format!(
                    "Local CSV path is not a file: {}",
                    local_path.display()
                ));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
