//! Evaldash - Teacher Evaluation Survey Dashboard
//!
//! A CLI dashboard that fetches teacher-evaluation survey results from a
//! spreadsheet-backed source, aggregates them per teacher and per
//! question, and renders summary reports and CSV exports.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (bad configuration, unwritable output, etc.)

mod analysis;
mod cli;
mod config;
mod models;
mod report;
mod source;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::Config;
use models::{DashboardSnapshot, RatingScale, RawEvaluationRecord, TeacherProfile, TeacherSummary};
use source::RecordSource;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("Evaldash v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run_dashboard(args).await {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Dashboard run failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .evaldash.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(".evaldash.toml");

    if path.exists() {
        eprintln!("⚠️  .evaldash.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .evaldash.toml")?;

    println!("✅ Created .evaldash.toml with default settings.");
    println!("   Edit it to set the sheet URL, rating scale, school year, and colors.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr so stdout stays clean for the rendered report.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete dashboard workflow.
async fn run_dashboard(args: Args) -> Result<()> {
    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate()?;

    let scale = config.scale.rating_scale();

    // Step 1: Get the records (falls back to sample data on failure)
    let requested = source::resolve(&args, &config);
    info!("Loading records from {}", requested);
    let (actual_source, records) = source::load_records(&requested, &config).await;
    if actual_source != requested {
        warn!("Requested source was unavailable; showing sample data");
    }

    // Handle --dry-run: validate records and exit
    if args.dry_run {
        return handle_dry_run(&records, &scale, &actual_source);
    }

    // Step 2: Aggregate. Every run builds a fresh snapshot; nothing is
    // carried over between runs.
    let teachers = analysis::build_teacher_index(&records, &scale);
    let stats = analysis::school_stats(&teachers);
    debug!(
        "Aggregated {} records into {} teachers",
        records.len(),
        stats.total_teachers
    );

    let snapshot = DashboardSnapshot {
        school_year: config.general.school_year.clone(),
        generated_at: Utc::now(),
        source: actual_source.to_string(),
        teachers,
        stats,
    };

    // Handle --search: print matching teachers and exit
    if let Some(ref query) = args.search {
        return handle_search(&snapshot, query, args.search_limit);
    }

    // Step 3: Build the selected teacher's profile, if any
    let profile = args
        .teacher
        .as_ref()
        .map(|name| build_profile(&snapshot, &records, name, &scale));

    // Step 4: Render
    let output = match args.format {
        OutputFormat::Markdown => match profile {
            Some(ref profile) => {
                report::generate_markdown_profile(&snapshot, profile, &scale, &config.colors)
            }
            None => report::generate_markdown_dashboard(&snapshot, &scale, &config.colors),
        },
        OutputFormat::Json => report::generate_json_report(&snapshot, profile.as_ref())?,
        OutputFormat::Csv => {
            let profile = profile
                .as_ref()
                .context("CSV export requires a selected teacher")?;
            report::generate_csv_export(profile, &scale)?
        }
    };

    // Step 5: Write or print
    match args.output {
        Some(ref path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            println!("✅ Report saved to: {}", path.display());
        }
        None => {
            print!("{}", output);
        }
    }

    Ok(())
}

/// Handle --dry-run: report how many rows would survive validation.
fn handle_dry_run(
    records: &[RawEvaluationRecord],
    scale: &RatingScale,
    source: &RecordSource,
) -> Result<()> {
    let valid = records
        .iter()
        .filter(|record| record.validate(scale).is_some())
        .count();
    let dropped = records.len() - valid;

    println!("🔍 Dry run: {} rows from {}", records.len(), source);
    println!("   Valid evaluations: {}", valid);
    println!("   Dropped (malformed): {}", dropped);
    println!("\n✅ Dry run complete. Nothing was rendered.");
    Ok(())
}

/// Handle --search: print the matching teacher lines.
fn handle_search(snapshot: &DashboardSnapshot, query: &str, limit: usize) -> Result<()> {
    let hits = analysis::search_teachers(&snapshot.teachers, query, limit);

    if hits.is_empty() {
        println!("No teachers found for '{}'.", query);
        return Ok(());
    }

    for hit in hits {
        println!("{}", report::format_search_hit(hit));
    }
    Ok(())
}

/// Build the drill-down profile for one teacher.
///
/// An unknown name yields an empty profile; the report layer renders the
/// empty state rather than treating it as fatal.
fn build_profile(
    snapshot: &DashboardSnapshot,
    records: &[RawEvaluationRecord],
    name: &str,
    scale: &RatingScale,
) -> TeacherProfile {
    let summary = snapshot
        .teachers
        .iter()
        .find(|teacher| teacher.name == name)
        .cloned()
        .unwrap_or_else(|| TeacherSummary {
            name: name.to_string(),
            year_groups: Vec::new(),
            total_responses: 0,
            average_rating: 0.0,
        });

    let questions = analysis::build_question_summaries(records, name, scale);
    TeacherProfile { summary, questions }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .evaldash.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
