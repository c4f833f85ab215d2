//! Data sources for evaluation records.
//!
//! Every source translates its own wire format into
//! [`RawEvaluationRecord`](crate::models::RawEvaluationRecord) before the
//! aggregator sees anything, so transport concerns never leak into the
//! core. A failed fetch is recovered here, by falling back to the
//! built-in sample dataset.

pub mod csvfile;
pub mod sample;
pub mod sheet;

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use tracing::{info, warn};

use crate::cli::Args;
use crate::config::Config;
use crate::models::RawEvaluationRecord;

/// Where a run's records come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordSource {
    /// Published sheet feed URL.
    Sheet(String),
    /// Local CSV export of the sheet.
    CsvFile(PathBuf),
    /// Built-in sample dataset.
    Sample,
}

impl fmt::Display for RecordSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordSource::Sheet(url) => write!(f, "{}", url),
            RecordSource::CsvFile(path) => write!(f, "{}", path.display()),
            RecordSource::Sample => write!(f, "sample"),
        }
    }
}

/// Pick the source for this run.
///
/// Precedence: `--sample` > `--local FILE` > `--sheet URL` > configured
/// sheet URL > sample dataset.
pub fn resolve(args: &Args, config: &Config) -> RecordSource {
    if args.sample {
        return RecordSource::Sample;
    }
    if let Some(ref path) = args.local {
        return RecordSource::CsvFile(path.clone());
    }
    if let Some(ref url) = args.sheet {
        return RecordSource::Sheet(url.clone());
    }
    if let Some(ref url) = config.source.sheet_url {
        return RecordSource::Sheet(url.clone());
    }
    info!("No sheet URL configured, using the sample dataset");
    RecordSource::Sample
}

/// Load records from the resolved source.
///
/// Returns the records together with the source that actually supplied
/// them: on a fetch or read failure the error is logged and the sample
/// dataset is substituted, so the dashboard never comes up empty or
/// half-built.
pub async fn load_records(
    source: &RecordSource,
    config: &Config,
) -> (RecordSource, Vec<RawEvaluationRecord>) {
    match source {
        RecordSource::Sample => (RecordSource::Sample, sample::records()),
        RecordSource::CsvFile(path) => match csvfile::read_records(path) {
            Ok(records) => {
                info!("Read {} rows from {}", records.len(), path.display());
                (source.clone(), records)
            }
            Err(e) => {
                warn!("Failed to read {}: {:#}. Falling back to sample data.", path.display(), e);
                (RecordSource::Sample, sample::records())
            }
        },
        RecordSource::Sheet(url) => {
            let timeout = Duration::from_secs(config.source.timeout_seconds);
            let fetched = match sheet::SheetClient::new(timeout) {
                Ok(client) => client.fetch_records(url).await,
                Err(e) => Err(e),
            };
            match fetched {
                Ok(records) => {
                    info!("Fetched {} rows from the sheet feed", records.len());
                    (source.clone(), records)
                }
                Err(e) => {
                    warn!("Failed to fetch sheet feed: {:#}. Falling back to sample data.", e);
                    (RecordSource::Sample, sample::records())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_source_loads_sample_records() {
        let config = Config::default();
        let (actual, records) =
            tokio_test::block_on(load_records(&RecordSource::Sample, &config));

        assert_eq!(actual, RecordSource::Sample);
        assert_eq!(records, sample::records());
    }

    #[test]
    fn missing_csv_file_falls_back_to_sample() {
        let config = Config::default();
        let source = RecordSource::CsvFile(PathBuf::from("/nonexistent/evals.csv"));
        let (actual, records) = tokio_test::block_on(load_records(&source, &config));

        assert_eq!(actual, RecordSource::Sample);
        assert!(!records.is_empty());
    }

    #[test]
    fn source_display_forms() {
        assert_eq!(RecordSource::Sample.to_string(), "sample");
        assert_eq!(
            RecordSource::Sheet("https://example.com/pub?output=json".to_string()).to_string(),
            "https://example.com/pub?output=json"
        );
    }
}
