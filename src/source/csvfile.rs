//! Local CSV export reader.
//!
//! Reads a CSV export of the survey sheet (columns `timestamp`,
//! `teacher`, `yeargroup`, `question`, `rating`) into raw records. Rows
//! the CSV layer cannot decode at all are logged and skipped; cell-level
//! garbage survives as empty strings / `None` ratings for the validation
//! boundary to drop.

use std::fs::File;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::warn;

use crate::models::RawEvaluationRecord;
use crate::source::sheet::parse_rating;

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(default)]
    timestamp: String,
    #[serde(default)]
    teacher: String,
    #[serde(default, rename = "yeargroup")]
    year_group: String,
    #[serde(default)]
    question: String,
    #[serde(default)]
    rating: String,
}

impl From<CsvRow> for RawEvaluationRecord {
    fn from(row: CsvRow) -> Self {
        RawEvaluationRecord {
            teacher: row.teacher.trim().to_string(),
            year_group: row.year_group.trim().to_string(),
            question: row.question.trim().to_string(),
            rating: parse_rating(&row.rating),
            timestamp: row.timestamp.trim().to_string(),
        }
    }
}

/// Read every row of a CSV export file.
pub fn read_records(path: &Path) -> Result<Vec<RawEvaluationRecord>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open CSV export: {}", path.display()))?;
    parse_reader(file)
}

fn parse_reader<R: io::Read>(reader: R) -> Result<Vec<RawEvaluationRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();
    for (lineno, row) in csv_reader.deserialize::<CsvRow>().enumerate() {
        match row {
            Ok(row) => records.push(row.into()),
            Err(e) => {
                warn!("Skipping unreadable CSV row {}: {}", lineno + 2, e);
            }
        }
    }

    Ok(records)
}
