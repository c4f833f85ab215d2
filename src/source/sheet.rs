//! Published-sheet feed client.
//!
//! Fetches the JSON feed of a sheet published to the web and translates
//! its `feed.entry[].gsx$<column>.$t` rows into raw evaluation records.
//! Survey exports are messy by nature, so translation never fails on a
//! single row: absent or malformed cells become empty strings and `None`
//! ratings, and the validation boundary downstream decides what counts.

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::models::RawEvaluationRecord;

/// Errors from fetching or decoding the sheet feed.
#[derive(Debug, Error)]
pub enum SheetError {
    #[error("sheet request failed")]
    Http(#[from] reqwest::Error),

    #[error("sheet feed shape not recognized (missing feed.entry array)")]
    MissingEntries,
}

/// HTTP client for the published feed.
pub struct SheetClient {
    http: reqwest::Client,
}

impl SheetClient {
    /// Build a client with the configured request timeout. The timeout is
    /// a source-level boundary; the aggregator never waits on anything.
    pub fn new(timeout: Duration) -> Result<Self, SheetError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }

    /// Fetch and translate the feed at `url`.
    pub async fn fetch_records(&self, url: &str) -> Result<Vec<RawEvaluationRecord>, SheetError> {
        debug!("Fetching sheet feed: {}", url);
        let value: Value = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        parse_feed(&value)
    }
}

/// Translate a decoded feed document into raw records.
pub fn parse_feed(value: &Value) -> Result<Vec<RawEvaluationRecord>, SheetError> {
    let entries = value
        .pointer("/feed/entry")
        .and_then(Value::as_array)
        .ok_or(SheetError::MissingEntries)?;

    Ok(entries.iter().map(entry_to_record).collect())
}

fn entry_to_record(entry: &Value) -> RawEvaluationRecord {
    RawEvaluationRecord {
        teacher: gsx_text(entry, "teacher"),
        year_group: gsx_text(entry, "yeargroup"),
        question: gsx_text(entry, "question"),
        rating: gsx_rating(entry),
        timestamp: gsx_text(entry, "timestamp"),
    }
}

/// Cell text at `gsx$<column>.$t`, empty when the cell is absent or not a
/// string.
fn gsx_text(entry: &Value, column: &str) -> String {
    entry
        .get(format!("gsx${}", column))
        .and_then(|cell| cell.get("$t"))
        .and_then(Value::as_str)
        .map(|text| text.trim().to_string())
        .unwrap_or_default()
}

fn gsx_rating(entry: &Value) -> Option<i64> {
    let cell = entry.get("gsx$rating").and_then(|cell| cell.get("$t"))?;
    match cell {
        Value::String(text) => parse_rating(text),
        Value::Number(number) => number.as_i64(),
        _ => None,
    }
}

/// Parse a rating cell. Blank or non-numeric cells are `None`; range
/// checking belongs to the validation boundary, not the source.
pub fn parse_rating(cell: &str) -> Option<i64> {
    cell.trim().parse::<i64>().ok()
}
