//! Data models for the evaluation dashboard.
//!
//! This module contains the core data structures used throughout the
//! application: raw survey records, the validated view the aggregator
//! consumes, and the derived per-teacher / per-question summaries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The closed integer rating scale used for all ratings.
///
/// The default mirrors the survey forms: four ordered levels, 1 to 4.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingScale {
    /// Lowest valid rating level (inclusive).
    pub min: i64,
    /// Highest valid rating level (inclusive).
    pub max: i64,
    /// One label per level, lowest first.
    pub labels: Vec<String>,
}

impl Default for RatingScale {
    fn default() -> Self {
        Self {
            min: 1,
            max: 4,
            labels: ["Poor", "Fair", "Good", "Excellent"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl RatingScale {
    /// Number of levels on the scale.
    pub fn span(&self) -> usize {
        (self.max - self.min + 1) as usize
    }

    /// Iterate every level from lowest to highest.
    pub fn levels(&self) -> impl Iterator<Item = i64> {
        self.min..=self.max
    }

    /// Whether a rating lies on the scale.
    pub fn contains(&self, rating: i64) -> bool {
        (self.min..=self.max).contains(&rating)
    }

    /// Label for a level, if the scale carries one.
    pub fn label_for(&self, level: i64) -> Option<&str> {
        if !self.contains(level) {
            return None;
        }
        self.labels
            .get((level - self.min) as usize)
            .map(String::as_str)
    }

    /// Check the scale is well-formed: ascending bounds and one label per level.
    pub fn validate(&self) -> Result<(), String> {
        if self.min >= self.max {
            return Err(format!(
                "rating scale min ({}) must be below max ({})",
                self.min, self.max
            ));
        }
        if !self.labels.is_empty() && self.labels.len() != self.span() {
            return Err(format!(
                "rating scale has {} levels but {} labels",
                self.span(),
                self.labels.len()
            ));
        }
        Ok(())
    }
}

/// One raw survey row, as translated by a data source.
///
/// Sources never reject rows; whatever shape the export had is carried
/// here and judged once, at [`RawEvaluationRecord::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvaluationRecord {
    /// Teacher the evaluation is about. Empty when the cell was blank.
    pub teacher: String,
    /// Year group of the respondent. May be empty.
    pub year_group: String,
    /// Free-text question the rating answers.
    pub question: String,
    /// Parsed rating, `None` when the cell was blank or not a number.
    pub rating: Option<i64>,
    /// Submission timestamp as exported. Informational only.
    pub timestamp: String,
}

impl RawEvaluationRecord {
    /// The validation boundary: a record contributes to aggregates only if
    /// it names a teacher and carries a rating on the scale. Everything
    /// else is dropped silently, which is the steady state for free-text
    /// survey exports.
    pub fn validate<'a>(&'a self, scale: &RatingScale) -> Option<ValidEvaluation<'a>> {
        if self.teacher.is_empty() {
            return None;
        }
        match self.rating {
            Some(rating) if scale.contains(rating) => Some(ValidEvaluation {
                teacher: &self.teacher,
                year_group: &self.year_group,
                question: &self.question,
                rating,
            }),
            _ => None,
        }
    }
}

/// A record that passed validation; the only shape aggregation ever sees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidEvaluation<'a> {
    pub teacher: &'a str,
    pub year_group: &'a str,
    pub question: &'a str,
    pub rating: i64,
}

/// Aggregate statistics for one teacher across all their evaluations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeacherSummary {
    /// Teacher name (unique key).
    pub name: String,
    /// Year groups that evaluated this teacher, sorted, blanks excluded.
    pub year_groups: Vec<String>,
    /// Count of valid evaluation records.
    pub total_responses: u64,
    /// Mean rating over those records.
    pub average_rating: f64,
}

/// Aggregate statistics for one question, scoped to a single teacher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionSummary {
    /// Question text (unique key within the teacher's scope).
    pub question: String,
    /// Response count per rating level. Dense: every scale level is
    /// present, even at zero.
    pub histogram: BTreeMap<i64, u64>,
    /// Sum of the histogram counts.
    pub total: u64,
    /// Weighted mean rating for this question.
    pub average: f64,
}

impl QuestionSummary {
    /// Count at one rating level (zero for levels off the scale).
    pub fn count_at(&self, level: i64) -> u64 {
        self.histogram.get(&level).copied().unwrap_or(0)
    }
}

/// Whole-school statistics shown in the dashboard header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchoolStats {
    /// Number of teachers with at least one valid evaluation.
    pub total_teachers: usize,
    /// Valid evaluation records across all teachers.
    pub total_responses: u64,
    /// Mean of the teacher averages, `None` with no teachers.
    pub school_average: Option<f64>,
}

/// Score banding for an average rating, used to color the tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    Low,
    Mid,
    High,
}

impl ScoreBand {
    /// Band an average on the given scale. Thresholds sit half a level
    /// below the top and at the midpoint, which on the default 1-4 scale
    /// gives the 3.5 / 2.5 cutoffs the dashboard has always used.
    pub fn from_average(average: f64, scale: &RatingScale) -> Self {
        let midpoint = (scale.min as f64 + scale.max as f64) / 2.0;
        if average >= scale.max as f64 - 0.5 {
            ScoreBand::High
        } else if average >= midpoint {
            ScoreBand::Mid
        } else {
            ScoreBand::Low
        }
    }
}

impl fmt::Display for ScoreBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreBand::Low => write!(f, "low"),
            ScoreBand::Mid => write!(f, "mid"),
            ScoreBand::High => write!(f, "high"),
        }
    }
}

/// Everything one aggregation pass produces for the whole school.
///
/// Built fresh per load and passed by reference into rendering; nothing
/// mutates it afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    /// School-year label from configuration.
    pub school_year: String,
    /// When this snapshot was computed.
    pub generated_at: DateTime<Utc>,
    /// Where the records came from (sheet URL, file path, or "sample").
    pub source: String,
    /// Teachers in locale-aware name order.
    pub teachers: Vec<TeacherSummary>,
    /// Whole-school rollup.
    pub stats: SchoolStats,
}

/// One teacher's drill-down view: their summary plus per-question rollups.
#[derive(Debug, Clone, Serialize)]
pub struct TeacherProfile {
    pub summary: TeacherSummary,
    /// Question summaries in first-seen order.
    pub questions: Vec<QuestionSummary>,
}
