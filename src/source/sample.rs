//! Built-in sample dataset.
//!
//! The canonical records the dashboard falls back to when no sheet is
//! configured or the fetch fails. These are raw records, not
//! pre-computed summaries: the sample path runs through the exact same
//! aggregation pipeline as fetched data.

use crate::models::RawEvaluationRecord;

const Q_ON_TIME: &str = "Börjar lektionerna i tid?";
const Q_HELP: &str = "Får du den hjälpen du behöver?";
const Q_EXPLAINS: &str = "Förklarar läraren så att du förstår?";
const Q_CALM: &str = "Är det arbetsro på lektionerna?";

/// The canonical sample records.
pub fn records() -> Vec<RawEvaluationRecord> {
    let rows: &[(&str, &str, &str, i64)] = &[
        ("Yoni", "Year 6", Q_ON_TIME, 4),
        ("Yoni", "Year 6", Q_ON_TIME, 3),
        ("Yoni", "Year 7", Q_ON_TIME, 4),
        ("Yoni", "Year 6", Q_HELP, 4),
        ("Yoni", "Year 7", Q_HELP, 3),
        ("Yoni", "Year 7", Q_EXPLAINS, 4),
        ("Anna", "Year 4-5", Q_ON_TIME, 4),
        ("Anna", "Year 6", Q_ON_TIME, 4),
        ("Anna", "Year 4-5", Q_HELP, 4),
        ("Anna", "Year 6", Q_HELP, 3),
        ("Anna", "Year 6", Q_EXPLAINS, 4),
        ("Bengtsson", "Year 7", Q_ON_TIME, 3),
        ("Bengtsson", "Year 8", Q_ON_TIME, 4),
        ("Bengtsson", "Year 7", Q_HELP, 3),
        ("Bengtsson", "Year 8", Q_HELP, 4),
        ("Bengtsson", "Year 7", Q_CALM, 4),
        ("Bengtsson", "Year 8", Q_CALM, 2),
        ("Maria", "Year 8", Q_ON_TIME, 4),
        ("Maria", "Year 9", Q_ON_TIME, 4),
        ("Maria", "Year 8", Q_EXPLAINS, 4),
        ("Maria", "Year 9", Q_EXPLAINS, 4),
        ("Maria", "Year 9", Q_HELP, 3),
        ("Ahmed", "Year 9", Q_ON_TIME, 4),
        ("Ahmed", "Year 9", Q_ON_TIME, 3),
        ("Ahmed", "Year 9", Q_HELP, 3),
        ("Ahmed", "Year 9", Q_HELP, 4),
        ("Ahmed", "Year 9", Q_CALM, 3),
        ("Ahmed", "Year 9", Q_CALM, 4),
    ];

    rows.iter()
        .map(|&(teacher, year_group, question, rating)| RawEvaluationRecord {
            teacher: teacher.to_string(),
            year_group: year_group.to_string(),
            question: question.to_string(),
            rating: Some(rating),
            timestamp: String::new(),
        })
        .collect()
}
