//! Dashboard and profile rendering.
//!
//! This module turns the aggregated summaries into Markdown views, a
//! JSON report, and the CSV export of a teacher's question table. It
//! reads the summaries and never mutates them.

use anyhow::Result;
use serde::Serialize;

use crate::config::ColorsConfig;
use crate::models::{
    DashboardSnapshot, QuestionSummary, RatingScale, ScoreBand, TeacherProfile, TeacherSummary,
};

/// Generate the whole-school Markdown dashboard.
pub fn generate_markdown_dashboard(
    snapshot: &DashboardSnapshot,
    scale: &RatingScale,
    colors: &ColorsConfig,
) -> String {
    let mut output = String::new();

    output.push_str("# Teacher Evaluation Dashboard\n\n");
    output.push_str(&generate_metadata_section(snapshot));

    output.push_str("## Teachers\n\n");
    if snapshot.teachers.is_empty() {
        output.push_str("No evaluations have been recorded yet.\n");
        return output;
    }

    output.push_str("| Teacher | Year Groups | Responses | Average |\n");
    output.push_str("|:---|:---|:---:|:---:|\n");
    for teacher in &snapshot.teachers {
        output.push_str(&format!(
            "| **{}** | {} | {} | {} |\n",
            teacher.name,
            teacher.year_groups.join(", "),
            teacher.total_responses,
            colored_average(teacher.average_rating, scale, colors),
        ));
    }
    output.push('\n');

    output
}

/// Generate one teacher's Markdown profile: header, star rating, overall
/// rating distribution, and the per-question table.
pub fn generate_markdown_profile(
    snapshot: &DashboardSnapshot,
    profile: &TeacherProfile,
    scale: &RatingScale,
    colors: &ColorsConfig,
) -> String {
    let mut output = String::new();
    let summary = &profile.summary;

    output.push_str(&format!("# {}\n\n", summary.name));
    output.push_str(&format!(
        "School year {} • Source: {}\n\n",
        snapshot.school_year, snapshot.source
    ));

    if profile.questions.is_empty() {
        output.push_str("No evaluations recorded for this teacher.\n");
        return output;
    }

    output.push_str(&format!(
        "{} **{:.1}** • {} evaluations • {}\n\n",
        star_line(summary.average_rating, scale),
        summary.average_rating,
        summary.total_responses,
        summary.year_groups.join(", "),
    ));

    output.push_str(&generate_distribution_section(&profile.questions, scale, colors));
    output.push_str(&generate_question_table(&profile.questions, scale, colors));

    output
}

/// Generate the metadata block shared by the dashboard views.
fn generate_metadata_section(snapshot: &DashboardSnapshot) -> String {
    let mut section = String::new();

    section.push_str("## Overview\n\n");
    section.push_str(&format!("- **School Year:** {}\n", snapshot.school_year));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        snapshot.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Data Source:** {}\n", snapshot.source));
    section.push_str(&format!(
        "- **Teachers:** {}\n",
        snapshot.stats.total_teachers
    ));
    section.push_str(&format!(
        "- **Evaluations:** {}\n",
        snapshot.stats.total_responses
    ));
    if let Some(average) = snapshot.stats.school_average {
        section.push_str(&format!("- **School Average:** {:.1}\n", average));
    }
    section.push('\n');

    section
}

/// Overall response distribution across all of a teacher's questions,
/// one line per rating level, colored with the per-level palette.
fn generate_distribution_section(
    questions: &[QuestionSummary],
    scale: &RatingScale,
    colors: &ColorsConfig,
) -> String {
    let mut section = String::new();

    section.push_str("## Rating Distribution\n\n");
    for level in scale.levels() {
        let count: u64 = questions.iter().map(|q| q.count_at(level)).sum();
        let label = scale
            .label_for(level)
            .map(|label| format!(" ({})", label))
            .unwrap_or_default();
        let line = match colors.ratings.get((level - scale.min) as usize) {
            Some(color) => format!(
                "- <span style=\"color: {}\">Rating {}{}</span>: {}\n",
                color, level, label, count
            ),
            None => format!("- Rating {}{}: {}\n", level, label, count),
        };
        section.push_str(&line);
    }
    section.push('\n');

    section
}

/// The per-question table, one row per question in first-seen order.
fn generate_question_table(
    questions: &[QuestionSummary],
    scale: &RatingScale,
    colors: &ColorsConfig,
) -> String {
    let mut section = String::new();

    section.push_str("## Results by Question\n\n");

    section.push_str("| Question |");
    for column in rating_columns(scale) {
        section.push_str(&format!(" {} |", column));
    }
    section.push_str(" Total | Average |\n");

    section.push_str("|:---|");
    for _ in scale.levels() {
        section.push_str(":---:|");
    }
    section.push_str(":---:|:---:|\n");

    for question in questions {
        section.push_str(&format!("| {} |", question.question));
        for level in scale.levels() {
            section.push_str(&format!(" {} |", question.count_at(level)));
        }
        section.push_str(&format!(
            " **{}** | {} |\n",
            question.total,
            colored_average(question.average, scale, colors),
        ));
    }
    section.push('\n');

    section
}

/// Star rating over the scale span, filled up to the rounded average.
pub fn star_line(average: f64, scale: &RatingScale) -> String {
    let span = scale.span();
    let filled = ((average.round() as i64) - scale.min + 1).clamp(0, span as i64) as usize;
    format!("{}{}", "★".repeat(filled), "☆".repeat(span - filled))
}

/// An average rendered to one decimal, colored by its score band.
fn colored_average(average: f64, scale: &RatingScale, colors: &ColorsConfig) -> String {
    let band = ScoreBand::from_average(average, scale);
    format!(
        "<span style=\"color: {}\">**{:.1}**</span>",
        colors.band_color(band),
        average
    )
}

/// Column headers for the rating levels, lowest first. On the default
/// scale this is exactly `Rating 1` through `Rating 4`.
fn rating_columns(scale: &RatingScale) -> Vec<String> {
    scale.levels().map(|level| format!("Rating {}", level)).collect()
}

/// Export a teacher's question table as CSV, one row per question,
/// averages to one decimal place.
pub fn generate_csv_export(profile: &TeacherProfile, scale: &RatingScale) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec!["Question".to_string()];
    header.extend(rating_columns(scale));
    header.push("Total".to_string());
    header.push("Average".to_string());
    writer.write_record(&header)?;

    for question in &profile.questions {
        let mut row = vec![question.question.clone()];
        for level in scale.levels() {
            row.push(question.count_at(level).to_string());
        }
        row.push(question.total.to_string());
        row.push(format!("{:.1}", question.average));
        writer.write_record(&row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV buffer: {}", e))?;
    Ok(String::from_utf8(bytes)?)
}

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    dashboard: &'a DashboardSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    teacher: Option<&'a TeacherProfile>,
}

/// Generate a JSON report: the snapshot, plus the selected teacher's
/// profile when one is shown.
pub fn generate_json_report(
    snapshot: &DashboardSnapshot,
    profile: Option<&TeacherProfile>,
) -> Result<String> {
    let report = JsonReport {
        dashboard: snapshot,
        teacher: profile,
    };
    serde_json::to_string_pretty(&report).map_err(Into::into)
}

/// One search-result line, mirroring the dashboard search box entries.
pub fn format_search_hit(teacher: &TeacherSummary) -> String {
    format!(
        "{}: {} • {} responses • Avg: {:.1}",
        teacher.name,
        teacher.year_groups.join(", "),
        teacher.total_responses,
        teacher.average_rating
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn snapshot(teachers: Vec<TeacherSummary>) -> DashboardSnapshot {
        let stats = crate::analysis::school_stats(&teachers);
        DashboardSnapshot {
            school_year: "2025/2026".to_string(),
            generated_at: Utc.with_ymd_and_hms(2026, 1, 15, 9, 0, 0).unwrap(),
            source: "sample".to_string(),
            teachers,
            stats,
        }
    }

    fn ana() -> TeacherSummary {
        TeacherSummary {
            name: "Ana".to_string(),
            year_groups: vec!["Year 6".to_string()],
            total_responses: 3,
            average_rating: 10.0 / 3.0,
        }
    }

    fn ana_profile() -> TeacherProfile {
        TeacherProfile {
            summary: ana(),
            questions: vec![
                QuestionSummary {
                    question: "Q1".to_string(),
                    histogram: [(1, 0), (2, 1), (3, 0), (4, 1)].into_iter().collect(),
                    total: 2,
                    average: 3.0,
                },
                QuestionSummary {
                    question: "Hjälper läraren dig, när du behöver det?".to_string(),
                    histogram: [(1, 0), (2, 0), (3, 1), (4, 0)].into_iter().collect(),
                    total: 1,
                    average: 3.0,
                },
            ],
        }
    }

    #[test]
    fn dashboard_lists_teachers_with_stats() {
        let markdown =
            generate_markdown_dashboard(&snapshot(vec![ana()]), &RatingScale::default(), &ColorsConfig::default());

        assert!(markdown.contains("# Teacher Evaluation Dashboard"));
        assert!(markdown.contains("- **School Year:** 2025/2026"));
        assert!(markdown.contains("- **Teachers:** 1"));
        assert!(markdown.contains("| **Ana** | Year 6 | 3 |"));
        assert!(markdown.contains("3.3"));
    }

    #[test]
    fn dashboard_empty_state() {
        let markdown = generate_markdown_dashboard(
            &snapshot(vec![]),
            &RatingScale::default(),
            &ColorsConfig::default(),
        );

        assert!(markdown.contains("No evaluations have been recorded yet."));
        assert!(!markdown.contains("| Teacher |"));
    }

    #[test]
    fn profile_renders_stars_distribution_and_table() {
        let markdown = generate_markdown_profile(
            &snapshot(vec![ana()]),
            &ana_profile(),
            &RatingScale::default(),
            &ColorsConfig::default(),
        );

        assert!(markdown.contains("# Ana"));
        assert!(markdown.contains("★★★☆"));
        assert!(markdown.contains("Rating 2 (Fair)</span>: 1"));
        assert!(markdown.contains("Rating 3 (Good)</span>: 1"));
        assert!(markdown.contains(
            "| Question | Rating 1 | Rating 2 | Rating 3 | Rating 4 | Total | Average |"
        ));
        assert!(markdown.contains("| Q1 | 0 | 1 | 0 | 1 | **2** |"));
    }

    #[test]
    fn profile_empty_state() {
        let profile = TeacherProfile {
            summary: ana(),
            questions: vec![],
        };
        let markdown = generate_markdown_profile(
            &snapshot(vec![]),
            &profile,
            &RatingScale::default(),
            &ColorsConfig::default(),
        );

        assert!(markdown.contains("No evaluations recorded for this teacher."));
    }

    #[test]
    fn star_line_matches_rounded_average() {
        let scale = RatingScale::default();
        assert_eq!(star_line(3.6, &scale), "★★★★");
        assert_eq!(star_line(3.4, &scale), "★★★☆");
        assert_eq!(star_line(1.0, &scale), "★☆☆☆");
    }

    #[test]
    fn csv_export_has_the_fixed_header_and_one_decimal_averages() {
        let csv = generate_csv_export(&ana_profile(), &RatingScale::default()).unwrap();
        let mut lines = csv.lines();

        assert_eq!(
            lines.next(),
            Some("Question,Rating 1,Rating 2,Rating 3,Rating 4,Total,Average")
        );
        assert_eq!(lines.next(), Some("Q1,0,1,0,1,2,3.0"));
        // Question text containing a comma is quoted.
        assert_eq!(
            lines.next(),
            Some("\"Hjälper läraren dig, när du behöver det?\",0,0,1,0,1,3.0")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn json_report_includes_profile_only_when_selected() {
        let snap = snapshot(vec![ana()]);

        let without = generate_json_report(&snap, None).unwrap();
        assert!(without.contains("\"teachers\""));
        assert!(!without.contains("\"teacher\""));

        let profile = ana_profile();
        let with = generate_json_report(&snap, Some(&profile)).unwrap();
        assert!(with.contains("\"teacher\""));
        assert!(with.contains("\"questions\""));
    }

    #[test]
    fn search_hit_line() {
        assert_eq!(
            format_search_hit(&ana()),
            "Ana: Year 6 • 3 responses • Avg: 3.3"
        );
    }
}
