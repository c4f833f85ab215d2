//! Survey aggregation and statistics.
//!
//! This module is the core of the dashboard: pure, deterministic rollups
//! from a flat list of raw evaluation records to the per-teacher and
//! per-question summaries everything else renders. It performs no I/O and
//! holds no state; every call builds fresh output from its inputs.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::models::{
    QuestionSummary, RatingScale, RawEvaluationRecord, SchoolStats, TeacherSummary,
};

/// Name ordering for the teacher list.
///
/// The primary key is the char-wise lowercased name, the exact name breaks
/// ties, so the ordering is total and reproducible across platforms.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
        .then_with(|| a.cmp(b))
}

#[derive(Default)]
struct TeacherAccumulator {
    year_groups: BTreeSet<String>,
    total_responses: u64,
    rating_sum: i64,
}

/// Build the teacher index: one summary per teacher with at least one
/// valid record, sorted by name.
///
/// Single pass. Records with an empty teacher name or a rating off the
/// scale are skipped; an all-malformed (or empty) input yields an empty
/// list, never an error. Duplicate (teacher, question, rating)
/// combinations are all counted. Blank year groups stay out of the
/// year-group set.
pub fn build_teacher_index(
    records: &[RawEvaluationRecord],
    scale: &RatingScale,
) -> Vec<TeacherSummary> {
    let mut accumulators: HashMap<&str, TeacherAccumulator> = HashMap::new();

    for record in records {
        let valid = match record.validate(scale) {
            Some(valid) => valid,
            None => continue,
        };

        let entry = accumulators.entry(valid.teacher).or_default();
        if !valid.year_group.is_empty() {
            entry.year_groups.insert(valid.year_group.to_string());
        }
        entry.total_responses += 1;
        entry.rating_sum += valid.rating;
    }

    let mut teachers: Vec<TeacherSummary> = accumulators
        .into_iter()
        .map(|(name, acc)| TeacherSummary {
            name: name.to_string(),
            year_groups: acc.year_groups.into_iter().collect(),
            total_responses: acc.total_responses,
            average_rating: acc.rating_sum as f64 / acc.total_responses as f64,
        })
        .collect();

    teachers.sort_by(|a, b| compare_names(&a.name, &b.name));
    teachers
}

struct QuestionAccumulator {
    histogram: BTreeMap<i64, u64>,
    total: u64,
    weighted_sum: i64,
}

/// Build the per-question summaries for one teacher.
///
/// Teacher matching is exact and case-sensitive. Questions appear in
/// first-seen order, not sorted. Every histogram is dense over the scale.
/// An unknown teacher yields an empty list, never an error.
pub fn build_question_summaries(
    records: &[RawEvaluationRecord],
    teacher: &str,
    scale: &RatingScale,
) -> Vec<QuestionSummary> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, QuestionAccumulator> = HashMap::new();

    for record in records {
        let valid = match record.validate(scale) {
            Some(valid) => valid,
            None => continue,
        };
        if valid.teacher != teacher {
            continue;
        }

        let entry = groups.entry(valid.question).or_insert_with(|| {
            order.push(valid.question);
            QuestionAccumulator {
                histogram: scale.levels().map(|level| (level, 0)).collect(),
                total: 0,
                weighted_sum: 0,
            }
        });

        *entry.histogram.entry(valid.rating).or_insert(0) += 1;
        entry.total += 1;
        entry.weighted_sum += valid.rating;
    }

    order
        .into_iter()
        .filter_map(|question| {
            groups.remove(question).map(|acc| QuestionSummary {
                question: question.to_string(),
                histogram: acc.histogram,
                total: acc.total,
                average: acc.weighted_sum as f64 / acc.total as f64,
            })
        })
        .collect()
}

/// Whole-school rollup over an already-built teacher index.
pub fn school_stats(teachers: &[TeacherSummary]) -> SchoolStats {
    let total_responses = teachers.iter().map(|t| t.total_responses).sum();
    let school_average = if teachers.is_empty() {
        None
    } else {
        let sum: f64 = teachers.iter().map(|t| t.average_rating).sum();
        Some(sum / teachers.len() as f64)
    };

    SchoolStats {
        total_teachers: teachers.len(),
        total_responses,
        school_average,
    }
}

/// Case-insensitive substring search over the teacher index, capped at
/// `limit` results. Mirrors the dashboard search box.
pub fn search_teachers<'a>(
    teachers: &'a [TeacherSummary],
    query: &str,
    limit: usize,
) -> Vec<&'a TeacherSummary> {
    let needle = query.to_lowercase();
    teachers
        .iter()
        .filter(|t| t.name.to_lowercase().contains(&needle))
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(teacher: &str, year_group: &str, question: &str, rating: Option<i64>) -> RawEvaluationRecord {
        RawEvaluationRecord {
            teacher: teacher.to_string(),
            year_group: year_group.to_string(),
            question: question.to_string(),
            rating,
            timestamp: "2026-01-15 09:12".to_string(),
        }
    }

    fn scale() -> RatingScale {
        RatingScale::default()
    }

    #[test]
    fn empty_input_yields_empty_index() {
        assert!(build_teacher_index(&[], &scale()).is_empty());
    }

    #[test]
    fn single_valid_record() {
        let records = vec![rec("Ana", "Year 6", "Q1", Some(3))];
        let teachers = build_teacher_index(&records, &scale());

        assert_eq!(teachers.len(), 1);
        let ana = &teachers[0];
        assert_eq!(ana.name, "Ana");
        assert_eq!(ana.year_groups, vec!["Year 6".to_string()]);
        assert_eq!(ana.total_responses, 1);
        assert_eq!(ana.average_rating, 3.0);
    }

    #[test]
    fn malformed_records_contribute_nothing() {
        let records = vec![
            rec("Ana", "Year 6", "Q1", Some(4)),
            rec("", "Year 6", "Q1", Some(2)),
            rec("Ana", "Year 6", "Q1", None),
        ];
        let teachers = build_teacher_index(&records, &scale());

        assert_eq!(teachers.len(), 1);
        assert_eq!(teachers[0].total_responses, 1);
        assert_eq!(teachers[0].average_rating, 4.0);
    }

    #[test]
    fn all_malformed_input_is_empty_not_an_error() {
        let records = vec![
            rec("", "", "Q1", Some(2)),
            rec("Ana", "", "Q1", Some(0)),
            rec("Ana", "", "Q1", Some(7)),
            rec("Ana", "", "Q1", None),
        ];
        assert!(build_teacher_index(&records, &scale()).is_empty());
    }

    #[test]
    fn blank_year_groups_stay_out_of_the_set() {
        let records = vec![
            rec("Ana", "", "Q1", Some(3)),
            rec("Ana", "Year 7", "Q1", Some(3)),
            rec("Ana", "Year 6", "Q2", Some(2)),
        ];
        let teachers = build_teacher_index(&records, &scale());

        assert_eq!(
            teachers[0].year_groups,
            vec!["Year 6".to_string(), "Year 7".to_string()]
        );
        assert_eq!(teachers[0].total_responses, 3);
    }

    #[test]
    fn teacher_list_is_sorted_case_insensitively() {
        let records = vec![
            rec("maria", "Year 8", "Q1", Some(3)),
            rec("Ahmed", "Year 9", "Q1", Some(3)),
            rec("Bengtsson", "Year 7", "Q1", Some(3)),
        ];
        let names: Vec<String> = build_teacher_index(&records, &scale())
            .into_iter()
            .map(|t| t.name)
            .collect();

        assert_eq!(names, vec!["Ahmed", "Bengtsson", "maria"]);
    }

    #[test]
    fn swedish_initials_sort_after_z() {
        let records = vec![
            rec("Åsa", "Year 6", "Q1", Some(3)),
            rec("Zlatan", "Year 6", "Q1", Some(3)),
            rec("anna", "Year 6", "Q1", Some(3)),
        ];
        let names: Vec<String> = build_teacher_index(&records, &scale())
            .into_iter()
            .map(|t| t.name)
            .collect();

        assert_eq!(names, vec!["anna", "Zlatan", "Åsa"]);
    }

    #[test]
    fn index_is_idempotent() {
        let records = vec![
            rec("Yoni", "Year 6", "Q1", Some(4)),
            rec("Anna", "Year 4-5", "Q2", Some(3)),
            rec("Yoni", "Year 7", "Q1", Some(2)),
            rec("", "Year 7", "Q1", Some(2)),
        ];
        let first = build_teacher_index(&records, &scale());
        let second = build_teacher_index(&records, &scale());
        assert_eq!(first, second);
    }

    #[test]
    fn response_totals_match_valid_record_count() {
        let records = vec![
            rec("Yoni", "Year 6", "Q1", Some(4)),
            rec("Anna", "Year 4-5", "Q2", Some(3)),
            rec("Yoni", "Year 7", "Q1", Some(2)),
            rec("", "Year 7", "Q1", Some(2)),
            rec("Anna", "Year 6", "Q1", None),
            rec("Anna", "Year 6", "Q1", Some(9)),
        ];
        let valid_count = records
            .iter()
            .filter(|r| r.validate(&scale()).is_some())
            .count() as u64;
        let teachers = build_teacher_index(&records, &scale());
        let summed: u64 = teachers.iter().map(|t| t.total_responses).sum();

        assert_eq!(summed, valid_count);
        assert_eq!(summed, 3);
    }

    #[test]
    fn averages_stay_on_the_scale() {
        let records = vec![
            rec("Yoni", "Year 6", "Q1", Some(1)),
            rec("Yoni", "Year 6", "Q1", Some(4)),
            rec("Anna", "Year 6", "Q2", Some(2)),
            rec("Anna", "Year 6", "Q3", Some(3)),
            rec("Anna", "Year 6", "Q3", Some(4)),
        ];
        let s = scale();
        for teacher in build_teacher_index(&records, &s) {
            assert!(teacher.average_rating >= s.min as f64);
            assert!(teacher.average_rating <= s.max as f64);
            for question in build_question_summaries(&records, &teacher.name, &s) {
                assert!(question.average >= s.min as f64);
                assert!(question.average <= s.max as f64);
            }
        }
    }

    #[test]
    fn question_summaries_keep_first_seen_order() {
        let records = vec![
            rec("Ana", "Year 6", "Q1", Some(4)),
            rec("Ana", "Year 6", "Q1", Some(2)),
            rec("Ana", "Year 6", "Q2", Some(3)),
        ];
        let questions = build_question_summaries(&records, "Ana", &scale());

        assert_eq!(questions.len(), 2);

        let q1 = &questions[0];
        assert_eq!(q1.question, "Q1");
        assert_eq!(q1.count_at(1), 0);
        assert_eq!(q1.count_at(2), 1);
        assert_eq!(q1.count_at(3), 0);
        assert_eq!(q1.count_at(4), 1);
        assert_eq!(q1.total, 2);
        assert_eq!(q1.average, 3.0);

        let q2 = &questions[1];
        assert_eq!(q2.question, "Q2");
        assert_eq!(q2.count_at(3), 1);
        assert_eq!(q2.total, 1);
        assert_eq!(q2.average, 3.0);
    }

    #[test]
    fn unknown_teacher_yields_empty_summaries() {
        let records = vec![rec("Ana", "Year 6", "Q1", Some(4))];
        assert!(build_question_summaries(&records, "Nobody", &scale()).is_empty());
    }

    #[test]
    fn teacher_matching_is_case_sensitive() {
        let records = vec![rec("Ana", "Year 6", "Q1", Some(4))];
        assert!(build_question_summaries(&records, "ana", &scale()).is_empty());
    }

    #[test]
    fn histograms_are_dense_over_the_scale() {
        let records = vec![rec("Ana", "Year 6", "Q1", Some(2))];
        let s = scale();
        let questions = build_question_summaries(&records, "Ana", &s);

        for level in s.levels() {
            assert!(questions[0].histogram.contains_key(&level));
        }
    }

    #[test]
    fn question_totals_sum_to_teacher_totals() {
        let records = vec![
            rec("Yoni", "Year 6", "Q1", Some(4)),
            rec("Yoni", "Year 6", "Q2", Some(3)),
            rec("Yoni", "Year 7", "Q1", Some(2)),
            rec("Anna", "Year 6", "Q1", Some(3)),
            rec("", "Year 6", "Q1", Some(3)),
        ];
        let s = scale();
        for teacher in build_teacher_index(&records, &s) {
            let question_total: u64 = build_question_summaries(&records, &teacher.name, &s)
                .iter()
                .map(|q| q.total)
                .sum();
            assert_eq!(question_total, teacher.total_responses);
        }
    }

    #[test]
    fn duplicate_combinations_all_count() {
        let records = vec![
            rec("Ana", "Year 6", "Q1", Some(4)),
            rec("Ana", "Year 6", "Q1", Some(4)),
            rec("Ana", "Year 6", "Q1", Some(4)),
        ];
        let questions = build_question_summaries(&records, "Ana", &scale());
        assert_eq!(questions[0].count_at(4), 3);
        assert_eq!(questions[0].total, 3);
    }

    #[test]
    fn school_stats_averages_the_teacher_averages() {
        let records = vec![
            rec("Yoni", "Year 6", "Q1", Some(4)),
            rec("Anna", "Year 6", "Q1", Some(2)),
            rec("Anna", "Year 6", "Q2", Some(3)),
        ];
        let teachers = build_teacher_index(&records, &scale());
        let stats = school_stats(&teachers);

        assert_eq!(stats.total_teachers, 2);
        assert_eq!(stats.total_responses, 3);
        // Yoni 4.0, Anna 2.5.
        assert_eq!(stats.school_average, Some(3.25));
    }

    #[test]
    fn school_stats_with_no_teachers() {
        let stats = school_stats(&[]);
        assert_eq!(stats.total_teachers, 0);
        assert_eq!(stats.total_responses, 0);
        assert_eq!(stats.school_average, None);
    }

    #[test]
    fn search_is_case_insensitive_and_capped() {
        let records = vec![
            rec("Anna", "Year 6", "Q1", Some(3)),
            rec("Annika", "Year 6", "Q1", Some(3)),
            rec("Johanna", "Year 6", "Q1", Some(3)),
            rec("Maria", "Year 6", "Q1", Some(3)),
        ];
        let teachers = build_teacher_index(&records, &scale());

        let hits = search_teachers(&teachers, "ann", 5);
        let names: Vec<&str> = hits.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Anna", "Annika", "Johanna"]);

        assert_eq!(search_teachers(&teachers, "ann", 2).len(), 2);
        assert!(search_teachers(&teachers, "zzz", 5).is_empty());
    }
}
