//! Read-only summaries over stored progress for the dashboard.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::catalog::Subject;
use crate::models::{HistoryEntry, ProgressMap};

/// Subjects shown on the dashboard.
pub const DASHBOARD_SUBJECT_LIMIT: usize = 4;

/// Shown instead of an empty chart before any score has been recorded.
pub const PLACEHOLDER_TREND: [(&str, u8); 6] = [
    ("January", 65),
    ("February", 72),
    ("March", 80),
    ("April", 78),
    ("May", 85),
    ("June", 92),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectCompletion {
    pub subject: String,
    pub percent: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthlyAverage {
    pub year: i32,
    pub month: u32,
    pub average: u8,
}

impl MonthlyAverage {
    /// e.g. "March 2025".
    pub fn label(&self) -> String {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .map(|d| d.format("%B %Y").to_string())
            .unwrap_or_else(|| format!("{}-{:02}", self.year, self.month))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendPoint {
    pub label: String,
    pub score: u8,
    pub placeholder: bool,
}

/// Percent of each subject's configured chapters that have any recorded score.
pub fn subject_completion(subjects: &[Subject], progress: &ProgressMap) -> Vec<SubjectCompletion> {
    subjects
        .iter()
        .map(|subject| {
            let total = subject.chapters.len();
            let completed = progress
                .get(subject.name)
                .map(|p| {
                    subject
                        .chapters
                        .iter()
                        .filter(|c| p.chapters.get(**c).is_some_and(|cp| cp.has_any_score()))
                        .count()
                })
                .unwrap_or(0);
            let percent = if total == 0 {
                0
            } else {
                (100.0 * completed as f64 / total as f64).round() as u8
            };
            SubjectCompletion {
                subject: subject.name.to_string(),
                percent,
            }
        })
        .collect()
}

/// Completion for the first few subjects only.
pub fn dashboard_subjects(subjects: &[Subject], progress: &ProgressMap) -> Vec<SubjectCompletion> {
    let shown = &subjects[..subjects.len().min(DASHBOARD_SUBJECT_LIMIT)];
    subject_completion(shown, progress)
}

/// Average score per calendar month (UTC), oldest month first.
pub fn monthly_average_scores(history: &[HistoryEntry]) -> Vec<MonthlyAverage> {
    let mut months: BTreeMap<(i32, u32), (u64, u64)> = BTreeMap::new();
    for entry in history {
        let key = (entry.timestamp.year(), entry.timestamp.month());
        let (sum, count) = months.entry(key).or_insert((0, 0));
        *sum += u64::from(entry.score);
        *count += 1;
    }
    months
        .into_iter()
        .map(|((year, month), (sum, count))| MonthlyAverage {
            year,
            month,
            average: (sum as f64 / count as f64).round() as u8,
        })
        .collect()
}

/// Points for the performance chart, falling back to the placeholder trend.
pub fn performance_trend(history: &[HistoryEntry]) -> Vec<TrendPoint> {
    let averages = monthly_average_scores(history);
    if averages.is_empty() {
        return PLACEHOLDER_TREND
            .iter()
            .map(|(label, score)| TrendPoint {
                label: label.to_string(),
                score: *score,
                placeholder: true,
            })
            .collect();
    }
    averages
        .iter()
        .map(|m| TrendPoint {
            label: m.label(),
            score: m.average,
            placeholder: false,
        })
        .collect()
}
