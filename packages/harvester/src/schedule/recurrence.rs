//! Recurrence rules and their expansion into concrete occurrences.

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::types::TimeWindow;

/// "Repeats on these weekdays at this time of day."
///
/// `end_time` of `None` means the default one-hour duration at expansion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub days: Vec<Weekday>,
    pub start_time: NaiveTime,
    pub end_time: Option<NaiveTime>,
}

/// One expanded calendar instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

/// Expand a rule into one occurrence per matching calendar date inside
/// the window.
pub fn expand(rule: &RecurrenceRule, window: &TimeWindow, today: NaiveDate) -> Vec<Occurrence> {
    let (start, end) = window.bounds(today);
    if start > end {
        return Vec::new();
    }

    let end_time = rule.end_time.unwrap_or_else(|| super::default_end(rule.start_time));

    start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| rule.days.contains(&d.weekday()))
        .map(|date| Occurrence {
            date,
            start_time: rule.start_time,
            end_time,
        })
        .collect()
}
