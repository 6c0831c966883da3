//! Date/time and recurrence resolution for raw schedule text.
//!
//! [`resolve`] is a pure function of its input: every call builds its own
//! state, so one item's dates can never bleed into the next item in a
//! batch. Callers get an explicit four-valued outcome instead of a
//! silently-null date, which keeps "nothing there", "couldn't parse" and
//! "parsed as ongoing" distinguishable.

pub mod recurrence;

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use lazy_static::lazy_static;
use regex::Regex;

pub use recurrence::{expand, Occurrence, RecurrenceRule};

/// How long a "permanent / ongoing" exhibition is considered live.
pub const PERMANENT_SPAN_DAYS: i64 = 730;

lazy_static! {
    static ref PERMANENT_RE: Regex = Regex::new(
        r"(?i)\b(ongoing|permanent(?:ly)?|always on view|until further notice|on view now)\b"
    )
    .expect("permanent regex");
    static ref WEEKDAY_RE: Regex = Regex::new(
        r"(?i)\b(mondays?|tuesdays?|wednesdays?|thursdays?|fridays?|saturdays?|sundays?|weekdays|weekends|daily|every day)\b"
    )
    .expect("weekday regex");
    static ref MONTH_DATE_RE: Regex = Regex::new(
        r"(?i)\b(january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sept?|oct|nov|dec)\.?\s+(\d{1,2})(?:st|nd|rd|th)?(?:,?\s*(\d{4}))?"
    )
    .expect("month date regex");
    static ref NUMERIC_DATE_RE: Regex =
        Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b").expect("numeric date regex");
    static ref TIME_RANGE_RE: Regex = Regex::new(
        r"(?i)\b(\d{1,2})(?::(\d{2}))?\s*(am|pm)?\s*(?:-|to|until)\s*(\d{1,2})(?::(\d{2}))?\s*(am|pm)\b"
    )
    .expect("time range regex");
    static ref TIME_RANGE_24H_RE: Regex = Regex::new(
        r"\b([01]?\d|2[0-3]):(\d{2})\s*(?:-|to|until)\s*([01]?\d|2[0-3]):(\d{2})\b"
    )
    .expect("24h range regex");
    static ref SINGLE_TIME_RE: Regex =
        Regex::new(r"(?i)\b(\d{1,2})(?::(\d{2}))?\s*(am|pm)\b").expect("single time regex");
    static ref SINGLE_TIME_24H_RE: Regex =
        Regex::new(r"\b([01]?\d|2[0-3]):(\d{2})\b").expect("24h single time regex");
    static ref THROUGH_RE: Regex =
        Regex::new(r"(?i)\b(through|thru|until|closes)\b").expect("through regex");
}

/// Outcome of resolving one schedule string.
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleOutcome {
    /// A concrete date (possibly a range, possibly with times)
    Concrete {
        start_date: NaiveDate,
        start_time: Option<NaiveTime>,
        end_date: Option<NaiveDate>,
        end_time: Option<NaiveTime>,
    },
    /// Repeats on a set of weekdays at a time of day
    Recurring(RecurrenceRule),
    /// "Ongoing", "permanent collection", etc.
    Permanent,
    /// Nothing matched; the caller discards rather than guessing
    Unresolved,
}

/// Resolve raw schedule text against `today`.
///
/// `today` anchors year defaulting and "through ..." phrasing; passing it
/// explicitly keeps the function deterministic for tests.
pub fn resolve(text: &str, today: NaiveDate) -> ScheduleOutcome {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return ScheduleOutcome::Unresolved;
    }

    // Unify dash variants so range splitting sees a single token
    let norm: String = trimmed
        .chars()
        .map(|c| match c {
            '\u{2013}' | '\u{2014}' | '\u{2212}' => '-',
            c => c,
        })
        .collect();

    if PERMANENT_RE.is_match(&norm) {
        return ScheduleOutcome::Permanent;
    }

    let days = parse_weekdays(&norm);
    let time = parse_time_range(&norm);
    let dates = parse_dates(&norm, today);

    // An explicit date trumps a weekday mention: "Friday, December 5"
    // names one day, not every Friday.
    if dates.is_empty() && !days.is_empty() {
        // A weekday set without a time of day is not expandable
        return match time {
            Some((start_time, end_time)) => ScheduleOutcome::Recurring(RecurrenceRule {
                days,
                start_time,
                end_time,
            }),
            None => ScheduleOutcome::Unresolved,
        };
    }

    if dates.is_empty() {
        return ScheduleOutcome::Unresolved;
    }

    // "Through January 8" style: runs from today until the named date
    if dates.len() == 1 && time.is_none() && THROUGH_RE.is_match(&norm) {
        return ScheduleOutcome::Concrete {
            start_date: today,
            start_time: None,
            end_date: Some(dates[0]),
            end_time: None,
        };
    }

    let start_date = dates[0];
    let mut end_date = dates.get(1).copied();
    let (start_time, end_time) = match time {
        Some((start, end)) => {
            let end = end.or_else(|| Some(default_end(start)));
            (Some(start), end)
        }
        None => (None, None),
    };
    if end_date.is_none() && start_time.is_some() {
        end_date = Some(start_date);
    }

    ScheduleOutcome::Concrete {
        start_date,
        start_time,
        end_date,
        end_time,
    }
}

/// Quick test used by the field extractor to spot schedule-ish text.
pub fn looks_like_schedule(text: &str) -> bool {
    PERMANENT_RE.is_match(text)
        || WEEKDAY_RE.is_match(text)
        || MONTH_DATE_RE.is_match(text)
        || NUMERIC_DATE_RE.is_match(text)
        || SINGLE_TIME_RE.is_match(text)
}

/// Default duration when only a start time is given: one hour.
pub(crate) fn default_end(start: NaiveTime) -> NaiveTime {
    start.overflowing_add_signed(Duration::hours(1)).0
}

fn parse_weekdays(text: &str) -> Vec<Weekday> {
    let mut days = Vec::new();
    let push = |day: Weekday, days: &mut Vec<Weekday>| {
        if !days.contains(&day) {
            days.push(day);
        }
    };

    for caps in WEEKDAY_RE.captures_iter(text) {
        let token = caps[1].to_lowercase();
        match token.as_str() {
            "weekdays" => {
                for day in [
                    Weekday::Mon,
                    Weekday::Tue,
                    Weekday::Wed,
                    Weekday::Thu,
                    Weekday::Fri,
                ] {
                    push(day, &mut days);
                }
            }
            "weekends" => {
                push(Weekday::Sat, &mut days);
                push(Weekday::Sun, &mut days);
            }
            "daily" | "every day" => {
                for day in [
                    Weekday::Mon,
                    Weekday::Tue,
                    Weekday::Wed,
                    Weekday::Thu,
                    Weekday::Fri,
                    Weekday::Sat,
                    Weekday::Sun,
                ] {
                    push(day, &mut days);
                }
            }
            t => {
                let day = match &t[..3] {
                    "mon" => Some(Weekday::Mon),
                    "tue" => Some(Weekday::Tue),
                    "wed" => Some(Weekday::Wed),
                    "thu" => Some(Weekday::Thu),
                    "fri" => Some(Weekday::Fri),
                    "sat" => Some(Weekday::Sat),
                    "sun" => Some(Weekday::Sun),
                    _ => None,
                };
                if let Some(day) = day {
                    push(day, &mut days);
                }
            }
        }
    }
    days
}

/// Parse a time range or single time. A single trailing am/pm marker
/// applies to both bounds ("5:00-6:00 PM" is 17:00 to 18:00).
fn parse_time_range(text: &str) -> Option<(NaiveTime, Option<NaiveTime>)> {
    if let Some(caps) = TIME_RANGE_RE.captures(text) {
        let end_meridiem = caps.get(6).map(|m| m.as_str());
        let start_meridiem = caps.get(3).map(|m| m.as_str());
        let inherited = start_meridiem.is_none();
        let start = to_time(
            &caps[1],
            caps.get(2).map(|m| m.as_str()),
            start_meridiem.or(end_meridiem),
        )?;
        let end = to_time(&caps[4], caps.get(5).map(|m| m.as_str()), end_meridiem)?;

        // "11 - 1pm" means 11am; only second-guess inherited meridiems
        let start = if inherited && start > end {
            start
                .overflowing_sub_signed(Duration::hours(12))
                .0
                .min(start)
        } else {
            start
        };
        return Some((start, Some(end)));
    }

    if let Some(caps) = TIME_RANGE_24H_RE.captures(text) {
        let start = to_time(&caps[1], caps.get(2).map(|m| m.as_str()), None)?;
        let end = to_time(&caps[3], caps.get(4).map(|m| m.as_str()), None)?;
        return Some((start, Some(end)));
    }

    if let Some(caps) = SINGLE_TIME_RE.captures(text) {
        let start = to_time(
            &caps[1],
            caps.get(2).map(|m| m.as_str()),
            caps.get(3).map(|m| m.as_str()),
        )?;
        return Some((start, None));
    }

    if let Some(caps) = SINGLE_TIME_24H_RE.captures(text) {
        let start = to_time(&caps[1], caps.get(2).map(|m| m.as_str()), None)?;
        return Some((start, None));
    }

    None
}

fn to_time(hour: &str, minute: Option<&str>, meridiem: Option<&str>) -> Option<NaiveTime> {
    let hour: u32 = hour.parse().ok()?;
    let minute: u32 = minute.map(|m| m.parse().ok()).unwrap_or(Some(0))?;
    let hour = match meridiem.map(|m| m.to_lowercase()) {
        Some(m) if m == "pm" && hour < 12 => hour + 12,
        Some(m) if m == "am" && hour == 12 => 0,
        _ => hour,
    };
    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Extract calendar dates in textual order, defaulting missing years to
/// the most specific evidence available (a later explicit year, else the
/// current year). "December 5 - January 8, 2026" starts in 2025.
fn parse_dates(text: &str, today: NaiveDate) -> Vec<NaiveDate> {
    let mut parts: Vec<(usize, u32, u32, Option<i32>)> = Vec::new();

    for caps in MONTH_DATE_RE.captures_iter(text) {
        let position = caps.get(0).map(|m| m.start()).unwrap_or(0);
        let month = match &caps[1].to_lowercase()[..3] {
            "jan" => 1,
            "feb" => 2,
            "mar" => 3,
            "apr" => 4,
            "may" => 5,
            "jun" => 6,
            "jul" => 7,
            "aug" => 8,
            "sep" => 9,
            "oct" => 10,
            "nov" => 11,
            "dec" => 12,
            _ => continue,
        };
        let Ok(day) = caps[2].parse::<u32>() else {
            continue;
        };
        let year = caps.get(3).and_then(|y| y.as_str().parse::<i32>().ok());
        parts.push((position, month, day, year));
    }

    for caps in NUMERIC_DATE_RE.captures_iter(text) {
        let position = caps.get(0).map(|m| m.start()).unwrap_or(0);
        let (Ok(month), Ok(day), Ok(year)) = (
            caps[1].parse::<u32>(),
            caps[2].parse::<u32>(),
            caps[3].parse::<i32>(),
        ) else {
            continue;
        };
        parts.push((position, month, day, Some(year)));
    }

    parts.sort_by_key(|p| p.0);

    let fallback_year = parts
        .iter()
        .rev()
        .find_map(|p| p.3)
        .unwrap_or_else(|| today.year());

    let mut dates: Vec<NaiveDate> = parts
        .into_iter()
        .filter_map(|(_, month, day, year)| {
            NaiveDate::from_ymd_opt(year.unwrap_or(fallback_year), month, day)
        })
        .collect();

    // A range that appears to run backwards crosses a year boundary
    if dates.len() == 2 && dates[0] > dates[1] {
        if let Some(adjusted) =
            NaiveDate::from_ymd_opt(dates[0].year() - 1, dates[0].month(), dates[0].day())
        {
            dates[0] = adjusted;
        }
    }

    dates
}
