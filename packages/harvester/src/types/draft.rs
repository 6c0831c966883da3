//! Event drafts, categories and expansion windows.

use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::extraction::{Confidence, ExtractionTier};

/// Kind of event the caller is harvesting for. Drives the keyword lists
/// used by discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    Exhibition,
    Tour,
    Any,
}

impl EventCategory {
    /// Keywords matched against URL paths and anchor text during discovery.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Self::Exhibition => &["exhibition", "exhibit", "on-view", "on view", "gallery"],
            Self::Tour => &["tour", "guided", "walk", "highlights"],
            Self::Any => &[
                "exhibition",
                "exhibit",
                "on-view",
                "on view",
                "tour",
                "guided",
                "event",
                "calendar",
                "whats-on",
                "what's on",
            ],
        }
    }

    /// Conventional paths probed by the URL-pattern strategy.
    pub fn probe_paths(&self) -> &'static [&'static str] {
        match self {
            Self::Exhibition => &[
                "/exhibitions",
                "/current-exhibitions",
                "/exhibitions/current",
                "/on-view",
                "/whats-on",
                "/art/exhibitions",
            ],
            Self::Tour => &[
                "/tours",
                "/guided-tours",
                "/visit/tours",
                "/events/tours",
                "/tours-and-talks",
            ],
            Self::Any => &[
                "/exhibitions",
                "/current-exhibitions",
                "/on-view",
                "/whats-on",
                "/tours",
                "/guided-tours",
                "/events",
                "/calendar",
            ],
        }
    }

    /// True if a URL path or anchor text looks like this category.
    pub fn matches(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.keywords().iter().any(|k| lower.contains(k))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exhibition => "exhibition",
            Self::Tour => "tour",
            Self::Any => "any",
        }
    }
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Caller-supplied window that recurrence rules are expanded into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeWindow {
    Today,
    Tomorrow,
    /// Today through the coming Sunday
    ThisWeek,
    /// Today through the last day of the current month
    ThisMonth,
    Range {
        start: NaiveDate,
        end: NaiveDate,
    },
}

impl TimeWindow {
    /// Resolve to inclusive `[start, end]` calendar bounds.
    pub fn bounds(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            Self::Today => (today, today),
            Self::Tomorrow => {
                let t = today + Duration::days(1);
                (t, t)
            }
            Self::ThisWeek => {
                let to_sunday = 6 - today.weekday().num_days_from_monday() as i64;
                (today, today + Duration::days(to_sunday))
            }
            Self::ThisMonth => {
                let next_month = if today.month() == 12 {
                    NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)
                } else {
                    NaiveDate::from_ymd_opt(today.year(), today.month() + 1, 1)
                };
                let last = next_month
                    .map(|d| d - Duration::days(1))
                    .unwrap_or(today);
                (today, last)
            }
            Self::Range { start, end } => (*start, *end),
        }
    }
}

/// One concrete calendar occurrence ready for the persistence collaborator.
///
/// Created by recurrence expansion, annotated by the venue matcher and
/// filtered by the deduplicator. Always carries a non-null `start_date`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDraft {
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub start_date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_date: Option<NaiveDate>,
    pub end_time: Option<NaiveTime>,
    pub location_text: Option<String>,
    pub venue_id: Option<Uuid>,
    pub city_id: Option<Uuid>,
    pub source_url: String,
    pub event_type: EventCategory,
    pub tier: ExtractionTier,
    pub confidence: Confidence,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    #[test]
    fn test_window_today_and_tomorrow() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        assert_eq!(TimeWindow::Today.bounds(today), (today, today));
        let tomorrow = NaiveDate::from_ymd_opt(2026, 3, 11).unwrap();
        assert_eq!(TimeWindow::Tomorrow.bounds(today), (tomorrow, tomorrow));
    }

    #[test]
    fn test_window_this_week_ends_sunday() {
        // 2026-03-10 is a Tuesday
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        assert_eq!(today.weekday(), Weekday::Tue);
        let (start, end) = TimeWindow::ThisWeek.bounds(today);
        assert_eq!(start, today);
        assert_eq!(end, NaiveDate::from_ymd_opt(2026, 3, 15).unwrap());
        assert_eq!(end.weekday(), Weekday::Sun);
    }

    #[test]
    fn test_window_this_month_handles_december() {
        let today = NaiveDate::from_ymd_opt(2025, 12, 20).unwrap();
        let (_, end) = TimeWindow::ThisMonth.bounds(today);
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
    }

    #[test]
    fn test_category_matching() {
        assert!(EventCategory::Exhibition.matches("/current-exhibitions"));
        assert!(EventCategory::Tour.matches("Daily Guided Tours"));
        assert!(!EventCategory::Tour.matches("/shop"));
    }
}
