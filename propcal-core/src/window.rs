//! View windows for the calendar's display modes.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// How many days the agenda view looks ahead.
const AGENDA_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    Month,
    Week,
    Day,
    Agenda,
}

/// The `[start, end]` range the current view mode needs events for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ViewWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        ViewWindow { start, end }
    }

    /// Resolve the window for a view mode anchored at a date.
    ///
    /// Month view pads a week on both sides to cover the partial leading
    /// and trailing weeks the grid shows; week view pads one day; day view
    /// is exactly the single day; agenda runs from now through +30 days.
    pub fn for_view(mode: ViewMode, anchor: NaiveDate) -> Self {
        match mode {
            ViewMode::Month => {
                // Day 1 always exists for the anchor's month
                let first = anchor.with_day(1).unwrap();
                let last = last_day_of_month(first);
                ViewWindow {
                    start: start_of_day(first - Duration::days(7)),
                    end: end_of_day(last + Duration::days(7)),
                }
            }
            ViewMode::Week => {
                let week = anchor.week(Weekday::Sun);
                ViewWindow {
                    start: start_of_day(week.first_day() - Duration::days(1)),
                    end: end_of_day(week.last_day() + Duration::days(1)),
                }
            }
            ViewMode::Day => ViewWindow {
                start: start_of_day(anchor),
                end: end_of_day(anchor),
            },
            ViewMode::Agenda => {
                let now = Utc::now();
                ViewWindow {
                    start: now,
                    end: now + Duration::days(AGENDA_DAYS),
                }
            }
        }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at <= self.end
    }
}

/// Start of day in UTC (00:00:00, always valid)
fn start_of_day(d: NaiveDate) -> DateTime<Utc> {
    d.and_hms_opt(0, 0, 0).unwrap().and_utc()
}

/// End of day in UTC (23:59:59, always valid)
fn end_of_day(d: NaiveDate) -> DateTime<Utc> {
    d.and_hms_opt(23, 59, 59).unwrap().and_utc()
}

fn last_day_of_month(first: NaiveDate) -> NaiveDate {
    let next_month = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    };
    // Day 1 of the following month always exists
    next_month.unwrap() - Duration::days(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_view_pads_a_week_each_side() {
        let window = ViewWindow::for_view(ViewMode::Month, date(2024, 6, 15));

        assert_eq!(window.start, start_of_day(date(2024, 5, 25)));
        assert_eq!(window.end, end_of_day(date(2024, 7, 7)));
    }

    #[test]
    fn test_month_view_handles_december() {
        let window = ViewWindow::for_view(ViewMode::Month, date(2024, 12, 3));

        assert_eq!(window.start, start_of_day(date(2024, 11, 24)));
        assert_eq!(window.end, end_of_day(date(2025, 1, 7)));
    }

    #[test]
    fn test_week_view_pads_one_day_around_sunday_week() {
        // 2024-01-03 is a Wednesday; its Sunday-start week is Dec 31 - Jan 6
        let window = ViewWindow::for_view(ViewMode::Week, date(2024, 1, 3));

        assert_eq!(window.start, start_of_day(date(2023, 12, 30)));
        assert_eq!(window.end, end_of_day(date(2024, 1, 7)));
    }

    #[test]
    fn test_day_view_is_exactly_one_day() {
        let window = ViewWindow::for_view(ViewMode::Day, date(2024, 3, 10));

        assert_eq!(window.start, start_of_day(date(2024, 3, 10)));
        assert_eq!(window.end, end_of_day(date(2024, 3, 10)));
    }

    #[test]
    fn test_agenda_view_spans_thirty_days() {
        let window = ViewWindow::for_view(ViewMode::Agenda, date(2024, 3, 10));

        assert_eq!(window.end - window.start, Duration::days(30));
        assert!(window.contains(window.start + Duration::days(15)));
    }

    #[test]
    fn test_contains_is_inclusive() {
        let window = ViewWindow::for_view(ViewMode::Day, date(2024, 3, 10));

        assert!(window.contains(window.start));
        assert!(window.contains(window.end));
        assert!(!window.contains(window.end + Duration::seconds(1)));
    }
}
