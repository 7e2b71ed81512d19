//! Recurrence rules and window-bounded expansion.
//!
//! A recurring native event is expanded into concrete instances that
//! intersect the active view window. Instances are synthetic: they carry an
//! `"{origin}-{YYYY-MM-DD}"` id, are never persisted, and are never
//! individually draggable.

use chrono::{DateTime, Duration, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::event::UnifiedEvent;
use crate::normalize;
use crate::source::CalendarEventRecord;
use crate::window::ViewWindow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// Exactly one end condition is active per rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecurrenceEnd {
    /// No natural end; expansion is bounded by [`ExpansionLimits`].
    Never,
    /// Last occurrence on or before this date.
    OnDate(DateTime<Utc>),
    /// Exactly this many occurrences, the origin start being the first.
    AfterCount(u32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    pub interval: u32,
    pub end: RecurrenceEnd,
}

/// Wire shape as the backend stores it: loose `end_type` plus whichever
/// end field applies.
#[derive(Deserialize)]
struct RawRule {
    frequency: Frequency,
    #[serde(default = "default_interval")]
    interval: u32,
    #[serde(default)]
    end_type: Option<String>,
    #[serde(default)]
    end_date: Option<serde_json::Value>,
    #[serde(default)]
    occurrence_count: Option<u32>,
}

fn default_interval() -> u32 {
    1
}

impl RecurrenceRule {
    /// Parse a rule as stored by the backend: a JSON object, or a
    /// JSON-encoded string containing one. Returns `None` for anything
    /// malformed; callers treat such events as non-recurring (fail-open).
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        let raw: RawRule = match value {
            serde_json::Value::String(s) => serde_json::from_str(s).ok()?,
            _ => serde_json::from_value(value.clone()).ok()?,
        };

        if raw.interval == 0 {
            return None;
        }

        let end = match raw.end_type.as_deref() {
            None | Some("never") => RecurrenceEnd::Never,
            Some("date") => RecurrenceEnd::OnDate(parse_end_date(raw.end_date.as_ref()?)?),
            Some("count") => {
                let count = raw.occurrence_count?;
                if count == 0 {
                    return None;
                }
                RecurrenceEnd::AfterCount(count)
            }
            Some(_) => return None,
        };

        Some(RecurrenceRule {
            frequency: raw.frequency,
            interval: raw.interval,
            end,
        })
    }
}

/// Accept RFC 3339 timestamps or bare YYYY-MM-DD dates (end of day).
fn parse_end_date(value: &serde_json::Value) -> Option<DateTime<Utc>> {
    let s = value.as_str()?;
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    Some(date.and_hms_opt(23, 59, 59).unwrap().and_utc())
}

/// Bounds for expanding rules with no natural end.
#[derive(Debug, Clone, Copy)]
pub struct ExpansionLimits {
    /// Forward horizon for `end_type = never`, in days from now.
    pub horizon_days: i64,
    /// Hard cap on occurrences considered per expansion.
    pub max_iterations: u32,
}

impl Default for ExpansionLimits {
    fn default() -> Self {
        ExpansionLimits {
            horizon_days: 730,
            max_iterations: 1000,
        }
    }
}

/// Expand one native event into the unified instances intersecting
/// `window`.
///
/// Without a (parseable) recurrence rule the event is returned as-is:
/// a single non-instance unified event, not window-filtered. With a rule,
/// every emitted instance starts within the window and preserves the
/// origin event's duration.
pub fn expand_event(
    event: &CalendarEventRecord,
    window: &ViewWindow,
    limits: &ExpansionLimits,
) -> Vec<UnifiedEvent> {
    let rule = match event.recurrence() {
        Some(rule) => rule,
        None => return vec![normalize::native_event(event)],
    };

    let duration = event.end_date - event.start_date;
    let horizon = Utc::now() + Duration::days(limits.horizon_days);

    let mut instances = Vec::new();
    let mut current = event.start_date;
    let mut occurrence: u32 = 0;

    while occurrence < limits.max_iterations && current <= window.end {
        match rule.end {
            RecurrenceEnd::AfterCount(count) if occurrence >= count => break,
            RecurrenceEnd::OnDate(last) if current > last => break,
            RecurrenceEnd::Never if current > horizon => break,
            _ => {}
        }

        if current >= window.start {
            instances.push(instance_at(event, current, duration));
        }

        occurrence += 1;
        current = match step(current, rule.frequency, rule.interval) {
            Some(next) => next,
            None => break,
        };
    }

    instances
}

/// Advance one interval. Month and year steps are calendar-aware:
/// day-of-month clamps on rollover (Jan 31 + 1 month = Feb 29/28).
fn step(current: DateTime<Utc>, frequency: Frequency, interval: u32) -> Option<DateTime<Utc>> {
    match frequency {
        Frequency::Daily => current.checked_add_signed(Duration::days(interval as i64)),
        Frequency::Weekly => current.checked_add_signed(Duration::weeks(interval as i64)),
        Frequency::Monthly => current.checked_add_months(Months::new(interval)),
        Frequency::Yearly => current.checked_add_months(Months::new(interval.checked_mul(12)?)),
    }
}

fn instance_at(
    event: &CalendarEventRecord,
    start: DateTime<Utc>,
    duration: Duration,
) -> UnifiedEvent {
    UnifiedEvent {
        id: format!("{}-{}", event.id, start.format("%Y-%m-%d")),
        original_id: event.id.clone(),
        source_type: crate::source::SourceType::CalendarEvent,
        title: event.title.clone(),
        description: event.description.clone(),
        start_date: start,
        end_date: start + duration,
        location: event.location.clone(),
        meeting_link: event.meeting_link.clone(),
        priority: None,
        assigned_to: None,
        proposal_id: None,
        all_day: event.all_day,
        is_recurring_instance: true,
        can_drag: false,
        can_edit: false,
    }
    .apply_capabilities()
}
