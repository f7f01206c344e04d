//! Calendar arithmetic for the campaign timeline cursor.
//!
//! Turn advancement moves the cursor one month at a time, wrapping past
//! December into the next year. The secondary growth metric advances a
//! derived copy by whole-day increments, which needs real calendar math
//! (chrono) rather than field arithmetic.

use chrono::{Datelike, Days, NaiveDate};
use trailhead_types::Timeline;

/// Advance the cursor by one month, wrapping past December.
pub fn advance_month(timeline: &mut Timeline) {
    timeline.month = timeline.month.saturating_add(1);
    if timeline.month > 12 {
        timeline.month = 1;
        timeline.year = timeline.year.saturating_add(1);
    }
}

/// Return a copy of the cursor advanced by `days` calendar days.
///
/// The input day is clamped to the last valid day of its month before the
/// addition, so catalog-supplied cursors like February 30 do not panic.
/// If the addition overflows the calendar range the input is returned
/// unchanged.
#[must_use]
pub fn add_days(timeline: Timeline, days: u64) -> Timeline {
    let Some(date) = to_date(timeline) else {
        return timeline;
    };
    date.checked_add_days(Days::new(days)).map_or(timeline, |advanced| Timeline {
        year: advanced.year(),
        month: advanced.month(),
        day: advanced.day(),
    })
}

/// Format the cursor as a long-form date, e.g. `January 1, 2025`.
#[must_use]
pub fn format(timeline: &Timeline) -> String {
    to_date(*timeline).map_or_else(
        || format!("{}-{:02}-{:02}", timeline.year, timeline.month, timeline.day),
        |date| date.format("%B %-d, %Y").to_string(),
    )
}

/// Convert the cursor to a calendar date, clamping the day downward until
/// it names a real date in the month. Returns `None` if the month itself
/// is out of range.
fn to_date(timeline: Timeline) -> Option<NaiveDate> {
    if !(1..=12).contains(&timeline.month) {
        return None;
    }
    let mut day = timeline.day.max(1);
    while day >= 1 {
        if let Some(date) = NaiveDate::from_ymd_opt(timeline.year, timeline.month, day) {
            return Some(date);
        }
        day = day.saturating_sub(1);
    }
    None
}
