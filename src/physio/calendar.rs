//! Activity views over the session log.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::dates::format_day;
use crate::models::SessionEntry;

/// Days shown in the consistency tracker.
pub const CONSISTENCY_WINDOW_DAYS: i64 = 14;

/// Bars shown in the recent-minutes chart.
pub const WEEKLY_CHART_ENTRIES: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub day_of_month: u32,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartBar {
    pub date: String,
    pub exercise: String,
    pub duration: u32,
}

/// The last fourteen days ending with `today`, oldest first. A day is
/// active when at least one logged session carries its date.
pub fn consistency_window(log: &[SessionEntry], today: NaiveDate) -> Vec<CalendarDay> {
    let active: HashSet<&str> = log.iter().map(|e| e.date.as_str()).collect();

    (0..CONSISTENCY_WINDOW_DAYS)
        .rev()
        .map(|offset| {
            let date = today - chrono::Duration::days(offset);
            CalendarDay {
                date,
                day_of_month: date.day(),
                is_active: active.contains(format_day(date).as_str()),
            }
        })
        .collect()
}

/// The most recent sessions in log order. These are the last entries, not
/// the last calendar days: two sessions on one day are two bars.
pub fn weekly_chart(log: &[SessionEntry]) -> Vec<ChartBar> {
    let start = log.len().saturating_sub(WEEKLY_CHART_ENTRIES);
    log[start..]
        .iter()
        .map(|e| ChartBar {
            date: e.date.clone(),
            exercise: e.exercise.clone(),
            duration: e.duration,
        })
        .collect()
}
