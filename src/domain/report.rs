// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Weekly and monthly workout reports.

use std::collections::{HashMap, HashSet};

use chrono::{Datelike, Days, NaiveDate};

use crate::models::{NameCount, Report, ReportSummary, Workout};

/// Days in the rolling weekly window, today included.
const WEEK_DAYS: u64 = 7;

/// A report bucket relative to the local today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportWindow {
    /// `[today - 6 days, today]`
    LastSevenDays,
    /// Same calendar year and month as today
    ThisMonth,
}

impl ReportWindow {
    /// Calendar-date comparison only, so DST transitions cannot shift a day in or out.
    pub fn contains(self, date: NaiveDate, today: NaiveDate) -> bool {
        match self {
            ReportWindow::LastSevenDays => {
                let start = today
                    .checked_sub_days(Days::new(WEEK_DAYS - 1))
                    .unwrap_or(NaiveDate::MIN);
                date >= start && date <= today
            }
            ReportWindow::ThisMonth => date.year() == today.year() && date.month() == today.month(),
        }
    }
}

/// Summarize the dated workouts that fall in `window`.
pub fn summarize(workouts: &[Workout], window: ReportWindow, today: NaiveDate) -> ReportSummary {
    let in_window: Vec<&Workout> = workouts
        .iter()
        .filter(|w| w.date.is_some_and(|d| window.contains(d, today)))
        .collect();

    let total = in_window.len();
    let completed = in_window.iter().filter(|w| w.completed).count();
    let days_active = in_window
        .iter()
        .filter_map(|w| w.date)
        .collect::<HashSet<_>>()
        .len();

    ReportSummary {
        total,
        completed,
        incomplete: total - completed,
        days_active,
        names: name_frequencies(&in_window),
    }
}

/// Count workouts per trimmed name, most frequent first, ties in first-seen order.
fn name_frequencies(workouts: &[&Workout]) -> Vec<NameCount> {
    let mut names: Vec<NameCount> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for workout in workouts {
        let trimmed = workout.name.trim();
        let name = if trimmed.is_empty() { "Untitled" } else { trimmed };
        match index.get(name) {
            Some(&i) => names[i].count += 1,
            None => {
                index.insert(name.to_string(), names.len());
                names.push(NameCount {
                    name: name.to_string(),
                    count: 1,
                });
            }
        }
    }

    names.sort_by(|a, b| b.count.cmp(&a.count));
    names
}

/// Both report buckets.
pub fn build_report(workouts: &[Workout], today: NaiveDate) -> Report {
    Report {
        weekly: summarize(workouts, ReportWindow::LastSevenDays, today),
        monthly: summarize(workouts, ReportWindow::ThisMonth, today),
    }
}
