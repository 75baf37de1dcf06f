use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{
    date::{days_in_year, weekday_index, DateKey},
    habit::Habit,
    stats::Completion,
};

pub const DAYS_PER_WEEK: usize = 7;

/// One heatmap column: Monday through Sunday, `None` for days outside the year.
pub type WeekRow = [Option<NaiveDate>; DAYS_PER_WEEK];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonthAnchor {
    /// Zero-based month (January = 0).
    pub month: u32,
    pub week_index: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct HeatmapCell {
    pub date: NaiveDate,
    pub completion: Completion,
    pub level: u8,
    pub is_today: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct YearHeatmap {
    pub year: i32,
    pub weeks: Vec<[Option<HeatmapCell>; DAYS_PER_WEEK]>,
    pub anchors: Vec<MonthAnchor>,
}

impl YearHeatmap {
    pub fn cells(&self) -> impl Iterator<Item = &HeatmapCell> {
        self.weeks.iter().flatten().flatten()
    }

    pub fn cell(&self, date: NaiveDate) -> Option<&HeatmapCell> {
        self.cells().find(|cell| cell.date == date)
    }
}

/// Calendar-aligned week rows for `year`, Monday first.
pub fn layout_weeks(year: i32) -> Vec<WeekRow> {
    let days = days_in_year(year);
    let Some(first) = days.first() else {
        return Vec::new();
    };

    let mut weeks: Vec<WeekRow> = Vec::with_capacity(days.len() / DAYS_PER_WEEK + 2);
    let mut current: WeekRow = [None; DAYS_PER_WEEK];
    let mut slot = weekday_index(*first);
    for day in days {
        current[slot] = Some(day);
        slot += 1;
        if slot == DAYS_PER_WEEK {
            weeks.push(current);
            current = [None; DAYS_PER_WEEK];
            slot = 0;
        }
    }
    if slot > 0 {
        weeks.push(current);
    }
    weeks
}

/// First week row in which each month shows up, judged by the row's first real day.
pub fn month_label_anchors(weeks: &[WeekRow]) -> Vec<MonthAnchor> {
    let mut anchors: Vec<MonthAnchor> = Vec::new();
    for (week_index, week) in weeks.iter().enumerate() {
        let Some(first_day) = week.iter().flatten().next() else {
            continue;
        };
        let month = first_day.month0();
        if anchors.last().map(|anchor| anchor.month) != Some(month) {
            anchors.push(MonthAnchor { month, week_index });
        }
    }
    anchors
}

/// Full heatmap for `year` with completion levels from the given snapshot.
pub fn build_year_heatmap(habits: &[Habit], year: i32, today: NaiveDate) -> YearHeatmap {
    let counts = completions_in_year(habits, year);
    let total = habits.len();
    let weeks = layout_weeks(year);
    let anchors = month_label_anchors(&weeks);

    let weeks = weeks
        .into_iter()
        .map(|week| {
            week.map(|slot| {
                slot.map(|date| {
                    let completion = Completion {
                        completed: counts.get(&DateKey::from_date(date)).copied().unwrap_or(0),
                        total,
                    };
                    HeatmapCell {
                        date,
                        completion,
                        level: completion.level(),
                        is_today: date == today,
                    }
                })
            })
        })
        .collect();

    YearHeatmap {
        year,
        weeks,
        anchors,
    }
}

// Per-day completed counts, one pass over the completion sets.
fn completions_in_year(habits: &[Habit], year: i32) -> HashMap<DateKey, usize> {
    let mut counts: HashMap<DateKey, usize> = HashMap::new();
    for habit in habits {
        for key in habit
            .completed_dates
            .iter()
            .filter(|key| key.date().year() == year)
        {
            *counts.entry(*key).or_default() += 1;
        }
    }
    counts
}
