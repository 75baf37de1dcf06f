//! Derived statistics over a habit snapshot.
//!
//! Everything here is a pure function of its arguments: the same snapshot and
//! reference date always produce the same numbers, and nothing is mutated.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{
    date::{DateKey, DaySelection},
    habit::{Categories, Habit, HabitId},
};

/// Number of days covered by [`weekly_rate`].
pub const WEEK_WINDOW_DAYS: u64 = 7;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Completion {
    pub completed: usize,
    pub total: usize,
}

impl Completion {
    pub fn level(self) -> u8 {
        completion_level(self.completed, self.total)
    }

    /// Share of completed habits as a rounded percentage, 0 when there are none.
    pub fn percent(self) -> u32 {
        rounded_percent(self.completed as u64, self.total as u64)
    }

    pub fn is_full(self) -> bool {
        self.total > 0 && self.completed == self.total
    }
}

pub fn daily_completion(habits: &[Habit], date: NaiveDate) -> Completion {
    completion_of(habits.iter(), date)
}

pub fn category_completion(habits: &[Habit], category: &str, date: NaiveDate) -> Completion {
    completion_of(habits.iter().filter(|habit| habit.category == category), date)
}

fn completion_of<'a>(habits: impl Iterator<Item = &'a Habit>, date: NaiveDate) -> Completion {
    let key = DateKey::from_date(date);
    habits.fold(Completion::default(), |mut acc, habit| {
        acc.total += 1;
        if habit.completed_dates.contains(&key) {
            acc.completed += 1;
        }
        acc
    })
}

/// Days on which every habit was completed, counted backward from `reference`.
///
/// A streak can never be longer than the smallest completion set in the snapshot, so
/// the walk is capped there and always terminates.
pub fn current_streak(habits: &[Habit], reference: NaiveDate) -> u32 {
    let Some(limit) = habits.iter().map(|habit| habit.completed_dates.len()).min() else {
        return 0;
    };
    let mut streak = 0;
    for day in days_back(reference, limit as u64) {
        if !daily_completion(habits, day).is_full() {
            break;
        }
        streak += 1;
    }
    streak
}

/// Completed share of all habit slots in `[reference - 6, reference]`, in percent.
pub fn weekly_rate(habits: &[Habit], reference: NaiveDate) -> u32 {
    if habits.is_empty() {
        return 0;
    }
    let completed: usize = days_back(reference, WEEK_WINDOW_DAYS)
        .map(|day| daily_completion(habits, day).completed)
        .sum();
    let possible = WEEK_WINDOW_DAYS * habits.len() as u64;
    rounded_percent(completed as u64, possible)
}

/// Heatmap intensity 0..=4 for `completed` out of `total`.
///
/// Ratios sitting exactly on a quarter boundary fall into the lower bucket.
pub fn completion_level(completed: usize, total: usize) -> u8 {
    if total == 0 || completed == 0 {
        return 0;
    }
    let (completed, total) = (completed as u64, total as u64);
    if completed * 4 <= total {
        1
    } else if completed * 2 <= total {
        2
    } else if completed * 4 <= total * 3 {
        3
    } else {
        4
    }
}

// round-half-up of 100 * part / whole
fn rounded_percent(part: u64, whole: u64) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((200 * part + whole) / (2 * whole)) as u32
}

fn days_back(reference: NaiveDate, count: u64) -> impl Iterator<Item = NaiveDate> {
    (0..count).map_while(move |offset| reference.checked_sub_days(Days::new(offset)))
}

/// Numbers shown at the top of the dashboard.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DashboardSummary {
    pub selected: NaiveDate,
    pub selected_completion: Completion,
    pub streak: u32,
    pub weekly_rate: u32,
    pub habit_count: usize,
}

/// Completion for the selected day; streak and weekly rate always end at today.
pub fn dashboard_summary(habits: &[Habit], selection: &DaySelection) -> DashboardSummary {
    DashboardSummary {
        selected: selection.selected,
        selected_completion: daily_completion(habits, selection.selected),
        streak: current_streak(habits, selection.today),
        weekly_rate: weekly_rate(habits, selection.today),
        habit_count: habits.len(),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HabitStatus {
    pub id: HabitId,
    pub name: String,
    pub done: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryGroup {
    pub category: String,
    pub habits: Vec<HabitStatus>,
    pub completion: Completion,
}

/// Habits grouped per configured category for `date`. Empty categories are left out.
pub fn group_by_category(
    habits: &[Habit],
    categories: &Categories,
    date: NaiveDate,
) -> Vec<CategoryGroup> {
    categories
        .iter()
        .filter_map(|category| {
            let members: Vec<HabitStatus> = habits
                .iter()
                .filter(|habit| habit.category == category)
                .map(|habit| HabitStatus {
                    id: habit.id,
                    name: habit.name.clone(),
                    done: habit.is_completed_on(date),
                })
                .collect();
            if members.is_empty() {
                return None;
            }
            let completion = Completion {
                completed: members.iter().filter(|status| status.done).count(),
                total: members.len(),
            };
            Some(CategoryGroup {
                category: category.to_string(),
                habits: members,
                completion,
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryDay {
    pub date: NaiveDate,
    pub done: bool,
}

/// One habit's recent record, oldest day first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HabitHistory {
    pub id: HabitId,
    pub days: Vec<HistoryDay>,
    pub streak: u32,
}

impl HabitHistory {
    pub fn completion(&self) -> Completion {
        Completion {
            completed: self.days.iter().filter(|day| day.done).count(),
            total: self.days.len(),
        }
    }
}

pub fn habit_history(habit: &Habit, days: usize, reference: NaiveDate) -> HabitHistory {
    let mut record: Vec<HistoryDay> = days_back(reference, days as u64)
        .map(|date| HistoryDay {
            date,
            done: habit.is_completed_on(date),
        })
        .collect();
    record.reverse();

    let streak = days_back(reference, habit.completed_dates.len() as u64)
        .take_while(|day| habit.is_completed_on(*day))
        .count() as u32;

    HabitHistory {
        id: habit.id,
        days: record,
        streak,
    }
}
