use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::date::DateKey;

/// Opaque, store-assigned identifier of a habit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HabitId(u64);

impl HabitId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for HabitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Habit {
    pub id: HabitId,
    pub name: String,
    pub category: String,
    pub completed_dates: BTreeSet<DateKey>,
}

impl Habit {
    pub(crate) fn new(id: HabitId, name: String, category: String) -> Self {
        Self {
            id,
            name,
            category,
            completed_dates: BTreeSet::new(),
        }
    }

    pub fn is_completed_on(&self, date: NaiveDate) -> bool {
        self.completed_dates.contains(&DateKey::from_date(date))
    }

    /// Membership check by key text. Malformed keys simply do not match.
    pub fn is_completed_key(&self, key: &str) -> bool {
        DateKey::parse(key).is_some_and(|key| self.completed_dates.contains(&key))
    }

    pub fn earliest_completion(&self) -> Option<NaiveDate> {
        self.completed_dates.first().map(|key| key.date())
    }

    /// Flips membership of `date`; returns whether the day is now completed.
    pub(crate) fn toggle(&mut self, date: NaiveDate) -> bool {
        let key = DateKey::from_date(date);
        if self.completed_dates.remove(&key) {
            false
        } else {
            self.completed_dates.insert(key);
            true
        }
    }
}

/// Read-only view of the store's habits, in insertion order.
pub type HabitCollection = Vec<Habit>;

/// Category names available when adding habits, in display order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Categories(Vec<String>);

impl Categories {
    /// Builds a category list, trimming names and dropping blanks and duplicates.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list: Vec<String> = Vec::new();
        for name in names {
            let name = name.as_ref().trim();
            if !name.is_empty() && !list.iter().any(|existing| existing == name) {
                list.push(name.to_string());
            }
        }
        Self(list)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|candidate| candidate == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub const DEFAULT_CATEGORIES: [&str; 5] =
    ["Gesundheit", "Achtsamkeit", "Fitness", "Lernen", "Produktivität"];

impl Default for Categories {
    fn default() -> Self {
        Self::new(DEFAULT_CATEGORIES)
    }
}

/// Habits a fresh dashboard starts with, as `(name, category)` pairs.
pub const STARTER_HABITS: [(&str, &str); 10] = [
    ("8 Gläser Wasser trinken", "Gesundheit"),
    ("Obst oder Gemüse essen", "Gesundheit"),
    ("10 Minuten meditieren", "Achtsamkeit"),
    ("Tagebuch schreiben", "Achtsamkeit"),
    ("30 Minuten Sport", "Fitness"),
    ("10.000 Schritte gehen", "Fitness"),
    ("30 Minuten lesen", "Lernen"),
    ("Neue Vokabeln lernen", "Lernen"),
    ("To-Do Liste abarbeiten", "Produktivität"),
    ("E-Mails bearbeiten", "Produktivität"),
];
