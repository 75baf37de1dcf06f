use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::DateKeyError;

const KEY_FORMAT: &str = "%Y-%m-%d";

/// Calendar day used as the lookup key for completion membership.
///
/// The text form is always `YYYY-MM-DD`. Parsing only accepts strings that render back
/// to exactly the same text, so `2024-1-5` or `2024-01-05T00:00` never match a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(NaiveDate);

impl DateKey {
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn parse(text: &str) -> Option<Self> {
        let date = NaiveDate::parse_from_str(text, KEY_FORMAT).ok()?;
        let key = Self(date);
        (key.to_string() == text).then_some(key)
    }

    pub fn date(self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(KEY_FORMAT))
    }
}

impl FromStr for DateKey {
    type Err = DateKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| DateKeyError {
            input: s.to_string(),
        })
    }
}

impl Serialize for DateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Canonical `YYYY-MM-DD` text for `date`.
pub fn date_key(date: NaiveDate) -> String {
    DateKey::from_date(date).to_string()
}

/// Moves `date` by `days` (negative goes back). Saturates at the chrono calendar limits.
pub fn offset_days(date: NaiveDate, days: i64) -> NaiveDate {
    let shifted = if days >= 0 {
        date.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
    };
    shifted.unwrap_or(if days >= 0 {
        NaiveDate::MAX
    } else {
        NaiveDate::MIN
    })
}

/// Column of `date` in a Monday-first week (Monday = 0, Sunday = 6).
pub fn weekday_index(date: NaiveDate) -> usize {
    date.weekday().num_days_from_monday() as usize
}

/// January 1st and December 31st of `year`, if the year is representable.
pub fn year_bounds(year: i32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let last = NaiveDate::from_ymd_opt(year, 12, 31)?;
    Some((first, last))
}

/// Every day of `year` in order.
pub fn days_in_year(year: i32) -> Vec<NaiveDate> {
    let Some((first, last)) = year_bounds(year) else {
        return Vec::new();
    };
    first.iter_days().take_while(|day| *day <= last).collect()
}

/// Day picked in the daily view, navigated one day at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySelection {
    pub selected: NaiveDate,
    pub today: NaiveDate,
}

impl DaySelection {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            selected: today,
            today,
        }
    }

    pub fn previous(self) -> Self {
        self.shifted(-1)
    }

    pub fn next(self) -> Self {
        self.shifted(1)
    }

    pub fn shifted(self, days: i64) -> Self {
        Self {
            selected: offset_days(self.selected, days),
            today: self.today,
        }
    }

    pub fn is_today(&self) -> bool {
        self.selected == self.today
    }

    pub fn key(&self) -> DateKey {
        DateKey::from_date(self.selected)
    }
}
