use std::io::Write;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use habit_core::{
    date::{year_bounds, DateKey, DaySelection},
    habit::{Categories, STARTER_HABITS},
    heatmap::{build_year_heatmap, YearHeatmap},
    stats::{
        dashboard_summary, group_by_category, habit_history, CategoryGroup, DashboardSummary,
        HabitHistory,
    },
    HabitStore,
};
use serde::Serialize;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::render;

/// Longest per-habit history window the dashboard will compute.
pub const MAX_HISTORY_DAYS: usize = 366;
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Debug)]
pub struct DashboardConfig {
    pub(crate) categories: Categories,
    pub(crate) reference_date: Option<NaiveDate>,
    pub(crate) day_offset: i64,
    pub(crate) heatmap_year: Option<i32>,
    pub(crate) history_days: usize,
    pub(crate) output: OutputFormat,
}

impl DashboardConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`; values that do not parse keep their default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(list) = lookup("HABIT_CATEGORIES") {
            let categories = Categories::new(list.split(','));
            if categories.is_empty() {
                warn!("HABIT_CATEGORIES has no usable names, keeping defaults");
            } else {
                config.categories = categories;
            }
        }
        if let Some(raw) = lookup("HABIT_REFERENCE_DATE") {
            match DateKey::parse(raw.trim()) {
                Some(key) => config.reference_date = Some(key.date()),
                None => warn!(value = %raw, "ignoring malformed HABIT_REFERENCE_DATE"),
            }
        }
        if let Some(raw) = lookup("HABIT_DAY_OFFSET") {
            match raw.trim().parse::<i64>() {
                Ok(value) => config.day_offset = value,
                Err(_) => warn!(value = %raw, "ignoring malformed HABIT_DAY_OFFSET"),
            }
        }
        if let Some(raw) = lookup("HABIT_HEATMAP_YEAR") {
            match raw.trim().parse::<i32>() {
                Ok(value) if year_bounds(value).is_some() => config.heatmap_year = Some(value),
                Ok(value) => warn!(value, "HABIT_HEATMAP_YEAR is outside the calendar range"),
                Err(_) => warn!(value = %raw, "ignoring malformed HABIT_HEATMAP_YEAR"),
            }
        }
        if let Some(raw) = lookup("HABIT_HISTORY_DAYS") {
            match raw.trim().parse::<usize>() {
                Ok(0) | Err(_) => warn!(value = %raw, "ignoring invalid HABIT_HISTORY_DAYS"),
                Ok(value) if value > MAX_HISTORY_DAYS => {
                    warn!(value, max = MAX_HISTORY_DAYS, "clamping HABIT_HISTORY_DAYS");
                    config.history_days = MAX_HISTORY_DAYS;
                }
                Ok(value) => config.history_days = value,
            }
        }
        if let Some(raw) = lookup("HABIT_OUTPUT") {
            match raw.trim().to_ascii_lowercase().as_str() {
                "json" => config.output = OutputFormat::Json,
                "text" => config.output = OutputFormat::Text,
                other => warn!(value = other, "unknown HABIT_OUTPUT, using text"),
            }
        }
        Ok(config)
    }

    pub(crate) fn selection(&self, today: NaiveDate) -> DaySelection {
        let base = DaySelection::new(self.reference_date.unwrap_or(today));
        base.shifted(self.day_offset)
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            categories: Categories::default(),
            reference_date: None,
            day_offset: 0,
            heatmap_year: None,
            history_days: 21,
            output: OutputFormat::Text,
        }
    }
}

/// Everything the dashboard shows, computed from one snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub selection: DaySelection,
    pub summary: DashboardSummary,
    pub groups: Vec<CategoryGroup>,
    pub histories: Vec<HabitHistory>,
    pub heatmap: YearHeatmap,
}

impl DashboardView {
    pub fn build(store: &HabitStore, config: &DashboardConfig, selection: DaySelection) -> Self {
        let habits = store.snapshot();
        let year = config.heatmap_year.unwrap_or(selection.selected.year());
        let histories = habits
            .iter()
            .map(|habit| habit_history(habit, config.history_days, selection.today))
            .collect();
        Self {
            selection,
            summary: dashboard_summary(habits, &selection),
            groups: group_by_category(habits, store.categories(), selection.selected),
            histories,
            heatmap: build_year_heatmap(habits, year, selection.today),
        }
    }
}

/// Log filter from `RUST_LOG`, falling back to `info` when unset or unparsable.
pub fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Store seeded with the starter habits whose category is configured.
pub fn starter_store(categories: &Categories) -> Result<HabitStore> {
    let mut builder = HabitStore::builder().with_categories(categories.clone());
    for (name, category) in STARTER_HABITS {
        if categories.contains(category) {
            builder = builder.with_habit(name, category);
        } else {
            debug!(name, category, "skipping starter habit outside configured categories");
        }
    }
    builder.build().context("failed to initialize habit store")
}

pub fn run(config: DashboardConfig) -> Result<()> {
    let start = Instant::now();
    let today = Local::now().date_naive();
    let selection = config.selection(today);
    info!(
        categories = config.categories.len(),
        selected = %selection.key(),
        "building dashboard"
    );

    let store = starter_store(&config.categories)?;
    let view = DashboardView::build(&store, &config, selection);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match config.output {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &view).context("failed to encode dashboard")?;
            writeln!(out)?;
        }
        OutputFormat::Text => {
            let text = render::render_dashboard(&view).context("failed to render dashboard")?;
            out.write_all(text.as_bytes())?;
        }
    }
    info!(elapsed_ms = %start.elapsed().as_millis(), habits = store.len(), "dashboard rendered");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tracing::level_filters::LevelFilter;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn config_reads_all_settings() {
        let config = DashboardConfig::from_lookup(lookup_from(&[
            ("HABIT_CATEGORIES", "Fitness, Lernen,,"),
            ("HABIT_REFERENCE_DATE", "2024-02-28"),
            ("HABIT_DAY_OFFSET", "2"),
            ("HABIT_HEATMAP_YEAR", "2023"),
            ("HABIT_HISTORY_DAYS", "14"),
            ("HABIT_OUTPUT", "JSON"),
        ]))
        .unwrap();

        assert_eq!(config.categories.iter().collect::<Vec<_>>(), vec!["Fitness", "Lernen"]);
        assert_eq!(config.heatmap_year, Some(2023));
        assert_eq!(config.history_days, 14);
        assert_eq!(config.output, OutputFormat::Json);
        let selection = config.selection(ymd(2030, 1, 1));
        assert_eq!(selection.selected, ymd(2024, 3, 1));
        assert_eq!(selection.today, ymd(2024, 2, 28));
    }

    #[test]
    fn invalid_values_keep_defaults() {
        let config = DashboardConfig::from_lookup(lookup_from(&[
            ("HABIT_CATEGORIES", " , "),
            ("HABIT_REFERENCE_DATE", "2024-2-28"),
            ("HABIT_DAY_OFFSET", "soon"),
            ("HABIT_HISTORY_DAYS", "0"),
            ("HABIT_OUTPUT", "yaml"),
        ]))
        .unwrap();

        assert_eq!(config.categories, Categories::default());
        assert_eq!(config.reference_date, None);
        assert_eq!(config.day_offset, 0);
        assert_eq!(config.history_days, 21);
        assert_eq!(config.output, OutputFormat::Text);
        assert!(config.selection(ymd(2025, 5, 5)).is_today());
    }

    #[test]
    fn starter_store_only_seeds_configured_categories() {
        let store = starter_store(&Categories::new(["Fitness", "Lernen"])).unwrap();
        assert_eq!(store.len(), 4);
        assert!(store
            .snapshot()
            .iter()
            .all(|habit| habit.category == "Fitness" || habit.category == "Lernen"));
        assert_eq!(starter_store(&Categories::default()).unwrap().len(), 10);
    }

    #[test]
    fn view_uses_selected_year_unless_configured() {
        let store = starter_store(&Categories::default()).unwrap();
        let mut config = DashboardConfig::default();
        let selection = DaySelection::new(ymd(2024, 1, 1)).previous();

        let view = DashboardView::build(&store, &config, selection);
        assert_eq!(view.heatmap.year, 2023);
        assert_eq!(view.histories.len(), 10);
        assert_eq!(view.histories[0].id, store.snapshot()[0].id);
        assert_eq!(view.histories[0].days.len(), 21);
        assert_eq!(view.groups.len(), 5);

        config.heatmap_year = Some(2024);
        let view = DashboardView::build(&store, &config, selection);
        assert_eq!(view.heatmap.year, 2024);
        assert_eq!(view.heatmap.cells().filter(|cell| cell.is_today).count(), 1);
    }

    #[test]
    fn oversized_history_window_is_clamped() {
        let config =
            DashboardConfig::from_lookup(lookup_from(&[("HABIT_HISTORY_DAYS", "5000000")]))
                .unwrap();
        assert_eq!(config.history_days, MAX_HISTORY_DAYS);

        let store = starter_store(&Categories::default()).unwrap();
        let view = DashboardView::build(&store, &config, DaySelection::new(ymd(2025, 10, 24)));
        let entries: usize = view.histories.iter().map(|history| history.days.len()).sum();
        assert_eq!(entries, MAX_HISTORY_DAYS * store.len());

        let config = DashboardConfig::from_lookup(lookup_from(&[("HABIT_HISTORY_DAYS", "366")]))
            .unwrap();
        assert_eq!(config.history_days, 366);
    }

    #[test]
    fn heatmap_year_outside_calendar_range_is_rejected() {
        for raw in ["300000", "-300000", "twenty"] {
            let config =
                DashboardConfig::from_lookup(lookup_from(&[("HABIT_HEATMAP_YEAR", raw)])).unwrap();
            assert_eq!(config.heatmap_year, None, "accepted {raw}");
        }
        let config =
            DashboardConfig::from_lookup(lookup_from(&[("HABIT_HEATMAP_YEAR", " 1999 ")])).unwrap();
        assert_eq!(config.heatmap_year, Some(1999));
    }

    #[test]
    fn log_filter_defaults_to_info() {
        assert_eq!(log_filter(None).max_level_hint(), Some(LevelFilter::INFO));
        assert_eq!(log_filter(Some("debug")).max_level_hint(), Some(LevelFilter::DEBUG));
    }
}
