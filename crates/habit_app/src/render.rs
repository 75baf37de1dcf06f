use std::fmt::{self, Write};

use habit_core::{
    date::DaySelection,
    heatmap::{HeatmapCell, YearHeatmap},
    stats::{Completion, HabitHistory},
};

use crate::app::DashboardView;

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];
const DAY_LABELS: [&str; 7] = ["Mo", "  ", "We", "  ", "Fr", "  ", "  "];
const LEVEL_GLYPHS: [char; 5] = ['·', '░', '▒', '▓', '█'];
const PROGRESS_WIDTH: usize = 10;

pub fn render_dashboard(view: &DashboardView) -> Result<String, fmt::Error> {
    let mut out = String::new();
    let summary = &view.summary;
    writeln!(out, "{}", format_day_heading(&view.selection))?;
    writeln!(
        out,
        "Done {}/{} · Streak {} days · This week {}% · {} habits",
        summary.selected_completion.completed,
        summary.selected_completion.total,
        summary.streak,
        summary.weekly_rate,
        summary.habit_count
    )?;

    for group in &view.groups {
        writeln!(out)?;
        writeln!(
            out,
            "{} {}/{} {}",
            group.category,
            group.completion.completed,
            group.completion.total,
            progress_bar(group.completion)
        )?;
        for status in &group.habits {
            let mark = if status.done { 'x' } else { ' ' };
            let history = view
                .histories
                .iter()
                .find(|history| history.id == status.id)
                .map(history_graph)
                .unwrap_or_default();
            writeln!(out, "  [{mark}] {:<28} {history}", status.name)?;
        }
    }

    writeln!(out)?;
    out.push_str(&render_heatmap(&view.heatmap)?);
    Ok(out)
}

pub fn format_day_heading(selection: &DaySelection) -> String {
    let label = selection.selected.format("%A, %-d %B %Y").to_string();
    if selection.is_today() {
        format!("{label} (today)")
    } else {
        label
    }
}

fn progress_bar(completion: Completion) -> String {
    let filled = completion.percent() as usize * PROGRESS_WIDTH / 100;
    format!(
        "[{}{}]",
        "#".repeat(filled),
        ".".repeat(PROGRESS_WIDTH - filled)
    )
}

/// `X` for done days and `.` for missed ones, oldest first, followed by the streak.
pub fn history_graph(history: &HabitHistory) -> String {
    let graph: String = history
        .days
        .iter()
        .map(|day| if day.done { 'X' } else { '.' })
        .collect();
    format!("{graph} ({})", history.streak)
}

/// One text column per week, one line per weekday, month labels on top.
pub fn render_heatmap(heatmap: &YearHeatmap) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "{}", heatmap.year)?;

    let mut label_line = vec![' '; heatmap.weeks.len()];
    for anchor in &heatmap.anchors {
        for (offset, ch) in MONTH_LABELS[anchor.month as usize].chars().enumerate() {
            if let Some(slot) = label_line.get_mut(anchor.week_index + offset) {
                *slot = ch;
            }
        }
    }
    writeln!(out, "   {}", label_line.into_iter().collect::<String>().trim_end())?;

    for (weekday, label) in DAY_LABELS.iter().enumerate() {
        let row: String = heatmap
            .weeks
            .iter()
            .map(|week| week[weekday].map(cell_glyph).unwrap_or(' '))
            .collect();
        writeln!(out, "{label} {}", row.trim_end())?;
    }
    Ok(out)
}

fn cell_glyph(cell: HeatmapCell) -> char {
    if cell.is_today {
        return '@';
    }
    LEVEL_GLYPHS[usize::from(cell.level).min(LEVEL_GLYPHS.len() - 1)]
}
