use chrono::{DateTime, Duration, Utc};
use crate::calendar::ensure_end_after_start;
use crate::locale::Locale;
use crate::models::Task;
use crate::normalize::normalize_date;
use crate::progress::progress_color;

/// Bar colors of a Gantt row. Selection does not change the tint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarStyles {
    pub progress_color: &'static str,
    pub progress_selected_color: &'static str,
}

/// One row of the Gantt chart.
#[derive(Debug, Clone, PartialEq)]
pub struct GanttRow {
    pub id: String,
    pub name: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub progress: i64,
    /// Position among emitted rows, contiguous from zero.
    pub display_order: usize,
    pub styles: BarStyles,
}

/// Projects tasks into Gantt rows, preserving their order.
///
/// Tasks without a usable start or end are skipped; the remaining rows are
/// numbered without gaps.
pub fn project_gantt(tasks: &[Task], locale: Locale) -> Vec<GanttRow> {
    let mut rows = Vec::with_capacity(tasks.len());

    for task in tasks {
        let range = normalize_date(&task.start_date)
            .zip(normalize_date(&task.end_date))
            .and_then(|(start, end)| Some((start, ensure_end_after_start(start, end)?)));
        let Some((start, end)) = range else {
            log::warn!("Skipping task '{}' with invalid dates", task.id);
            continue;
        };

        let display_order = rows.len();
        let color = progress_color(task.progress);
        rows.push(GanttRow {
            id: if task.id.is_empty() { format!("task-{}", display_order) } else { task.id.clone() },
            name: if task.title.trim().is_empty() {
                locale.untitled_task().to_string()
            } else {
                task.title.clone()
            },
            start,
            end,
            progress: task.progress.unwrap_or(0),
            display_order,
            styles: BarStyles { progress_color: color, progress_selected_color: color },
        });
    }

    rows
}

/// Time resolution of the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GanttScale {
    Day,
    Week,
    #[default]
    Month,
}

impl GanttScale {
    pub fn parse(s: &str) -> Option<GanttScale> {
        match s.trim().to_lowercase().as_str() {
            "day" => Some(GanttScale::Day),
            "week" => Some(GanttScale::Week),
            "month" => Some(GanttScale::Month),
            _ => None,
        }
    }

    pub fn days_per_column(&self) -> i64 {
        match self {
            GanttScale::Day => 1,
            GanttScale::Week => 7,
            GanttScale::Month => 30,
        }
    }

    pub fn next(&self) -> GanttScale {
        match self {
            GanttScale::Day => GanttScale::Week,
            GanttScale::Week => GanttScale::Month,
            GanttScale::Month => GanttScale::Day,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GanttScale::Day => "day",
            GanttScale::Week => "week",
            GanttScale::Month => "month",
        }
    }
}

/// Earliest start and latest end over all rows.
pub fn bounds(rows: &[GanttRow]) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = rows.iter().map(|r| r.start).min()?;
    let end = rows.iter().map(|r| r.end).max()?;
    Some((start, end))
}

/// Column offset and width of a row's bar, measured from `origin`.
///
/// Every bar is at least one column wide.
pub fn bar_span(row: &GanttRow, origin: DateTime<Utc>, scale: GanttScale) -> (usize, usize) {
    let column = Duration::days(scale.days_per_column()).num_seconds();
    let offset = (row.start - origin).num_seconds().max(0) / column;
    let last = ((row.end - origin).num_seconds().max(0) - 1).max(0) / column;
    let width = (last - offset + 1).max(1);
    (offset as usize, width as usize)
}

/// Renders a row's bar as text, clipped to `width` columns.
pub fn bar_text(row: &GanttRow, origin: DateTime<Utc>, scale: GanttScale, width: usize) -> String {
    let (offset, len) = bar_span(row, origin, scale);
    let mut out = String::with_capacity(width);
    for col in 0..width {
        out.push(if col >= offset && col < offset + len { '█' } else { '·' });
    }
    out
}
