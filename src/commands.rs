use std::io::{self, Write};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use serde_json::Value;

use crate::api::ApiClient;
use crate::calendar::{events_in_range, CalendarView, EventClass, EventSource};
use crate::config::Config;
use crate::gantt::{bar_text, bounds, GanttScale};
use crate::models::{
    Milestone, MilestoneCategory, MilestoneDraft, Priority, Task, TaskDraft, TaskStatus, DEFAULT_NOTIFY_BEFORE,
};
use crate::progress::{hex_rgb, ProgressBand};
use crate::storage::{delete_snapshot, load_snapshot, save_snapshot, Snapshot};
use crate::timeline::{Collection, Timeline};

/// Columns of the Gantt bar in CLI output.
const GANTT_BAR_WIDTH: usize = 40;

/// Field values given on the command line for a task. `None` keeps the
/// current value when editing.
#[derive(Debug, Default, Clone)]
pub struct TaskChanges {
    pub property: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub progress: Option<u8>,
}

impl TaskChanges {
    /// Builds a draft for a new task. Title, start and end are required.
    pub fn into_new_draft(self) -> Result<TaskDraft> {
        let title = self.title.clone().filter(|t| !t.trim().is_empty()).context("A task needs a title")?;
        let start = parse_date(self.start.as_deref().context("A task needs a start date")?)?;
        let end = parse_date(self.end.as_deref().context("A task needs an end date")?)?;
        let mut draft = TaskDraft {
            property: String::new(),
            title,
            description: String::new(),
            start_date: start,
            end_date: end,
            status: TaskStatus::default(),
            priority: Priority::default(),
            progress: 0,
        };
        self.apply(&mut draft)?;
        Ok(draft)
    }

    /// Overwrites the draft fields that were given.
    pub fn apply(self, draft: &mut TaskDraft) -> Result<()> {
        if let Some(p) = self.property { draft.property = p; }
        if let Some(t) = self.title { draft.title = t; }
        if let Some(d) = self.description { draft.description = d; }
        if let Some(s) = self.start { draft.start_date = parse_date(&s)?; }
        if let Some(e) = self.end { draft.end_date = parse_date(&e)?; }
        if let Some(s) = self.status {
            draft.status = TaskStatus::parse(&s).with_context(|| {
                format!("Unknown status '{}'. Use pending, in-progress, completed, on-hold or cancelled.", s)
            })?;
        }
        if let Some(p) = self.priority {
            draft.priority = Priority::parse(&p)
                .with_context(|| format!("Unknown priority '{}'. Use low, medium, high or urgent.", p))?;
        }
        if let Some(p) = self.progress { draft.progress = p.min(100); }
        Ok(())
    }
}

/// Field values given on the command line for a milestone.
#[derive(Debug, Default, Clone)]
pub struct MilestoneChanges {
    pub property: Option<String>,
    pub title: Option<String>,
    pub date: Option<String>,
    pub category: Option<String>,
    pub notify_before: Option<u32>,
}

impl MilestoneChanges {
    pub fn into_new_draft(self) -> Result<MilestoneDraft> {
        let title = self.title.clone().filter(|t| !t.trim().is_empty()).context("A milestone needs a title")?;
        let date = parse_date(self.date.as_deref().context("A milestone needs a date")?)?;
        let mut draft = MilestoneDraft {
            property: String::new(),
            title,
            date,
            category: MilestoneCategory::default(),
            notify_before: DEFAULT_NOTIFY_BEFORE,
        };
        self.apply(&mut draft)?;
        Ok(draft)
    }

    pub fn apply(self, draft: &mut MilestoneDraft) -> Result<()> {
        if let Some(p) = self.property { draft.property = p; }
        if let Some(t) = self.title { draft.title = t; }
        if let Some(d) = self.date { draft.date = parse_date(&d)?; }
        if let Some(c) = self.category {
            draft.category = MilestoneCategory::parse(&c).with_context(|| {
                format!("Unknown category '{}'. Use planning, construction, inspection, payment or delivery.", c)
            })?;
        }
        if let Some(n) = self.notify_before { draft.notify_before = n; }
        Ok(())
    }
}

/// Applies changes on top of an existing task.
///
/// Stored dates that cannot be read must be given in `changes`; all other
/// fields keep their stored values unless changed.
pub fn task_edit_draft(task: &Task, changes: TaskChanges) -> Result<TaskDraft> {
    let start = changes.start.as_deref().map(parse_date).transpose()?;
    let end = changes.end.as_deref().map(parse_date).transpose()?;
    let mut draft = TaskDraft::from_task_or(task, start, end).with_context(|| {
        format!("Task {} has no usable dates. Pass --start and --end.", task.id)
    })?;
    changes.apply(&mut draft)?;
    Ok(draft)
}

/// Applies changes on top of an existing milestone.
pub fn milestone_edit_draft(milestone: &Milestone, changes: MilestoneChanges) -> Result<MilestoneDraft> {
    let date = changes.date.as_deref().map(parse_date).transpose()?;
    let mut draft = MilestoneDraft::from_milestone_or(milestone, date)
        .with_context(|| format!("Milestone {} has no usable date. Pass --date.", milestone.id))?;
    changes.apply(&mut draft)?;
    Ok(draft)
}

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}'. Use YYYY-MM-DD.", s))
}

/// Extracts the record id from a mutation response, whatever its envelope.
pub fn response_id(response: &Value) -> Option<String> {
    let mut v = response;
    for _ in 0..3 {
        if let Some(id) = v.get("_id").or_else(|| v.get("id")).and_then(Value::as_str) {
            return Some(id.to_string());
        }
        v = v.get("data")?;
    }
    None
}

fn client(cfg: &Config) -> Result<ApiClient> {
    ApiClient::new(cfg.request_context())
}

/// Loads the timeline from the API, or from the last snapshot when offline.
///
/// A failed collection leaves that part of the view empty; a complete
/// refresh replaces the snapshot.
pub async fn fetch_timeline(cfg: &Config, offline: bool) -> Timeline {
    if offline {
        return match load_snapshot() {
            Some(s) => {
                log::info!("Using snapshot fetched at {}", s.fetched_at);
                s.timeline
            }
            None => {
                log::warn!("No snapshot available; showing an empty timeline");
                Timeline::default()
            }
        };
    }

    let api = match client(cfg) {
        Ok(api) => api,
        Err(e) => {
            log::error!("{:#}", e);
            return Timeline::default();
        }
    };
    let (timeline, report) = Timeline::load(&api).await;
    if report.is_complete() {
        let snapshot = Snapshot {
            fetched_at: Local::now().to_rfc3339(),
            api_url: cfg.api_url.clone(),
            timeline: timeline.clone(),
        };
        if let Err(e) = save_snapshot(&snapshot) {
            log::warn!("Could not store snapshot: {:#}", e);
        }
    }
    timeline
}

fn print_hidden_notice(timeline: &Timeline) {
    let hidden = timeline.hidden_records().total();
    if hidden > 0 {
        println!("{} records could not be displayed (missing or invalid dates).", hidden);
    }
}

fn header(names: &[&str]) -> Vec<Cell> {
    names.iter().map(|n| Cell::new(n).add_attribute(Attribute::Bold)).collect()
}

fn table_color(hex: &str) -> Color {
    let (r, g, b) = hex_rgb(hex);
    Color::Rgb { r, g, b }
}

/// Lists the calendar events of the chosen view around `date` (today by default).
pub async fn cmd_calendar(cfg: &Config, view: CalendarView, date: Option<String>, offline: bool) -> Result<()> {
    let anchor = match date {
        Some(d) => parse_date(&d)?,
        None => Local::now().date_naive(),
    };
    let timeline = fetch_timeline(cfg, offline).await;
    let (from, to) = view.range(anchor);
    let events = events_in_range(&timeline.calendar(), from, to);

    if events.is_empty() {
        println!("No events between {} and {}.", from, to);
    } else {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(header(&["Kind", "Title", "Start", "End", "Status", "Property"]));

        for e in &events {
            let (status, property) = match &e.source {
                EventSource::Task(t) => (
                    cfg.locale.status(t.status).to_string(),
                    t.property.as_ref().map(|p| p.id().to_string()),
                ),
                EventSource::Milestone(m) => (
                    if e.class == EventClass::Completed {
                        cfg.locale.status(TaskStatus::Completed).to_string()
                    } else {
                        cfg.locale.category(m.category).to_string()
                    },
                    m.property.as_ref().map(|p| p.id().to_string()),
                ),
            };
            let property = property
                .map(|id| timeline.property_label(&id, cfg.locale).unwrap_or(id))
                .unwrap_or_default();
            let (start, end) = if e.all_day {
                (e.start.format("%Y-%m-%d").to_string(), e.end.format("%Y-%m-%d").to_string())
            } else {
                (e.start.format("%Y-%m-%d %H:%M").to_string(), e.end.format("%Y-%m-%d %H:%M").to_string())
            };
            table.add_row(vec![
                Cell::new(e.source.kind()),
                Cell::new(&e.title),
                Cell::new(start),
                Cell::new(end),
                Cell::new(status).fg(table_color(e.class.color())),
                Cell::new(property),
            ]);
        }
        println!("{table}");
    }

    let today = Local::now().date_naive();
    for m in timeline.due_reminders(today) {
        println!("Reminder: milestone '{}' is coming up.", m.title);
    }
    print_hidden_notice(&timeline);
    Ok(())
}

/// Prints the Gantt chart as a table with text bars.
pub async fn cmd_gantt(cfg: &Config, scale: GanttScale, offline: bool) -> Result<()> {
    let timeline = fetch_timeline(cfg, offline).await;
    let rows = timeline.gantt(cfg.locale);
    let Some((origin, _)) = bounds(&rows) else {
        println!("No tasks with valid dates to chart.");
        print_hidden_notice(&timeline);
        return Ok(());
    };

    let bar_header = format!("From {} ({} per column)", origin.format("%Y-%m-%d"), scale.label());
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header(&["#", "Task", "Start", "End", "Progress", bar_header.as_str()]));

    for row in &rows {
        let color = table_color(row.styles.progress_color);
        table.add_row(vec![
            Cell::new(row.display_order),
            Cell::new(&row.name),
            Cell::new(row.start.format("%Y-%m-%d")),
            Cell::new(row.end.format("%Y-%m-%d")),
            Cell::new(format!("{}%", row.progress)).fg(color),
            Cell::new(bar_text(row, origin, scale, GANTT_BAR_WIDTH)).fg(color),
        ]);
    }
    println!("{table}");

    let at_risk = rows
        .iter()
        .filter(|r| ProgressBand::from_progress(Some(r.progress)) == ProgressBand::AtRisk)
        .count();
    println!("{} tasks, {} at risk.", rows.len(), at_risk);
    print_hidden_notice(&timeline);
    Ok(())
}

/// Lists properties so their ids can be used with `--property`.
pub async fn cmd_properties(cfg: &Config, offline: bool) -> Result<()> {
    let timeline = fetch_timeline(cfg, offline).await;
    if timeline.properties.is_empty() {
        println!("No properties found.");
        return Ok(());
    }
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(header(&["ID", "Property"]));
    for p in &timeline.properties {
        table.add_row(vec![Cell::new(&p.id), Cell::new(cfg.locale.property_label(p))]);
    }
    println!("{table}");
    Ok(())
}

pub async fn cmd_task_add(cfg: &Config, changes: TaskChanges) -> Result<()> {
    let draft = changes.into_new_draft()?;
    let res = client(cfg)?.create_task(&draft).await?;
    match response_id(&res) {
        Some(id) => println!("Task created (id = {}).", id),
        None => println!("Task created."),
    }
    Ok(())
}

pub async fn cmd_task_edit(cfg: &Config, id: String, changes: TaskChanges) -> Result<()> {
    let api = client(cfg)?;
    let (timeline, report) = Timeline::load(&api).await;
    report.ensure_loaded(Collection::Tasks, "Edit task")?;
    let task = timeline.task(&id).with_context(|| format!("Task {} not found.", id))?;
    let draft = task_edit_draft(task, changes)?;
    api.update_task(&id, &draft).await?;
    println!("Task {} updated.", id);
    Ok(())
}

pub async fn cmd_task_progress(cfg: &Config, id: String, progress: u8) -> Result<()> {
    client(cfg)?.update_task_progress(&id, progress.min(100)).await?;
    println!("Task {} progress set to {}%.", id, progress.min(100));
    Ok(())
}

pub async fn cmd_task_delete(cfg: &Config, id: String, force: bool) -> Result<()> {
    if !force && !confirm(&format!("Delete task {}?", id))? {
        println!("Aborted.");
        return Ok(());
    }
    client(cfg)?.delete_task(&id).await?;
    println!("Task {} removed.", id);
    Ok(())
}

pub async fn cmd_milestone_add(cfg: &Config, changes: MilestoneChanges) -> Result<()> {
    let draft = changes.into_new_draft()?;
    let res = client(cfg)?.create_milestone(&draft).await?;
    match response_id(&res) {
        Some(id) => println!("Milestone created (id = {}).", id),
        None => println!("Milestone created."),
    }
    Ok(())
}

pub async fn cmd_milestone_edit(cfg: &Config, id: String, changes: MilestoneChanges) -> Result<()> {
    let api = client(cfg)?;
    let (timeline, report) = Timeline::load(&api).await;
    report.ensure_loaded(Collection::Milestones, "Edit milestone")?;
    let milestone = timeline.milestone(&id).with_context(|| format!("Milestone {} not found.", id))?;
    let draft = milestone_edit_draft(milestone, changes)?;
    api.update_milestone(&id, &draft).await?;
    println!("Milestone {} updated.", id);
    Ok(())
}

pub async fn cmd_milestone_toggle(cfg: &Config, id: String) -> Result<()> {
    client(cfg)?.toggle_milestone(&id).await?;
    println!("Milestone {} toggled.", id);
    Ok(())
}

pub async fn cmd_milestone_delete(cfg: &Config, id: String, force: bool) -> Result<()> {
    if !force && !confirm(&format!("Delete milestone {}?", id))? {
        println!("Aborted.");
        return Ok(());
    }
    client(cfg)?.delete_milestone(&id).await?;
    println!("Milestone {} removed.", id);
    Ok(())
}

/// Deletes the offline snapshot.
pub fn cmd_reset(force: bool) -> Result<()> {
    if !force && !confirm("Delete the offline snapshot? This cannot be undone.")? {
        println!("Aborted.");
        return Ok(());
    }
    delete_snapshot()?;
    println!("Snapshot deleted.");
    Ok(())
}

fn confirm(question: &str) -> Result<bool> {
    print!("{} [y/N] ", question);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}
