use ratatui::widgets::TableState;

use crate::api::ApiClient;
use crate::calendar::{CalendarEvent, EventSource};
use crate::commands::{MilestoneChanges, TaskChanges};
use crate::config::Config;
use crate::gantt::{GanttRow, GanttScale};
use crate::models::{stored_day, Milestone, MilestoneDraft, Task, TaskDraft, DEFAULT_NOTIFY_BEFORE};
use crate::timeline::Timeline;

#[derive(PartialEq)]
pub enum InputMode {
    Normal,
    Form,
    Confirm,
}

#[derive(PartialEq)]
pub enum ViewMode {
    Calendar,
    Gantt,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormKind {
    Task,
    Milestone,
    Progress,
}

impl FormKind {
    /// Prompt of every step, in order.
    pub fn prompts(&self) -> &'static [&'static str] {
        match self {
            FormKind::Task => &[
                "Title",
                "Property id (optional)",
                "Start date (YYYY-MM-DD)",
                "End date (YYYY-MM-DD)",
                "Status (pending, in-progress, completed, on-hold, cancelled)",
                "Priority (low, medium, high, urgent)",
                "Progress (0-100)",
            ],
            FormKind::Milestone => &[
                "Title",
                "Property id (optional)",
                "Date (YYYY-MM-DD)",
                "Category (planning, construction, inspection, payment, delivery)",
                "Notify before (days)",
            ],
            FormKind::Progress => &["Progress (0-100)"],
        }
    }
}

/// State of the multi-step add/edit wizard.
///
/// Values survive a failed submit so the user can fix one field and retry.
pub struct Form {
    pub kind: FormKind,
    /// Id of the record being edited; `None` when creating.
    pub editing: Option<String>,
    pub step: usize,
    pub values: Vec<String>,
    /// Task description. Not prompted for, but sent back on save.
    pub description: String,
}

impl Form {
    pub fn new(kind: FormKind) -> Form {
        let mut values = vec![String::new(); kind.prompts().len()];
        match kind {
            FormKind::Task => {
                values[4] = "pending".into();
                values[5] = "medium".into();
                values[6] = "0".into();
            }
            FormKind::Milestone => {
                values[3] = "planning".into();
                values[4] = DEFAULT_NOTIFY_BEFORE.to_string();
            }
            FormKind::Progress => values[0] = "0".into(),
        }
        Form { kind, editing: None, step: 0, values, description: String::new() }
    }

    pub fn for_task(id: &str, draft: &TaskDraft) -> Form {
        Form {
            kind: FormKind::Task,
            editing: Some(id.to_string()),
            step: 0,
            values: vec![
                draft.title.clone(),
                draft.property.clone(),
                draft.start_date.to_string(),
                draft.end_date.to_string(),
                draft.status.as_str().to_string(),
                draft.priority.as_str().to_string(),
                draft.progress.to_string(),
            ],
            description: draft.description.clone(),
        }
    }

    /// Edit form for a stored task. Dates that cannot be read are left
    /// blank for the user to fill in.
    pub fn for_task_record(task: &Task) -> Form {
        if let Some(draft) = TaskDraft::from_task(task) {
            return Form::for_task(&task.id, &draft);
        }
        let day = |v: &serde_json::Value| stored_day(v).map(|d| d.to_string()).unwrap_or_default();
        Form {
            kind: FormKind::Task,
            editing: Some(task.id.clone()),
            step: 0,
            values: vec![
                task.title.clone(),
                task.property.as_ref().map(|p| p.id().to_string()).unwrap_or_default(),
                day(&task.start_date),
                day(&task.end_date),
                task.status.as_str().to_string(),
                task.priority.as_str().to_string(),
                task.progress.unwrap_or(0).clamp(0, 100).to_string(),
            ],
            description: task.description.clone().unwrap_or_default(),
        }
    }

    pub fn for_milestone(id: &str, draft: &MilestoneDraft) -> Form {
        Form {
            kind: FormKind::Milestone,
            editing: Some(id.to_string()),
            step: 0,
            values: vec![
                draft.title.clone(),
                draft.property.clone(),
                draft.date.to_string(),
                draft.category.as_str().to_string(),
                draft.notify_before.to_string(),
            ],
            description: String::new(),
        }
    }

    /// Edit form for a stored milestone; an unreadable date is left blank.
    pub fn for_milestone_record(milestone: &Milestone) -> Form {
        if let Some(draft) = MilestoneDraft::from_milestone(milestone) {
            return Form::for_milestone(&milestone.id, &draft);
        }
        let notify_before = milestone
            .notify_before
            .and_then(|n| u32::try_from(n).ok())
            .map(|n| n.to_string())
            .unwrap_or_else(|| DEFAULT_NOTIFY_BEFORE.to_string());
        Form {
            kind: FormKind::Milestone,
            editing: Some(milestone.id.clone()),
            step: 0,
            values: vec![
                milestone.title.clone(),
                milestone.property.as_ref().map(|p| p.id().to_string()).unwrap_or_default(),
                String::new(),
                milestone.category.as_str().to_string(),
                notify_before,
            ],
            description: String::new(),
        }
    }

    pub fn prompt(&self) -> &'static str {
        self.kind.prompts().get(self.step).copied().unwrap_or("")
    }

    pub fn is_last_step(&self) -> bool {
        self.step + 1 >= self.values.len()
    }

    fn optional(&self, i: usize) -> Option<String> {
        Some(self.values[i].trim().to_string()).filter(|v| !v.is_empty())
    }

    pub fn task_draft(&self) -> anyhow::Result<TaskDraft> {
        let progress = match self.optional(6) {
            Some(p) => Some(p.parse::<u8>().map_err(|_| anyhow::anyhow!("Invalid progress '{}'", p))?),
            None => None,
        };
        TaskChanges {
            title: self.optional(0),
            property: self.optional(1),
            start: self.optional(2),
            end: self.optional(3),
            status: self.optional(4),
            priority: self.optional(5),
            progress,
            description: Some(self.description.clone()),
        }
        .into_new_draft()
    }

    pub fn milestone_draft(&self) -> anyhow::Result<MilestoneDraft> {
        let notify_before = match self.optional(4) {
            Some(n) => Some(n.parse::<u32>().map_err(|_| anyhow::anyhow!("Invalid number of days '{}'", n))?),
            None => None,
        };
        MilestoneChanges {
            title: self.optional(0),
            property: self.optional(1),
            date: self.optional(2),
            category: self.optional(3),
            notify_before,
        }
        .into_new_draft()
    }
}

/// The record under the cursor.
#[derive(Debug, Clone, PartialEq)]
pub enum Selected {
    Task(String),
    Milestone(String),
}

pub struct App {
    pub cfg: Config,
    api: Option<ApiClient>,
    pub timeline: Timeline,
    /// Calendar events sorted by start.
    pub events: Vec<CalendarEvent>,
    pub rows: Vec<GanttRow>,
    pub state: TableState,
    pub view_mode: ViewMode,
    pub scale: GanttScale,
    pub input_mode: InputMode,
    pub form: Option<Form>,
    pub input_buffer: String,
    pub pending_delete: Option<Selected>,
    /// Last message for the status bar and whether it is an error.
    pub status: Option<(String, bool)>,
}

impl App {
    pub fn new(cfg: Config) -> App {
        let api = match ApiClient::new(cfg.request_context()) {
            Ok(api) => Some(api),
            Err(e) => {
                log::error!("{:#}", e);
                None
            }
        };
        App {
            cfg,
            api,
            timeline: Timeline::default(),
            events: Vec::new(),
            rows: Vec::new(),
            state: TableState::default(),
            view_mode: ViewMode::Calendar,
            scale: GanttScale::default(),
            input_mode: InputMode::Normal,
            form: None,
            input_buffer: String::new(),
            pending_delete: None,
            status: None,
        }
    }

    /// Fetches all collections again and recomputes both projections.
    pub async fn refresh(&mut self) {
        let Some(api) = &self.api else {
            self.set_error("No API client available".into());
            return;
        };
        let (timeline, report) = Timeline::load(api).await;
        self.set_timeline(timeline);

        if let Some(summary) = report.summary() {
            self.set_error(summary);
        } else {
            let hidden = self.timeline.hidden_records().total();
            if hidden > 0 {
                self.set_info(format!("{} records could not be displayed", hidden));
            } else {
                self.status = None;
            }
        }
    }

    /// Replaces the data and recomputes the projections.
    pub fn set_timeline(&mut self, timeline: Timeline) {
        self.timeline = timeline;
        let mut events = self.timeline.calendar();
        events.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));
        self.events = events;
        self.rows = self.timeline.gantt(self.cfg.locale);
        self.clamp_selection();
    }

    fn len(&self) -> usize {
        match self.view_mode {
            ViewMode::Calendar => self.events.len(),
            ViewMode::Gantt => self.rows.len(),
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.len();
        match self.state.selected() {
            _ if len == 0 => self.state.select(None),
            Some(i) if i >= len => self.state.select(Some(len - 1)),
            None => self.state.select(Some(0)),
            _ => {}
        }
    }

    pub fn set_error(&mut self, msg: String) {
        self.status = Some((msg, true));
    }

    pub fn set_info(&mut self, msg: String) {
        self.status = Some((msg, false));
    }

    /// Selects the next item in the current list.
    pub fn next(&mut self) {
        let len = self.len();
        if len == 0 { return; }
        let i = match self.state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    /// Selects the previous item in the current list.
    pub fn previous(&mut self) {
        let len = self.len();
        if len == 0 { return; }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    pub fn toggle_view(&mut self) {
        self.view_mode = match self.view_mode {
            ViewMode::Calendar => ViewMode::Gantt,
            ViewMode::Gantt => ViewMode::Calendar,
        };
        self.state.select(None);
        self.clamp_selection();
    }

    pub fn cycle_scale(&mut self) {
        self.scale = self.scale.next();
    }

    pub fn selected(&self) -> Option<Selected> {
        let i = self.state.selected()?;
        match self.view_mode {
            ViewMode::Calendar => Some(match &self.events.get(i)?.source {
                EventSource::Task(t) => Selected::Task(t.id.clone()),
                EventSource::Milestone(m) => Selected::Milestone(m.id.clone()),
            }),
            ViewMode::Gantt => Some(Selected::Task(self.rows.get(i)?.id.clone())),
        }
    }

    pub fn start_form(&mut self, form: Form) {
        self.input_buffer = form.values[form.step].clone();
        self.form = Some(form);
        self.input_mode = InputMode::Form;
    }

    pub fn start_add(&mut self, kind: FormKind) {
        self.start_form(Form::new(kind));
    }

    /// Opens the edit wizard prefilled with the selected record.
    pub fn start_edit(&mut self) {
        let form = match self.selected() {
            Some(Selected::Task(id)) => self.timeline.task(&id).map(Form::for_task_record),
            Some(Selected::Milestone(id)) => self.timeline.milestone(&id).map(Form::for_milestone_record),
            None => None,
        };
        match form {
            Some(form) => self.start_form(form),
            None => self.set_error("Nothing to edit".into()),
        }
    }

    pub fn start_progress(&mut self) {
        let Some(Selected::Task(id)) = self.selected() else {
            self.set_error("Select a task to update its progress".into());
            return;
        };
        let mut form = Form::new(FormKind::Progress);
        if let Some(p) = self.timeline.task(&id).and_then(|t| t.progress) {
            form.values[0] = p.clamp(0, 100).to_string();
        }
        form.editing = Some(id);
        self.start_form(form);
    }

    pub fn cancel_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input_buffer.clear();
        self.form = None;
        self.pending_delete = None;
    }

    /// Stores the current field and advances, submitting after the last one.
    pub async fn handle_input(&mut self) {
        let Some(form) = self.form.as_mut() else { return; };
        form.values[form.step] = self.input_buffer.trim().to_string();
        if !form.is_last_step() {
            form.step += 1;
            self.input_buffer = form.values[form.step].clone();
            return;
        }

        match self.submit_form().await {
            Ok(msg) => {
                self.cancel_input();
                self.set_info(msg);
                self.refresh_keep_status().await;
            }
            // The wizard stays open with its values.
            Err(e) => self.set_error(format!("{:#}", e)),
        }
    }

    async fn submit_form(&self) -> anyhow::Result<String> {
        let form = self.form.as_ref().ok_or_else(|| anyhow::anyhow!("No form open"))?;
        let api = self.api.as_ref().ok_or_else(|| anyhow::anyhow!("No API client available"))?;
        match (form.kind, &form.editing) {
            (FormKind::Task, None) => {
                api.create_task(&form.task_draft()?).await?;
                Ok("Task saved".into())
            }
            (FormKind::Task, Some(id)) => {
                api.update_task(id, &form.task_draft()?).await?;
                Ok("Task saved".into())
            }
            (FormKind::Milestone, None) => {
                api.create_milestone(&form.milestone_draft()?).await?;
                Ok("Milestone saved".into())
            }
            (FormKind::Milestone, Some(id)) => {
                api.update_milestone(id, &form.milestone_draft()?).await?;
                Ok("Milestone saved".into())
            }
            (FormKind::Progress, Some(id)) => {
                let p: u8 = form.values[0]
                    .parse()
                    .map_err(|_| anyhow::anyhow!("Invalid progress '{}'", form.values[0]))?;
                api.update_task_progress(id, p.min(100)).await?;
                Ok(format!("Progress set to {}%", p.min(100)))
            }
            (FormKind::Progress, None) => anyhow::bail!("No task selected"),
        }
    }

    /// Toggles completion of the selected milestone.
    pub async fn toggle_selected(&mut self) {
        let Some(Selected::Milestone(id)) = self.selected() else {
            self.set_error("Select a milestone to toggle it".into());
            return;
        };
        let Some(api) = &self.api else { return; };
        match api.toggle_milestone(&id).await {
            Ok(_) => {
                self.set_info("Milestone toggled".into());
                self.refresh_keep_status().await;
            }
            Err(e) => self.set_error(format!("{:#}", e)),
        }
    }

    pub fn start_delete(&mut self) {
        if let Some(sel) = self.selected() {
            self.pending_delete = Some(sel);
            self.input_mode = InputMode::Confirm;
        }
    }

    pub async fn confirm_delete(&mut self) {
        let Some(sel) = self.pending_delete.take() else { return; };
        self.input_mode = InputMode::Normal;
        let Some(api) = &self.api else { return; };
        let res = match &sel {
            Selected::Task(id) => api.delete_task(id).await,
            Selected::Milestone(id) => api.delete_milestone(id).await,
        };
        match res {
            Ok(_) => {
                self.set_info("Deleted".into());
                self.refresh_keep_status().await;
            }
            Err(e) => self.set_error(format!("{:#}", e)),
        }
    }

    /// Refreshes after a mutation without hiding its confirmation unless the
    /// refresh itself fails.
    async fn refresh_keep_status(&mut self) {
        let status = self.status.clone();
        self.refresh().await;
        if !matches!(self.status, Some((_, true))) {
            self.status = status;
        }
    }
}
