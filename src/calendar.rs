use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc};
use crate::models::{Milestone, Task, TaskStatus};
use crate::normalize::normalize_date;

/// Title prefix that sets milestones apart from tasks.
pub const MILESTONE_MARKER: &str = "🎯 ";

/// Number of days the agenda view covers.
pub const AGENDA_LENGTH_DAYS: i64 = 30;

/// Style class of a calendar event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventClass {
    Pending,
    InProgress,
    Completed,
    OnHold,
    Cancelled,
    Milestone,
}

impl EventClass {
    pub fn for_status(status: TaskStatus) -> EventClass {
        match status {
            TaskStatus::Pending => EventClass::Pending,
            TaskStatus::InProgress => EventClass::InProgress,
            TaskStatus::Completed => EventClass::Completed,
            TaskStatus::OnHold => EventClass::OnHold,
            TaskStatus::Cancelled => EventClass::Cancelled,
        }
    }

    /// CSS-style class name, e.g. `event-in-progress`.
    pub fn class_name(&self) -> &'static str {
        match self {
            EventClass::Pending => "event-pending",
            EventClass::InProgress => "event-in-progress",
            EventClass::Completed => "event-completed",
            EventClass::OnHold => "event-on-hold",
            EventClass::Cancelled => "event-cancelled",
            EventClass::Milestone => "event-milestone",
        }
    }

    /// Background color of the event.
    pub fn color(&self) -> &'static str {
        match self {
            EventClass::Pending => "#94a3b8",
            EventClass::InProgress => "#3b82f6",
            EventClass::Completed => "#10b981",
            EventClass::OnHold => "#f59e0b",
            EventClass::Cancelled => "#ef4444",
            EventClass::Milestone => "#8b5cf6",
        }
    }
}

/// The record an event was projected from.
#[derive(Debug, Clone, PartialEq)]
pub enum EventSource {
    Task(Task),
    Milestone(Milestone),
}

impl EventSource {
    pub fn kind(&self) -> &'static str {
        match self {
            EventSource::Task(_) => "task",
            EventSource::Milestone(_) => "milestone",
        }
    }
}

/// A displayable interval on the calendar. `end` is always after `start`.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub all_day: bool,
    pub source: EventSource,
    pub class: EventClass,
}

/// Returns `end` when it lies after `start`, otherwise `start` plus one day.
///
/// `None` when the repaired end would fall past the last representable instant.
pub fn ensure_end_after_start(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<DateTime<Utc>> {
    if end > start {
        Some(end)
    } else {
        start.checked_add_signed(Duration::days(1))
    }
}

/// Projects a task into a calendar event, or `None` if either date is unusable.
pub fn task_event(task: &Task) -> Option<CalendarEvent> {
    let range = normalize_date(&task.start_date)
        .zip(normalize_date(&task.end_date))
        .and_then(|(start, end)| Some((start, ensure_end_after_start(start, end)?)));
    let Some((start, end)) = range else {
        log::debug!("Task '{}' has no drawable date range", task.id);
        return None;
    };
    Some(CalendarEvent {
        id: format!("task-{}", task.id),
        title: task.title.clone(),
        start,
        end,
        all_day: false,
        source: EventSource::Task(task.clone()),
        class: EventClass::for_status(task.status),
    })
}

/// Projects a milestone into a one-day, all-day event.
pub fn milestone_event(milestone: &Milestone) -> Option<CalendarEvent> {
    let span = normalize_date(&milestone.date).and_then(|d| Some((d, d.checked_add_signed(Duration::days(1))?)));
    let Some((date, end)) = span else {
        log::debug!("Milestone '{}' has no usable date", milestone.id);
        return None;
    };
    let class = if milestone.is_completed { EventClass::Completed } else { EventClass::Milestone };
    Some(CalendarEvent {
        id: format!("milestone-{}", milestone.id),
        title: format!("{}{}", MILESTONE_MARKER, milestone.title),
        start: date,
        end,
        all_day: true,
        source: EventSource::Milestone(milestone.clone()),
        class,
    })
}

/// Projects tasks and milestones into calendar events.
///
/// Records without usable dates are left out. Task events come first,
/// followed by milestone events.
pub fn project_calendar(tasks: &[Task], milestones: &[Milestone]) -> Vec<CalendarEvent> {
    tasks
        .iter()
        .filter_map(task_event)
        .chain(milestones.iter().filter_map(milestone_event))
        .collect()
}

/// Calendar display modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalendarView {
    #[default]
    Month,
    Week,
    Day,
    Agenda,
}

impl CalendarView {
    pub fn parse(s: &str) -> Option<CalendarView> {
        match s.trim().to_lowercase().as_str() {
            "month" => Some(CalendarView::Month),
            "week" => Some(CalendarView::Week),
            "day" => Some(CalendarView::Day),
            "agenda" => Some(CalendarView::Agenda),
            _ => None,
        }
    }

    /// Half-open date range shown for the given anchor day.
    ///
    /// Ranges are cut short at the edges of the representable calendar.
    pub fn range(&self, anchor: NaiveDate) -> (NaiveDate, NaiveDate) {
        let after = |from: NaiveDate, days: i64| from.checked_add_signed(Duration::days(days)).unwrap_or(NaiveDate::MAX);
        match self {
            CalendarView::Month => {
                let first = anchor.with_day(1).unwrap_or(anchor);
                let next = first.checked_add_months(Months::new(1)).unwrap_or(NaiveDate::MAX);
                (first, next)
            }
            CalendarView::Week => {
                let back = Duration::days(anchor.weekday().num_days_from_monday() as i64);
                let monday = anchor.checked_sub_signed(back).unwrap_or(NaiveDate::MIN);
                (monday, after(monday, 7))
            }
            CalendarView::Day => (anchor, after(anchor, 1)),
            CalendarView::Agenda => (anchor, after(anchor, AGENDA_LENGTH_DAYS)),
        }
    }
}

/// Keeps events overlapping `[from, to)` and sorts them by start.
pub fn events_in_range(events: &[CalendarEvent], from: NaiveDate, to: NaiveDate) -> Vec<CalendarEvent> {
    let (Some(from), Some(to)) = (normalize_date(&from), normalize_date(&to)) else {
        return Vec::new();
    };
    let mut visible: Vec<CalendarEvent> = events
        .iter()
        .filter(|e| e.start < to && e.end > from)
        .cloned()
        .collect();
    visible.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));
    visible
}
