use std::fmt;

use serde::{Deserialize, Serialize};

use crate::api::TimelineSource;
use crate::calendar::{milestone_event, project_calendar, task_event, CalendarEvent};
use crate::gantt::{project_gantt, GanttRow};
use crate::locale::Locale;
use crate::models::{Milestone, Property, Task};
use crate::normalize::{decode_records, normalize_date};

/// The three collections fetched from the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Tasks,
    Milestones,
    Properties,
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Collection::Tasks => "tasks",
            Collection::Milestones => "milestones",
            Collection::Properties => "properties",
        })
    }
}

/// Outcome of a refresh: which collections could not be fetched and why.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub failures: Vec<(Collection, String)>,
}

impl LoadReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failed(&self, collection: Collection) -> bool {
        self.failures.iter().any(|(c, _)| *c == collection)
    }

    /// Why the collection could not be fetched, if it failed.
    pub fn reason(&self, collection: Collection) -> Option<&str> {
        self.failures.iter().find(|(c, _)| *c == collection).map(|(_, r)| r.as_str())
    }

    /// Fails `operation` with the fetch error when it depends on a
    /// collection that could not be loaded.
    pub fn ensure_loaded(&self, collection: Collection, operation: &str) -> anyhow::Result<()> {
        match self.reason(collection) {
            Some(reason) => anyhow::bail!("{} failed: could not load {}: {}", operation, collection, reason),
            None => Ok(()),
        }
    }

    /// One line naming every collection that failed.
    pub fn summary(&self) -> Option<String> {
        if self.failures.is_empty() {
            return None;
        }
        let parts: Vec<String> = self.failures.iter().map(|(c, r)| format!("{} ({})", c, r)).collect();
        Some(format!("Could not load {}. Showing partial data.", parts.join("; ")))
    }
}

/// Records the projections could not place.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HiddenRecords {
    pub tasks: usize,
    pub milestones: usize,
}

impl HiddenRecords {
    pub fn total(&self) -> usize {
        self.tasks + self.milestones
    }
}

/// In-memory copy of the timeline data owned by a view.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Timeline {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    #[serde(default)]
    pub properties: Vec<Property>,
}

impl Timeline {
    /// Fetches all three collections concurrently.
    ///
    /// A collection whose request fails is left empty and reported in the
    /// returned [`LoadReport`]; the others are still used.
    pub async fn load<S: TimelineSource>(source: &S) -> (Timeline, LoadReport) {
        let (tasks, milestones, properties) =
            tokio::join!(source.list_tasks(), source.list_milestones(), source.list_properties());

        let mut report = LoadReport::default();
        let mut timeline = Timeline::default();

        match tasks {
            Ok(res) => timeline.tasks = decode_records(res, "task"),
            Err(e) => report.failures.push((Collection::Tasks, format!("{:#}", e))),
        }
        match milestones {
            Ok(res) => timeline.milestones = decode_records(res, "milestone"),
            Err(e) => report.failures.push((Collection::Milestones, format!("{:#}", e))),
        }
        match properties {
            Ok(res) => timeline.properties = decode_records(res, "property"),
            Err(e) => report.failures.push((Collection::Properties, format!("{:#}", e))),
        }

        for (collection, reason) in &report.failures {
            log::error!("Error fetching {}: {}", collection, reason);
        }
        log::info!(
            "Loaded {} tasks, {} milestones, {} properties",
            timeline.tasks.len(),
            timeline.milestones.len(),
            timeline.properties.len()
        );

        (timeline, report)
    }

    pub fn calendar(&self) -> Vec<CalendarEvent> {
        project_calendar(&self.tasks, &self.milestones)
    }

    pub fn gantt(&self, locale: Locale) -> Vec<GanttRow> {
        project_gantt(&self.tasks, locale)
    }

    /// Counts records that neither view can draw.
    pub fn hidden_records(&self) -> HiddenRecords {
        HiddenRecords {
            tasks: self.tasks.iter().filter(|t| task_event(t).is_none()).count(),
            milestones: self.milestones.iter().filter(|m| milestone_event(m).is_none()).count(),
        }
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn milestone(&self, id: &str) -> Option<&Milestone> {
        self.milestones.iter().find(|m| m.id == id)
    }

    /// Display label of the property with the given id.
    pub fn property_label(&self, id: &str, locale: Locale) -> Option<String> {
        self.properties.iter().find(|p| p.id == id).map(|p| locale.property_label(p))
    }

    /// Milestones not yet completed whose reminder window covers `today`.
    pub fn due_reminders(&self, today: chrono::NaiveDate) -> Vec<&Milestone> {
        self.milestones
            .iter()
            .filter(|m| !m.is_completed)
            .filter(|m| {
                let Some(date) = normalize_date(&m.date).map(|d| d.date_naive()) else {
                    return false;
                };
                let lead = chrono::Duration::days(m.notify_before.unwrap_or(0).clamp(0, 3650));
                // A window reaching before the first representable day starts there.
                today <= date && date.checked_sub_signed(lead).map_or(true, |from| today >= from)
            })
            .collect()
    }
}
