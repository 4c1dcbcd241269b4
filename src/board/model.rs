#![forbid(unsafe_code)]

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Type tag used when a task carries none.
pub const DEFAULT_TASK_TYPE: &str = "operational";

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(format!("expected low|medium|high, got '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub due_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_type_id: Option<String>,
}

impl Task {
    #[must_use]
    pub fn new_id() -> String {
        Uuid::new_v4().simple().to_string()
    }

    #[must_use]
    pub fn from_draft(draft: TaskDraft) -> Self {
        Self {
            id: Self::new_id(),
            title: draft.title,
            description: draft.description,
            priority: draft.priority,
            due_date: draft.due_date,
            assignee: draft.assignee,
            estimated_time_hours: draft.estimated_time_hours,
            schedule_date: draft.schedule_date,
            task_type_id: draft.task_type_id,
        }
    }

    #[must_use]
    pub fn type_id(&self) -> &str {
        self.task_type_id
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_TASK_TYPE)
    }

    /// Applies every field present in `patch`. The column move, if any, is
    /// the board's business.
    pub fn apply(&mut self, patch: &TaskPatch) {
        if let Some(title) = &patch.title {
            self.title.clone_from(title);
        }
        if let Some(description) = &patch.description {
            self.description.clone_from(description);
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(due) = &patch.due_date {
            self.due_date.clone_from(due);
        }
        if let Some(assignee) = &patch.assignee {
            self.assignee.clone_from(assignee);
        }
        if let Some(hours) = patch.estimated_time_hours {
            self.estimated_time_hours = hours;
        }
        if let Some(schedule) = &patch.schedule_date {
            self.schedule_date.clone_from(schedule);
        }
        if let Some(type_id) = &patch.task_type_id {
            self.task_type_id.clone_from(type_id);
        }
    }
}

/// Field bundle for a task that does not exist yet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub due_date: String,
    pub assignee: Option<String>,
    pub estimated_time_hours: Option<f64>,
    pub schedule_date: Option<String>,
    pub task_type_id: Option<String>,
}

/// Partial update. `None` leaves a field alone; for optional task fields
/// `Some(None)` clears them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub due_date: Option<String>,
    pub assignee: Option<Option<String>>,
    pub estimated_time_hours: Option<Option<f64>>,
    pub schedule_date: Option<Option<String>>,
    pub task_type_id: Option<Option<String>>,
    /// Owning column after the update.
    pub column_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Column {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Column {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: format!("col-{}", Task::new_id()),
            title: title.into(),
            tasks: Vec::new(),
        }
    }

    #[must_use]
    pub fn position(&self, task_id: &str) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == task_id)
    }
}
