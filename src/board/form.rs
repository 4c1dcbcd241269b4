#![forbid(unsafe_code)]

use std::fmt;

use time::Date;

use crate::board::model::{Priority, TaskDraft};
use crate::calendar::parse_date;

const MIN_TITLE_LEN: usize = 3;
const MIN_DESCRIPTION_LEN: usize = 10;

/// Raw field values as typed by the user. Empty strings mean "not given".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub due_date: String,
    pub assignee: String,
    pub estimated_time_hours: Option<f64>,
    pub schedule_date: String,
    pub task_type_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn field_error(field: &'static str, message: impl Into<String>) -> FieldError {
    FieldError {
        field,
        message: message.into(),
    }
}

pub fn check_title(title: &str) -> Result<(), FieldError> {
    let len = title.trim().chars().count();
    if len == 0 {
        return Err(field_error("title", "is required"));
    }
    if len < MIN_TITLE_LEN {
        return Err(field_error(
            "title",
            format!("must be at least {MIN_TITLE_LEN} characters"),
        ));
    }
    Ok(())
}

pub fn check_description(description: &str) -> Result<(), FieldError> {
    let len = description.trim().chars().count();
    if len > 0 && len < MIN_DESCRIPTION_LEN {
        return Err(field_error(
            "description",
            format!("must be at least {MIN_DESCRIPTION_LEN} characters"),
        ));
    }
    Ok(())
}

pub fn check_due_date(due: &str, today: Date) -> Result<(), FieldError> {
    if due.trim().is_empty() {
        return Err(field_error("due_date", "is required"));
    }
    let Some(date) = parse_date(due) else {
        return Err(field_error("due_date", format!("'{due}' is not a date (YYYY-MM-DD)")));
    };
    if date < today {
        return Err(field_error("due_date", "must not be in the past"));
    }
    Ok(())
}

pub fn check_schedule_date(schedule: &str) -> Result<(), FieldError> {
    if !schedule.trim().is_empty() && parse_date(schedule).is_none() {
        return Err(field_error(
            "schedule_date",
            format!("'{schedule}' is not a date (YYYY-MM-DD)"),
        ));
    }
    Ok(())
}

pub fn check_hours(hours: Option<f64>) -> Result<(), FieldError> {
    match hours {
        Some(h) if !h.is_finite() || h <= 0.0 => Err(field_error(
            "estimated_time_hours",
            "must be a positive number",
        )),
        _ => Ok(()),
    }
}

/// Validates every field and, when all pass, produces the draft the board
/// consumes.
pub fn validate(form: &TaskForm, today: Date) -> Result<TaskDraft, Vec<FieldError>> {
    let errors: Vec<FieldError> = [
        check_title(&form.title),
        check_description(&form.description),
        check_due_date(&form.due_date, today),
        check_schedule_date(&form.schedule_date),
        check_hours(form.estimated_time_hours),
    ]
    .into_iter()
    .filter_map(Result::err)
    .collect();

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(TaskDraft {
        title: form.title.trim().to_owned(),
        description: form.description.trim().to_owned(),
        priority: form.priority,
        due_date: form.due_date.trim().to_owned(),
        assignee: non_empty(&form.assignee),
        estimated_time_hours: form.estimated_time_hours,
        schedule_date: non_empty(&form.schedule_date),
        task_type_id: non_empty(&form.task_type_id),
    })
}

#[must_use]
pub fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_owned())
}
