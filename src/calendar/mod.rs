#![forbid(unsafe_code)]

//! Weekly calendar over the board's tasks.
//!
//! Day buckets are derived, never stored. They are rebuilt from the stored
//! board whenever the visible week changes and after every date write-back.

use serde::Serialize;
use time::macros::format_description;
use time::{Date, Duration, OffsetDateTime};

use crate::board::{self, Task};
use crate::dragdrop;
use crate::store::{self, BOARD_KEY, Storage};

pub const DAYS_PER_WEEK: usize = 7;

/// Duration shown for tasks without an estimate.
pub const DEFAULT_DURATION_MINUTES: u32 = 15;

const WEEKDAY_LABELS: [&str; DAYS_PER_WEEK] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CalendarTask {
    pub id: String,
    pub title: String,
    pub day_index: usize,
    pub task_type_id: String,
    pub duration_minutes: u32,
}

pub type WeekBuckets = [Vec<CalendarTask>; DAYS_PER_WEEK];

/// Parses `YYYY-MM-DD`, or the date part of an ISO 8601 timestamp.
#[must_use]
pub fn parse_date(input: &str) -> Option<Date> {
    let s = input.trim();
    let (day, rest) = if s.len() > 10 && s.is_char_boundary(10) {
        s.split_at(10)
    } else {
        (s, "")
    };
    if !(rest.is_empty() || rest.starts_with('T') || rest.starts_with(' ')) {
        return None;
    }
    Date::parse(day, format_description!("[year]-[month]-[day]")).ok()
}

#[must_use]
pub fn format_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// Today's date in the local timezone, or UTC when the offset is unknown.
#[must_use]
pub fn today() -> Date {
    OffsetDateTime::now_local()
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .date()
}

/// The Monday on or before `date`.
#[must_use]
pub fn week_start(date: Date) -> Date {
    let back = i64::from(date.weekday().number_days_from_monday());
    date.saturating_sub(Duration::days(back))
}

#[must_use]
pub fn duration_minutes(task: &Task) -> u32 {
    match task.estimated_time_hours {
        Some(h) if h.is_finite() && h > 0.0 => {
            let minutes = (h * 60.0).round();
            if minutes >= f64::from(u32::MAX) {
                u32::MAX
            } else {
                minutes as u32
            }
        }
        _ => DEFAULT_DURATION_MINUTES,
    }
}

/// Schedule date when it parses, else due date.
#[must_use]
pub fn effective_date(task: &Task) -> Option<Date> {
    task.schedule_date
        .as_deref()
        .and_then(parse_date)
        .or_else(|| parse_date(&task.due_date))
}

/// Buckets `tasks` into the seven days starting at `week_start`. Tasks keep
/// their input order within a day; undated or out-of-week tasks are left out.
pub fn project<'a>(week_start: Date, tasks: impl IntoIterator<Item = &'a Task>) -> WeekBuckets {
    let mut days: WeekBuckets = std::array::from_fn(|_| Vec::new());
    for task in tasks {
        let Some(date) = effective_date(task) else {
            continue;
        };
        let offset = (date - week_start).whole_days();
        let Ok(day_index) = usize::try_from(offset) else {
            continue;
        };
        if day_index >= DAYS_PER_WEEK {
            continue;
        }
        days[day_index].push(CalendarTask {
            id: task.id.clone(),
            title: task.title.clone(),
            day_index,
            task_type_id: task.type_id().to_owned(),
            duration_minutes: duration_minutes(task),
        });
    }
    days
}

/// Rewrites the date that places `task` on the calendar: the schedule date
/// if set, else the due date if set, else a new schedule date.
pub fn reschedule(task: &mut Task, date: Date) {
    let value = format_date(date);
    if task.schedule_date.is_some() {
        task.schedule_date = Some(value);
    } else if !task.due_date.trim().is_empty() {
        task.due_date = value;
    } else {
        task.schedule_date = Some(value);
    }
}

#[derive(Debug)]
pub struct Calendar<S> {
    store: S,
    week_start: Date,
    selected: Date,
    days: WeekBuckets,
}

impl<S: Storage> Calendar<S> {
    pub fn new(store: S, date: Date) -> anyhow::Result<Self> {
        let mut calendar = Self {
            store,
            week_start: week_start(date),
            selected: date,
            days: std::array::from_fn(|_| Vec::new()),
        };
        calendar.refresh()?;
        Ok(calendar)
    }

    /// Re-reads the stored board and rebuilds the day buckets.
    pub fn refresh(&mut self) -> anyhow::Result<()> {
        let columns = board::read_columns(&self.store)?.unwrap_or_default();
        self.days = project(self.week_start, columns.iter().flat_map(|c| c.tasks.iter()));
        tracing::debug!(
            week_start = %format_date(self.week_start),
            tasks = self.days.iter().map(Vec::len).sum::<usize>(),
            "calendar projected"
        );
        Ok(())
    }

    #[must_use]
    pub fn week_start(&self) -> Date {
        self.week_start
    }

    #[must_use]
    pub fn week_end(&self) -> Date {
        self.week_start.saturating_add(Duration::days(6))
    }

    #[must_use]
    pub fn selected_date(&self) -> Date {
        self.selected
    }

    #[must_use]
    pub fn days(&self) -> &WeekBuckets {
        &self.days
    }

    #[must_use]
    pub fn day(&self, day_index: usize) -> &[CalendarTask] {
        self.days
            .get(day_index)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn date_of(&self, day_index: usize) -> Date {
        let day = day_index.min(DAYS_PER_WEEK - 1) as i64;
        self.week_start.saturating_add(Duration::days(day))
    }

    /// `Mon 03` style labels for the displayed week.
    #[must_use]
    pub fn day_labels(&self) -> [String; DAYS_PER_WEEK] {
        std::array::from_fn(|i| format!("{} {:02}", WEEKDAY_LABELS[i], self.date_of(i).day()))
    }

    #[must_use]
    pub fn find(&self, task_id: &str) -> Option<&CalendarTask> {
        self.days.iter().flatten().find(|t| t.id == task_id)
    }

    pub fn previous_week(&mut self) -> anyhow::Result<()> {
        self.select_date(self.selected.saturating_sub(Duration::days(7)))
    }

    pub fn next_week(&mut self) -> anyhow::Result<()> {
        self.select_date(self.selected.saturating_add(Duration::days(7)))
    }

    pub fn go_to_today(&mut self, today: Date) -> anyhow::Result<()> {
        self.select_date(today)
    }

    pub fn select_date(&mut self, date: Date) -> anyhow::Result<()> {
        self.selected = date;
        self.week_start = week_start(date);
        self.refresh()
    }

    /// Moves a task to another day of the displayed week by rewriting its
    /// date on the stored board, then re-projects from storage.
    ///
    /// Returns `false` when the task is not on the stored board.
    pub fn move_task(&mut self, task_id: &str, to_day: usize) -> anyhow::Result<bool> {
        let mut columns = board::read_columns(&self.store)?.unwrap_or_default();
        let Some(task) = columns
            .iter_mut()
            .flat_map(|c| c.tasks.iter_mut())
            .find(|t| t.id == task_id)
        else {
            tracing::warn!(task = task_id, "calendar move for a task missing from the board");
            return Ok(false);
        };

        reschedule(task, self.date_of(to_day));
        store::save_json(&self.store, BOARD_KEY, &columns)?;
        self.refresh()?;
        Ok(true)
    }

    /// Same-day reorder. Only the displayed buckets change; the next refresh
    /// restores board order.
    pub fn reorder_day(&mut self, day_index: usize, from: usize, to: usize) -> bool {
        self.days
            .get_mut(day_index)
            .is_some_and(|day| dragdrop::move_item(day, from, to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, TaskDraft};
    use crate::store::MemoryStore;
    use time::macros::date;

    fn task(id: &str, due: &str) -> Task {
        Task {
            id: id.to_owned(),
            title: id.to_uppercase(),
            description: String::new(),
            priority: board::Priority::Medium,
            due_date: due.to_owned(),
            assignee: None,
            estimated_time_hours: None,
            schedule_date: None,
            task_type_id: None,
        }
    }

    #[test]
    fn week_starts_on_monday() {
        assert_eq!(week_start(date!(2024 - 06 - 03)), date!(2024 - 06 - 03));
        assert_eq!(week_start(date!(2024 - 06 - 05)), date!(2024 - 06 - 03));
        assert_eq!(week_start(date!(2024 - 06 - 09)), date!(2024 - 06 - 03));
        assert_eq!(week_start(date!(2024 - 06 - 10)), date!(2024 - 06 - 10));
    }

    #[test]
    fn parses_dates_and_timestamps() {
        assert_eq!(parse_date("2024-06-03"), Some(date!(2024 - 06 - 03)));
        assert_eq!(
            parse_date("2024-06-03T10:00:00.000Z"),
            Some(date!(2024 - 06 - 03))
        );
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("2024-13-01"), None);
        assert_eq!(parse_date("2024-06-031"), None);
        assert_eq!(format_date(date!(2024 - 01 - 09)), "2024-01-09");
    }

    #[test]
    fn due_date_on_week_start_is_day_zero_with_default_duration() {
        let t = task("t", "2024-06-03");
        let days = project(date!(2024 - 06 - 03), [&t]);
        assert_eq!(days[0].len(), 1);
        assert_eq!(days[0][0].duration_minutes, 15);
        assert_eq!(days[0][0].task_type_id, "operational");
        assert!(days[1..].iter().all(Vec::is_empty));
    }

    #[test]
    fn window_is_half_open() {
        let inside = task("in", "2024-06-09");
        let outside = task("out", "2024-06-10");
        let before = task("before", "2024-06-02");
        let undated = task("undated", "soon");
        let days = project(date!(2024 - 06 - 03), [&inside, &outside, &before, &undated]);
        assert_eq!(days[6].len(), 1);
        assert_eq!(days[6][0].id, "in");
        assert_eq!(days.iter().map(Vec::len).sum::<usize>(), 1);
    }

    #[test]
    fn schedule_date_wins_over_due_date() {
        let mut t = task("t", "2024-06-03");
        t.schedule_date = Some("2024-06-07".to_owned());
        t.estimated_time_hours = Some(1.5);
        let days = project(date!(2024 - 06 - 03), [&t]);
        assert_eq!(days[4][0].duration_minutes, 90);

        t.schedule_date = Some("not a date".to_owned());
        let days = project(date!(2024 - 06 - 03), [&t]);
        assert_eq!(days[0].len(), 1);
    }

    #[test]
    fn projection_is_deterministic() {
        let tasks: Vec<Task> = (0..10)
            .map(|i| task(&format!("t{i}"), &format!("2024-06-{:02}", 1 + i)))
            .collect();
        let a = project(date!(2024 - 06 - 03), &tasks);
        let b = project(date!(2024 - 06 - 03), &tasks);
        assert_eq!(a, b);
    }

    #[test]
    fn reschedule_prefers_schedule_then_due() {
        let mut t = task("t", "2024-06-03");
        reschedule(&mut t, date!(2024 - 06 - 05));
        assert_eq!(t.due_date, "2024-06-05");
        assert_eq!(t.schedule_date, None);

        t.schedule_date = Some("2024-06-05".to_owned());
        reschedule(&mut t, date!(2024 - 06 - 06));
        assert_eq!(t.schedule_date.as_deref(), Some("2024-06-06"));
        assert_eq!(t.due_date, "2024-06-05");

        let mut undated = task("u", "");
        reschedule(&mut undated, date!(2024 - 06 - 04));
        assert_eq!(undated.schedule_date.as_deref(), Some("2024-06-04"));
    }

    #[test]
    fn moving_across_days_writes_back_and_reprojects() {
        let store = MemoryStore::new();
        let names = ["New".to_owned(), "Scheduled".to_owned()];
        let mut board = Board::load_or_seed(&store, &names).unwrap();
        let new = board.columns()[0].id.clone();
        let t = board
            .add_task(
                &new,
                TaskDraft {
                    title: "T".to_owned(),
                    due_date: "2024-06-03".to_owned(),
                    ..TaskDraft::default()
                },
            )
            .unwrap();

        let mut cal = Calendar::new(&store, date!(2024 - 06 - 05)).unwrap();
        assert_eq!(cal.week_start(), date!(2024 - 06 - 03));
        assert_eq!(cal.day(0).len(), 1);

        assert!(cal.move_task(&t.id, 2).unwrap());
        assert!(cal.day(0).is_empty());
        assert_eq!(cal.day(2)[0].id, t.id);

        board.reload().unwrap();
        let (_, stored) = board.find_task(&t.id).unwrap();
        assert_eq!(stored.due_date, "2024-06-05");
        assert_eq!(stored.schedule_date, None);

        assert!(!cal.move_task("ghost", 1).unwrap());
    }

    #[test]
    fn navigation_recomputes_the_week() {
        let store = MemoryStore::new();
        let mut board = Board::load_or_seed(&store, &["New".to_owned()]).unwrap();
        let new = board.columns()[0].id.clone();
        board
            .add_task(
                &new,
                TaskDraft {
                    title: "Next".to_owned(),
                    due_date: "2024-06-12".to_owned(),
                    ..TaskDraft::default()
                },
            )
            .unwrap();

        let mut cal = Calendar::new(&store, date!(2024 - 06 - 03)).unwrap();
        assert!(cal.days().iter().all(Vec::is_empty));

        cal.next_week().unwrap();
        assert_eq!(cal.week_start(), date!(2024 - 06 - 10));
        assert_eq!(cal.day(2).len(), 1);
        assert_eq!(cal.day_labels()[2], "Wed 12");

        cal.previous_week().unwrap();
        assert_eq!(cal.week_start(), date!(2024 - 06 - 03));

        cal.select_date(date!(2024 - 06 - 16)).unwrap();
        assert_eq!(cal.week_start(), date!(2024 - 06 - 10));
        assert_eq!(cal.week_end(), date!(2024 - 06 - 16));

        cal.go_to_today(date!(2024 - 06 - 04)).unwrap();
        assert_eq!(cal.week_start(), date!(2024 - 06 - 03));
        assert_eq!(cal.selected_date(), date!(2024 - 06 - 04));
    }

    #[test]
    fn reorder_day_is_transient() {
        let store = MemoryStore::new();
        let mut board = Board::load_or_seed(&store, &["New".to_owned()]).unwrap();
        let new = board.columns()[0].id.clone();
        for title in ["A", "B"] {
            board
                .add_task(
                    &new,
                    TaskDraft {
                        title: title.to_owned(),
                        due_date: "2024-06-04".to_owned(),
                        ..TaskDraft::default()
                    },
                )
                .unwrap();
        }

        let mut cal = Calendar::new(&store, date!(2024 - 06 - 04)).unwrap();
        assert!(cal.reorder_day(1, 1, 0));
        assert_eq!(cal.day(1)[0].title, "B");
        assert!(!cal.reorder_day(9, 0, 1));

        cal.refresh().unwrap();
        assert_eq!(cal.day(1)[0].title, "A");
    }
}
