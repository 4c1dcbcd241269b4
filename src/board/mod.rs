#![forbid(unsafe_code)]

//! The kanban board: an ordered list of columns, each an ordered list of
//! tasks. Column membership is a task's status and list order is its rank.
//!
//! Every successful mutation writes the whole board back to storage.

pub mod form;
pub mod model;

use crate::dragdrop;
use crate::error::WeekboardError;
use crate::store::{self, BOARD_KEY, Loaded, Storage};

pub use model::{Column, DEFAULT_TASK_TYPE, Priority, Task, TaskDraft, TaskPatch};

#[derive(Debug)]
pub struct Board<S> {
    store: S,
    columns: Vec<Column>,
}

impl<S: Storage> Board<S> {
    /// Loads the stored board. A missing or malformed document yields an
    /// empty board.
    pub fn load(store: S) -> anyhow::Result<Self> {
        let columns = read_columns(&store)?.unwrap_or_default();
        Ok(Self { store, columns })
    }

    /// Like [`Board::load`], but creates and persists `default_columns` when
    /// no board has been stored yet.
    pub fn load_or_seed(store: S, default_columns: &[String]) -> anyhow::Result<Self> {
        if let Some(columns) = read_columns(&store)? {
            return Ok(Self { store, columns });
        }
        let board = Self {
            store,
            columns: default_columns.iter().map(Column::new).collect(),
        };
        board.persist()?;
        Ok(board)
    }

    /// Replaces in-memory state with whatever storage holds now.
    pub fn reload(&mut self) -> anyhow::Result<()> {
        self.columns = read_columns(&self.store)?.unwrap_or_default();
        Ok(())
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    #[must_use]
    pub fn column(&self, column_id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == column_id)
    }

    /// All tasks in board order: column by column, rank by rank.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.columns.iter().flat_map(|c| c.tasks.iter())
    }

    /// Finds a task together with its owning column.
    #[must_use]
    pub fn find_task(&self, task_id: &str) -> Option<(&Column, &Task)> {
        self.columns
            .iter()
            .find_map(|c| c.tasks.iter().find(|t| t.id == task_id).map(|t| (c, t)))
    }

    pub fn add_task(&mut self, column_id: &str, draft: TaskDraft) -> anyhow::Result<Task> {
        let idx = self.resolve_column_index(column_id)?;
        let task = Task::from_draft(draft);
        self.columns[idx].tasks.push(task.clone());
        self.persist()?;
        tracing::debug!(task = %task.id, column = %self.columns[idx].id, "task added");
        Ok(task)
    }

    /// Applies `patch` in place. When the patch names another column the
    /// task moves to that column's tail. Unknown task ids leave the board
    /// untouched and return `None`.
    pub fn update_task(&mut self, task_id: &str, patch: &TaskPatch) -> anyhow::Result<Option<Task>> {
        let Some((col_idx, pos)) = self.locate(task_id) else {
            tracing::warn!(task = task_id, "update for unknown task ignored");
            return Ok(None);
        };

        self.columns[col_idx].tasks[pos].apply(patch);

        if let Some(target) = patch.column_id.as_deref() {
            let dest = self.resolve_column_index(target)?;
            if dest != col_idx {
                let task = self.columns[col_idx].tasks.remove(pos);
                self.columns[dest].tasks.push(task);
            }
        }

        self.persist()?;
        Ok(self.find_task(task_id).map(|(_, t)| t.clone()))
    }

    pub fn delete_task(&mut self, column_id: &str, task_id: &str) -> anyhow::Result<Option<Task>> {
        let Some(column) = self.columns.iter_mut().find(|c| c.id == column_id) else {
            return Ok(None);
        };
        let Some(pos) = column.position(task_id) else {
            return Ok(None);
        };
        let removed = column.tasks.remove(pos);
        self.persist()?;
        Ok(Some(removed))
    }

    pub fn add_column(&mut self, title: &str) -> anyhow::Result<Column> {
        let column = Column::new(title);
        self.columns.push(column.clone());
        self.persist()?;
        Ok(column)
    }

    /// Removes a column and every task in it.
    pub fn delete_column(&mut self, column_id: &str) -> anyhow::Result<Option<Column>> {
        let Some(pos) = self.columns.iter().position(|c| c.id == column_id) else {
            return Ok(None);
        };
        let removed = self.columns.remove(pos);
        self.persist()?;
        Ok(Some(removed))
    }

    pub fn rename_column(&mut self, column_id: &str, title: &str) -> anyhow::Result<bool> {
        let Some(column) = self.columns.iter_mut().find(|c| c.id == column_id) else {
            return Ok(false);
        };
        title.clone_into(&mut column.title);
        self.persist()?;
        Ok(true)
    }

    pub fn move_column(&mut self, from: usize, to: usize) -> anyhow::Result<bool> {
        if !dragdrop::move_item(&mut self.columns, from, to) {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    /// Same-column drag: moves the task at `from` to `to`.
    pub fn reorder(&mut self, column_id: &str, from: usize, to: usize) -> anyhow::Result<bool> {
        let Some(column) = self.columns.iter_mut().find(|c| c.id == column_id) else {
            return Ok(false);
        };
        if !dragdrop::move_item(&mut column.tasks, from, to) {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    /// Cross-column drag. Returns the index the task landed at in the
    /// destination column.
    pub fn transfer(
        &mut self,
        from_column_id: &str,
        to_column_id: &str,
        from: usize,
        to: usize,
    ) -> anyhow::Result<Option<usize>> {
        let src = self.columns.iter().position(|c| c.id == from_column_id);
        let dst = self.columns.iter().position(|c| c.id == to_column_id);
        let (Some(src), Some(dst)) = (src, dst) else {
            return Ok(None);
        };

        if src == dst {
            let len = self.columns[src].tasks.len();
            if !self.reorder(from_column_id, from, to)? {
                return Ok(None);
            }
            return Ok(Some(to.min(len - 1)));
        }

        let (src_col, dst_col) = pair_mut(&mut self.columns, src, dst);
        let landed = dragdrop::transfer_item(&mut src_col.tasks, &mut dst_col.tasks, from, to);
        if landed.is_some() {
            self.persist()?;
        }
        Ok(landed)
    }

    fn locate(&self, task_id: &str) -> Option<(usize, usize)> {
        self.columns
            .iter()
            .enumerate()
            .find_map(|(ci, c)| c.position(task_id).map(|ti| (ci, ti)))
    }

    fn resolve_column_index(&self, column_id: &str) -> Result<usize, WeekboardError> {
        if let Some(idx) = self.columns.iter().position(|c| c.id == column_id) {
            return Ok(idx);
        }
        if self.columns.is_empty() {
            return Err(WeekboardError::NoColumns);
        }
        tracing::warn!(column = column_id, "unknown column, using the first column");
        Ok(0)
    }

    fn persist(&self) -> anyhow::Result<()> {
        store::save_json(&self.store, BOARD_KEY, &self.columns)
    }
}

/// Reads the stored columns. `None` means nothing has been stored yet.
pub fn read_columns(store: &impl Storage) -> anyhow::Result<Option<Vec<Column>>> {
    Ok(match store::load_json(store, BOARD_KEY)? {
        Loaded::Missing => None,
        Loaded::Malformed => Some(Vec::new()),
        Loaded::Value(columns) => Some(columns),
    })
}

fn pair_mut<T>(items: &mut [T], a: usize, b: usize) -> (&mut T, &mut T) {
    if a < b {
        let (left, right) = items.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = items.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}

/// Finds a column by id or by case-insensitive title.
pub fn resolve_column_ref<'a>(columns: &'a [Column], reference: &str) -> Result<&'a Column, WeekboardError> {
    let r = reference.trim();
    columns
        .iter()
        .find(|c| c.id == r)
        .or_else(|| columns.iter().find(|c| c.title.eq_ignore_ascii_case(r)))
        .ok_or_else(|| WeekboardError::ColumnNotFound(reference.to_owned()))
}

/// Finds a task by exact id or unique id prefix.
pub fn resolve_task_ref<'a, S: Storage>(
    board: &'a Board<S>,
    reference: &str,
) -> Result<(&'a Column, &'a Task), WeekboardError> {
    let r = reference.trim();
    if r.is_empty() {
        return Err(WeekboardError::TaskNotFound(reference.to_owned()));
    }
    if let Some(found) = board.find_task(r) {
        return Ok(found);
    }
    let mut matches = board.columns().iter().flat_map(|c| {
        c.tasks
            .iter()
            .filter(|t| t.id.starts_with(r))
            .map(move |t| (c, t))
    });
    match (matches.next(), matches.next()) {
        (Some(found), None) => Ok(found),
        (Some(_), Some(_)) => Err(WeekboardError::AmbiguousTask(reference.to_owned())),
        (None, _) => Err(WeekboardError::TaskNotFound(reference.to_owned())),
    }
}
