#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;

use crate::error::WeekboardError;
use crate::store::{self, Loaded, Storage, comments_key};

/// Shown in place of initials when no name is known.
pub const ANONYMOUS_INITIALS: &str = "Me";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub can_edit: bool,
    #[serde(default)]
    pub liked: bool,
    #[serde(default)]
    pub likes: u32,
    // UI menu state, stored as-is.
    #[serde(default)]
    pub show_menu: bool,
}

/// The comment thread of one task, stored under its own key.
#[derive(Debug)]
pub struct CommentThread<S> {
    store: S,
    task_id: String,
    comments: Vec<Comment>,
}

impl<S: Storage> CommentThread<S> {
    pub fn load(store: S, task_id: &str) -> anyhow::Result<Self> {
        let comments = match store::load_json(&store, &comments_key(task_id))? {
            Loaded::Value(comments) => comments,
            Loaded::Missing | Loaded::Malformed => Vec::new(),
        };
        Ok(Self {
            store,
            task_id: task_id.to_owned(),
            comments,
        })
    }

    #[must_use]
    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    #[must_use]
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn add(&mut self, text: &str, author: &str) -> anyhow::Result<Comment> {
        let comment = Comment {
            id: Uuid::new_v4().simple().to_string(),
            text: text.trim().to_owned(),
            author: author.trim().to_owned(),
            created_at: now_rfc3339(),
            can_edit: true,
            liked: false,
            likes: 0,
            show_menu: false,
        };
        self.comments.push(comment.clone());
        self.save()?;
        Ok(comment)
    }

    pub fn edit(&mut self, comment_id: &str, text: &str) -> anyhow::Result<()> {
        let comment = self.find_mut(comment_id)?;
        text.trim().clone_into(&mut comment.text);
        self.save()
    }

    pub fn delete(&mut self, comment_id: &str) -> anyhow::Result<Comment> {
        let pos = self
            .comments
            .iter()
            .position(|c| c.id == comment_id)
            .ok_or_else(|| WeekboardError::CommentNotFound(comment_id.to_owned()))?;
        let removed = self.comments.remove(pos);
        self.save()?;
        Ok(removed)
    }

    /// Flips the like flag and moves the counter with it.
    pub fn toggle_like(&mut self, comment_id: &str) -> anyhow::Result<Comment> {
        let comment = self.find_mut(comment_id)?;
        comment.liked = !comment.liked;
        comment.likes = if comment.liked {
            comment.likes.saturating_add(1)
        } else {
            comment.likes.saturating_sub(1)
        };
        let updated = comment.clone();
        self.save()?;
        Ok(updated)
    }

    fn find_mut(&mut self, comment_id: &str) -> Result<&mut Comment, WeekboardError> {
        self.comments
            .iter_mut()
            .find(|c| c.id == comment_id)
            .ok_or_else(|| WeekboardError::CommentNotFound(comment_id.to_owned()))
    }

    fn save(&self) -> anyhow::Result<()> {
        store::save_json(&self.store, &comments_key(&self.task_id), &self.comments)
    }
}

/// Drops the stored thread of a deleted task.
pub fn delete_for_task(store: &impl Storage, task_id: &str) -> anyhow::Result<()> {
    store.remove(&comments_key(task_id))
}

/// Up to two uppercase initials, or `Me` for a missing name.
#[must_use]
pub fn initials(name: Option<&str>) -> String {
    let out: String = name
        .unwrap_or_default()
        .split_whitespace()
        .filter_map(|w| w.chars().next())
        .take(2)
        .flat_map(char::to_uppercase)
        .collect();
    if out.is_empty() {
        ANONYMOUS_INITIALS.to_owned()
    } else {
        out
    }
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "unknown".to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn thread_is_scoped_by_task() {
        let store = MemoryStore::new();
        let mut a = CommentThread::load(&store, "a").unwrap();
        a.add("first", "Ana").unwrap();
        let mut b = CommentThread::load(&store, "b").unwrap();
        b.add("other", "Bo").unwrap();

        let a = CommentThread::load(&store, "a").unwrap();
        assert_eq!(a.comments().len(), 1);
        assert_eq!(a.comments()[0].text, "first");
        assert!(a.comments()[0].can_edit);
        assert!(store.read("task-comments-b").unwrap().is_some());
    }

    #[test]
    fn like_toggles_counter() {
        let store = MemoryStore::new();
        let mut thread = CommentThread::load(&store, "t").unwrap();
        let c = thread.add("hello", "").unwrap();

        assert_eq!(thread.toggle_like(&c.id).unwrap().likes, 1);
        let unliked = thread.toggle_like(&c.id).unwrap();
        assert!(!unliked.liked);
        assert_eq!(unliked.likes, 0);
    }

    #[test]
    fn edit_and_delete() {
        let store = MemoryStore::new();
        let mut thread = CommentThread::load(&store, "t").unwrap();
        let c = thread.add("draft", "Me").unwrap();
        thread.edit(&c.id, "  final ").unwrap();
        assert_eq!(
            CommentThread::load(&store, "t").unwrap().comments()[0].text,
            "final"
        );

        thread.delete(&c.id).unwrap();
        assert!(thread.comments().is_empty());
        assert!(thread.delete(&c.id).is_err());
        assert!(thread.edit("nope", "x").is_err());

        delete_for_task(&store, "t").unwrap();
        assert!(store.read("task-comments-t").unwrap().is_none());
    }

    #[test]
    fn reads_stored_comment_shape() {
        let store = MemoryStore::new();
        store
            .write(
                "task-comments-t",
                r#"[{"id":"1","text":"hi","author":"Ana","createdAt":"2024-06-03T10:00:00Z","canEdit":false,"liked":true,"likes":4,"showMenu":true}]"#,
            )
            .unwrap();
        let thread = CommentThread::load(&store, "t").unwrap();
        let c = &thread.comments()[0];
        assert_eq!(c.likes, 4);
        assert!(c.show_menu);
        assert!(!c.can_edit);

        store.write("task-comments-t", "oops").unwrap();
        assert!(CommentThread::load(&store, "t").unwrap().comments().is_empty());
    }

    #[test]
    fn initials_default_to_me() {
        assert_eq!(initials(Some("ana maria lima")), "AM");
        assert_eq!(initials(Some("Bo")), "B");
        assert_eq!(initials(Some("   ")), "Me");
        assert_eq!(initials(None), "Me");
    }
}
