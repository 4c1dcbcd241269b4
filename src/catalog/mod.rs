#![forbid(unsafe_code)]

//! Task type catalog: tags for tasks and calendar events, with a display
//! color. Lookups never fail; unknown ids resolve to the operational type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::board::DEFAULT_TASK_TYPE;
use crate::store::{self, Loaded, Storage, TASK_TYPES_KEY};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaskType {
    pub id: String,
    pub name: String,
    pub color: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub for_tasks: bool,
    #[serde(default = "default_true")]
    pub for_events: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeFlag {
    Enabled,
    ForTasks,
    ForEvents,
}

impl FromStr for TypeFlag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "enabled" => Ok(TypeFlag::Enabled),
            "forTasks" | "for_tasks" | "tasks" => Ok(TypeFlag::ForTasks),
            "forEvents" | "for_events" | "events" => Ok(TypeFlag::ForEvents),
            other => Err(format!("expected enabled|forTasks|forEvents, got '{other}'")),
        }
    }
}

impl fmt::Display for TypeFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TypeFlag::Enabled => "enabled",
            TypeFlag::ForTasks => "forTasks",
            TypeFlag::ForEvents => "forEvents",
        })
    }
}

const DEFAULT_TYPES: [(&str, &str, &str); 10] = [
    (DEFAULT_TASK_TYPE, "Operational", "#3b82f6"),
    ("meeting", "Meeting", "#8b5cf6"),
    ("planning", "Planning", "#0ea5e9"),
    ("development", "Development", "#22c55e"),
    ("review", "Review", "#eab308"),
    ("research", "Research", "#14b8a6"),
    ("support", "Support", "#f97316"),
    ("maintenance", "Maintenance", "#64748b"),
    ("training", "Training", "#ec4899"),
    ("personal", "Personal", "#ef4444"),
];

#[must_use]
pub fn default_types() -> Vec<TaskType> {
    DEFAULT_TYPES
        .iter()
        .map(|(id, name, color)| TaskType {
            id: (*id).to_owned(),
            name: (*name).to_owned(),
            color: (*color).to_owned(),
            enabled: true,
            for_tasks: true,
            for_events: true,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    types: Vec<TaskType>,
    fallback: TaskType,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::from_types(default_types())
    }
}

impl Catalog {
    #[must_use]
    pub fn from_types(types: Vec<TaskType>) -> Self {
        let fallback = types
            .iter()
            .find(|t| t.id == DEFAULT_TASK_TYPE)
            .cloned()
            .or_else(|| default_types().into_iter().next())
            .unwrap_or_else(|| TaskType {
                id: DEFAULT_TASK_TYPE.to_owned(),
                name: "Operational".to_owned(),
                color: "#3b82f6".to_owned(),
                enabled: true,
                for_tasks: true,
                for_events: true,
            });
        Self { types, fallback }
    }

    /// Loads the stored catalog. Missing or malformed documents leave the
    /// built-in defaults in place.
    pub fn load(store: &impl Storage) -> anyhow::Result<Self> {
        Ok(match store::load_json::<Vec<TaskType>>(store, TASK_TYPES_KEY)? {
            Loaded::Value(types) => Self::from_types(types),
            Loaded::Missing | Loaded::Malformed => Self::default(),
        })
    }

    /// Replaces the stored catalog with this one.
    pub fn save(&self, store: &impl Storage) -> anyhow::Result<()> {
        store::save_json(store, TASK_TYPES_KEY, &self.types)
    }

    #[must_use]
    pub fn types(&self) -> &[TaskType] {
        &self.types
    }

    #[must_use]
    pub fn get(&self, type_id: &str) -> Option<&TaskType> {
        self.types.iter().find(|t| t.id == type_id)
    }

    #[must_use]
    pub fn resolve(&self, type_id: Option<&str>) -> &TaskType {
        type_id
            .and_then(|id| self.get(id))
            .unwrap_or(&self.fallback)
    }

    /// Types usable for tasks (`for_tasks == true`) or for calendar events,
    /// in catalog order.
    pub fn list_eligible(&self, for_tasks: bool) -> impl Iterator<Item = &TaskType> {
        self.types
            .iter()
            .filter(move |t| if for_tasks { t.for_tasks } else { t.for_events })
    }

    /// Sets one flag. Turning `for_tasks` on also enables the type; nothing
    /// else is coupled. Returns `false` for unknown ids.
    pub fn set_flag(&mut self, type_id: &str, flag: TypeFlag, value: bool) -> bool {
        let Some(entry) = self.types.iter_mut().find(|t| t.id == type_id) else {
            return false;
        };
        match flag {
            TypeFlag::Enabled => entry.enabled = value,
            TypeFlag::ForTasks => {
                entry.for_tasks = value;
                if value {
                    entry.enabled = true;
                }
            }
            TypeFlag::ForEvents => entry.for_events = value,
        }
        self.sync_fallback(type_id);
        true
    }

    pub fn rename(&mut self, type_id: &str, name: &str) -> bool {
        let Some(entry) = self.types.iter_mut().find(|t| t.id == type_id) else {
            return false;
        };
        name.trim().clone_into(&mut entry.name);
        self.sync_fallback(type_id);
        true
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn sync_fallback(&mut self, type_id: &str) {
        if type_id != DEFAULT_TASK_TYPE {
            return;
        }
        if let Some(entry) = self.get(DEFAULT_TASK_TYPE).cloned() {
            self.fallback = entry;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn seeds_ten_defaults() {
        let catalog = Catalog::default();
        assert_eq!(catalog.types().len(), 10);
        assert_eq!(catalog.types()[0].id, "operational");
    }

    #[test]
    fn resolve_never_fails() {
        let catalog = Catalog::default();
        assert_eq!(catalog.resolve(Some("meeting")).name, "Meeting");
        assert_eq!(catalog.resolve(Some("nope")).id, DEFAULT_TASK_TYPE);
        assert_eq!(catalog.resolve(None).id, DEFAULT_TASK_TYPE);

        let custom = Catalog::from_types(vec![]);
        assert_eq!(custom.resolve(Some("meeting")).id, DEFAULT_TASK_TYPE);
    }

    #[test]
    fn for_tasks_enables_but_not_the_reverse() {
        let mut catalog = Catalog::default();
        assert!(catalog.set_flag("review", TypeFlag::Enabled, false));
        assert!(catalog.set_flag("review", TypeFlag::ForTasks, false));
        assert!(!catalog.get("review").unwrap().enabled);

        catalog.set_flag("review", TypeFlag::ForTasks, true);
        let review = catalog.get("review").unwrap();
        assert!(review.enabled);
        assert!(review.for_tasks);

        catalog.set_flag("review", TypeFlag::ForTasks, false);
        assert!(catalog.get("review").unwrap().enabled);

        assert!(!catalog.set_flag("ghost", TypeFlag::Enabled, true));
    }

    #[test]
    fn list_eligible_filters_and_keeps_order() {
        let mut catalog = Catalog::default();
        catalog.set_flag("meeting", TypeFlag::ForTasks, false);
        catalog.set_flag("personal", TypeFlag::ForEvents, false);

        let tasks: Vec<&str> = catalog.list_eligible(true).map(|t| t.id.as_str()).collect();
        assert_eq!(tasks.len(), 9);
        assert!(!tasks.contains(&"meeting"));
        assert_eq!(tasks[0], "operational");
        assert_eq!(tasks[1], "planning");

        let events: Vec<&str> = catalog.list_eligible(false).map(|t| t.id.as_str()).collect();
        assert_eq!(events.len(), 9);
        assert_eq!(events.last(), Some(&"training"));
    }

    #[test]
    fn rename_trims_and_allows_empty() {
        let mut catalog = Catalog::default();
        catalog.rename("meeting", "  Sync  ");
        assert_eq!(catalog.get("meeting").unwrap().name, "Sync");
        catalog.rename("meeting", "   ");
        assert_eq!(catalog.get("meeting").unwrap().name, "");

        catalog.rename(DEFAULT_TASK_TYPE, "Ops");
        assert_eq!(catalog.resolve(Some("unknown")).name, "Ops");
    }

    #[test]
    fn persists_as_one_document() {
        let store = MemoryStore::new();
        let mut catalog = Catalog::load(&store).unwrap();
        catalog.rename("support", "Helpdesk");
        catalog.save(&store).unwrap();

        let reloaded = Catalog::load(&store).unwrap();
        assert_eq!(reloaded, catalog);

        let raw = store.read(TASK_TYPES_KEY).unwrap().unwrap();
        assert!(raw.contains("\"forTasks\":true"));
    }

    #[test]
    fn malformed_catalog_keeps_defaults() {
        let store = MemoryStore::new();
        store.write(TASK_TYPES_KEY, "not json").unwrap();
        assert_eq!(Catalog::load(&store).unwrap(), Catalog::default());
    }

    #[test]
    fn parses_flag_names() {
        assert_eq!("forTasks".parse::<TypeFlag>(), Ok(TypeFlag::ForTasks));
        assert_eq!("events".parse::<TypeFlag>(), Ok(TypeFlag::ForEvents));
        assert!("visible".parse::<TypeFlag>().is_err());
    }
}
