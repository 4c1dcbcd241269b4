#![forbid(unsafe_code)]

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WeekboardError {
    #[error("invalid storage key '{key}': {msg}")]
    InvalidKey { key: String, msg: String },

    #[error("the board has no columns; add one with 'weekboard column add <title>'")]
    NoColumns,

    #[error("config error: {0}")]
    Config(String),

    #[error("invalid config key '{0}'")]
    InvalidConfigKey(String),

    #[error("invalid config value for '{key}': {msg}")]
    InvalidConfigValue { key: String, msg: String },

    #[error("column not found matching: {0}")]
    ColumnNotFound(String),

    #[error("task not found matching: {0}")]
    TaskNotFound(String),

    #[error("multiple tasks match: {0}")]
    AmbiguousTask(String),

    #[error("comment not found: {0}")]
    CommentNotFound(String),

    #[error("invalid task: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("{0}")]
    Other(String),
}
