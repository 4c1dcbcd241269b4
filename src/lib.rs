#![forbid(unsafe_code)]
#![allow(clippy::missing_errors_doc)]

pub mod board;
pub mod calendar;
pub mod catalog;
pub mod cli;
pub mod comments;
pub mod config;
pub mod dragdrop;
pub mod error;
pub mod logging;
pub mod output;
pub mod store;
pub mod tui;
