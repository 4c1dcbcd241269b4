#![forbid(unsafe_code)]

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::Context as _;
use tracing_subscriber::EnvFilter;

/// Environment variable that overrides `log.level`.
pub const LOG_ENV: &str = "WEEKBOARD_LOG";

/// Log file used while the terminal UI owns the screen.
pub const LOG_FILE: &str = "weekboard.log";

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Installs the global subscriber on stderr. `WEEKBOARD_LOG`, then
/// `RUST_LOG`, then `default_level` decide the filter. Calling it twice is
/// harmless.
pub fn init(default_level: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_level))
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}

/// Like [`init`], but appends to `path` so records never land on the
/// alternate screen.
pub fn init_to_file(default_level: &str, path: &Path) -> anyhow::Result<()> {
    let subscriber = file_subscriber(env_filter(default_level), path)?;
    let _ = tracing::subscriber::set_global_default(subscriber);
    Ok(())
}

fn file_subscriber(
    filter: EnvFilter,
    path: &Path,
) -> anyhow::Result<impl tracing::Subscriber + Send + Sync + 'static> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    Ok(tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .compact()
        .finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_subscriber_appends_records() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("logs").join(LOG_FILE);

        let subscriber = file_subscriber(EnvFilter::new("warn"), &path).unwrap();
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("filtered out");
            tracing::warn!(key = "kanbanBoard", "malformed document");
        });

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("malformed document"));
        assert!(!text.contains("filtered out"));
        assert!(!text.contains('\u{1b}'));
    }
}
