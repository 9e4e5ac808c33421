//! Log file setup.
//!
//! The TUI owns the terminal, so events go to a file instead of stderr.
//! Logging starts before settings are read; once they are, the configured
//! directive replaces the startup one unless `PRIDE_LOG` chose the filter.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use thiserror::Error;
use tracing::Subscriber;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, reload, Layer, Registry};

/// Environment variable holding a filter directive, e.g. `debug` or
/// `pride_core::core::shell=trace`.
pub const LOG_ENV: &str = "PRIDE_LOG";

const DEFAULT_DIRECTIVE: &str = "info";

#[derive(Debug, Error)]
pub enum InitError {
    #[error("cannot open log file: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    AlreadySet(#[from] TryInitError),
}

/// Handle on the installed filter.
pub struct LogHandle {
    filter: reload::Handle<EnvFilter, Registry>,
    from_env: bool,
}

impl LogHandle {
    /// Whether `PRIDE_LOG` picked the filter.
    pub fn from_env(&self) -> bool {
        self.from_env
    }

    /// Switch to the directive from the settings file, unless `PRIDE_LOG`
    /// already chose one.
    pub fn apply_configured(&self, directive: &str) {
        if self.from_env {
            return;
        }
        if let Err(e) = self.filter.reload(configured_filter(directive)) {
            tracing::warn!("cannot apply log level {directive:?}: {e}");
        }
    }
}

/// Parse a directive from the settings file, falling back to `info` when it
/// is empty or malformed.
pub fn configured_filter(directive: &str) -> EnvFilter {
    parse_directive(directive).unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVE))
}

fn parse_directive(directive: &str) -> Option<EnvFilter> {
    let directive = directive.trim();
    if directive.is_empty() {
        return None;
    }
    EnvFilter::try_new(directive).ok()
}

fn file_layer<S>(file: File) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer().with_writer(Mutex::new(file)).with_ansi(false)
}

/// Install the global subscriber, appending to `path`.
pub fn init(path: &Path) -> Result<LogHandle, InitError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let env_filter = std::env::var(LOG_ENV)
        .ok()
        .and_then(|v| parse_directive(&v));
    let from_env = env_filter.is_some();
    let (filter, handle) =
        reload::Layer::new(env_filter.unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVE)));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer(file))
        .try_init()?;
    Ok(LogHandle {
        filter: handle,
        from_env,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn test_configured_filter() {
        assert_eq!(configured_filter("debug").max_level_hint(), Some(LevelFilter::DEBUG));
        assert_eq!(configured_filter(" WARN ").max_level_hint(), Some(LevelFilter::WARN));
        assert_eq!(
            configured_filter("warn,pride_core::core::shell=trace").max_level_hint(),
            Some(LevelFilter::TRACE)
        );
        assert_eq!(configured_filter("").max_level_hint(), Some(LevelFilter::INFO));
        assert_eq!(
            configured_filter("pride=notalevel").max_level_hint(),
            Some(LevelFilter::INFO)
        );
        assert_eq!(configured_filter("off").max_level_hint(), Some(LevelFilter::OFF));
    }

    // The only test that installs the global subscriber.
    #[test]
    fn test_init_logs_before_settings_then_applies_them() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("pride.log");
        let handle = init(&path).unwrap();
        if handle.from_env() {
            return;
        }

        tracing::warn!("settings marker: bad settings file");
        handle.apply_configured("error");
        tracing::warn!("settings marker: filtered out");
        tracing::error!("settings marker: still shown");

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("settings marker: bad settings file"));
        assert!(!text.contains("settings marker: filtered out"));
        assert!(text.contains("settings marker: still shown"));
    }

    #[test]
    fn test_file_layer_writes_events() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pride.log");
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .unwrap();
        let subscriber = tracing_subscriber::registry()
            .with(configured_filter("info"))
            .with(file_layer(file));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(target: "pride_core::core::shell", "opened {}", "a.py");
            tracing::debug!("hidden");
        });

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.contains("INFO"));
        assert!(text.contains("pride_core::core::shell: opened a.py"));
        assert!(!text.contains('\x1b'));
    }
}
