//! Logging configuration.
//!
//! Standard output carries the rendered tree, so log records go to standard
//! error by default, optionally also to journald or a file.
use std::{fs::OpenOptions, path::PathBuf};

use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use tracing_subscriber::{
    Layer, layer::SubscriberExt, registry::LookupSpan, util::SubscriberInitExt,
};

#[serde_as]
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogConfig {
    /// Also append log records to this file.
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    #[serde(default = "LogConfig::default_emit_journald")]
    pub emit_journald: bool,

    #[serde(default = "LogConfig::default_emit_stderr")]
    pub emit_stderr: bool,

    /// Records below this level are dropped.
    #[serde(default = "LogConfig::default_log_level")]
    #[serde_as(as = "DisplayFromStr")]
    pub level: tracing::Level,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file_path: None,
            emit_journald: Self::default_emit_journald(),
            emit_stderr: Self::default_emit_stderr(),
            level: Self::default_log_level(),
        }
    }
}

impl LogConfig {
    /// Warnings are shown by default since degraded lookups are logged at
    /// that level.
    #[inline]
    #[must_use]
    pub const fn default_log_level() -> tracing::Level { tracing::Level::WARN }

    #[inline]
    #[must_use]
    pub const fn default_emit_journald() -> bool { false }

    #[inline]
    #[must_use]
    pub const fn default_emit_stderr() -> bool { true }

    /// Installs the global `tracing` subscriber.
    ///
    /// # Panics
    ///
    /// Panics if a global subscriber has already been installed.
    pub fn registry(&self) {
        let Self { file_path, emit_journald, emit_stderr, level } = self;

        tracing_subscriber::registry()
            .with(tracing_subscriber::filter::LevelFilter::from_level(*level))
            .with(emit_stderr.then(|| LogDriver::Stderr.layer()).flatten())
            .with(emit_journald.then(|| LogDriver::Journald.layer()).flatten())
            .with(file_path.clone().and_then(|path| LogDriver::File(path).layer()))
            .init();
    }
}

#[derive(Clone, Debug)]
enum LogDriver {
    Stderr,
    Journald,
    File(PathBuf),
}

impl LogDriver {
    /// Returns `None` when the driver's sink is unavailable, e.g. the log file
    /// cannot be opened or journald is not running.
    #[allow(clippy::type_repetition_in_bounds)]
    fn layer<S>(self) -> Option<Box<dyn Layer<S> + Send + Sync + 'static>>
    where
        S: tracing::Subscriber,
        for<'a> S: LookupSpan<'a>,
    {
        let fmt = tracing_subscriber::fmt::layer().compact().with_target(false);

        match self {
            Self::Stderr => Some(Box::new(fmt.with_writer(std::io::stderr))),
            Self::File(path) => {
                let file = OpenOptions::new().create(true).append(true).open(path).ok()?;
                Some(Box::new(fmt.with_ansi(false).with_writer(file)))
            }
            Self::Journald => Some(Box::new(tracing_journald::layer().ok()?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_keep_stdout_free() {
        let config = LogConfig::default();

        assert_eq!(config.level, tracing::Level::WARN);
        assert!(config.emit_stderr);
        assert!(!config.emit_journald);
        assert!(config.file_path.is_none());
    }

    #[test]
    fn test_deserialize_partial() {
        let config: LogConfig =
            serde_yaml::from_str("level: debug\nfilePath: /tmp/deploytree.log\n").unwrap();

        assert_eq!(config.level, tracing::Level::DEBUG);
        assert_eq!(config.file_path, Some(PathBuf::from("/tmp/deploytree.log")));
        assert!(config.emit_stderr);
    }
}
