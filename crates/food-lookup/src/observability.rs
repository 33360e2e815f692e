//! Logging setup: an `EnvFilter`, a stderr layer, and an optional JSONL file.
//!
//! Stdout is never written to by the subscriber, so the MCP stdio transport
//! stays clean.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Explicit log file path.
pub const LOG_PATH_ENV: &str = "FOOD_LOOKUP_LOG_PATH";

/// Directory for `food-lookup.jsonl`.
pub const LOG_DIR_ENV: &str = "FOOD_LOOKUP_LOG_DIR";

const LOG_FILE_NAME: &str = "food-lookup.jsonl";

/// Where, if anywhere, to write the JSONL log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservabilityConfig {
    /// Full path of the JSONL log file. `None` disables the file layer.
    pub log_file: Option<PathBuf>,
}

impl ObservabilityConfig {
    /// Resolve the log file from the environment, then `config_log_dir`.
    ///
    /// `FOOD_LOOKUP_LOG_PATH` beats `FOOD_LOOKUP_LOG_DIR`, which beats the
    /// configured directory.
    pub fn from_env_with_overrides(config_log_dir: Option<PathBuf>) -> Self {
        Self::resolve(
            std::env::var_os(LOG_PATH_ENV).map(PathBuf::from),
            std::env::var_os(LOG_DIR_ENV).map(PathBuf::from),
            config_log_dir,
        )
    }

    fn resolve(
        log_path: Option<PathBuf>,
        log_dir: Option<PathBuf>,
        config_log_dir: Option<PathBuf>,
    ) -> Self {
        let log_file = log_path
            .filter(|p| !p.as_os_str().is_empty())
            .or_else(|| {
                log_dir
                    .or(config_log_dir)
                    .filter(|d| !d.as_os_str().is_empty())
                    .map(|d| d.join(LOG_FILE_NAME))
            });
        Self { log_file }
    }
}

/// Build the filter: `RUST_LOG` wins, then `-q`/`-v`, then the configured level.
pub fn env_filter(quiet: bool, verbose: u8, config_level: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    EnvFilter::new(default_directive(quiet, verbose, config_level))
}

fn default_directive(quiet: bool, verbose: u8, config_level: &str) -> &str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => config_level,
        1 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber.
///
/// Keep the returned guard alive until exit so buffered file output is flushed.
pub fn init_observability(
    config: &ObservabilityConfig,
    filter: EnvFilter,
) -> anyhow::Result<Option<WorkerGuard>> {
    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    let (file_layer, guard) = match config.log_file.as_deref() {
        Some(path) => {
            let (writer, guard) = file_writer(path)?;
            let layer = fmt::layer().json().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("a global tracing subscriber is already installed")?;
    Ok(guard)
}

fn file_writer(
    path: &Path,
) -> anyhow::Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    let dir = path
        .parent()
        .filter(|d| !d.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .with_context(|| format!("log path has no file name: {}", path.display()))?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create log directory {}", dir.display()))?;
    let appender = tracing_appender::rolling::never(dir, file_name);
    Ok(tracing_appender::non_blocking(appender))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_wins() {
        let config = ObservabilityConfig::resolve(
            Some(PathBuf::from("/tmp/x.jsonl")),
            Some(PathBuf::from("/var/log")),
            Some(PathBuf::from("/etc")),
        );
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/x.jsonl")));
    }

    #[test]
    fn env_dir_beats_config_dir() {
        let config = ObservabilityConfig::resolve(
            None,
            Some(PathBuf::from("/var/log")),
            Some(PathBuf::from("/etc")),
        );
        assert_eq!(config.log_file, Some(PathBuf::from("/var/log").join(LOG_FILE_NAME)));
    }

    #[test]
    fn nothing_configured_disables_file() {
        assert_eq!(ObservabilityConfig::resolve(None, None, None).log_file, None);
        assert_eq!(
            ObservabilityConfig::resolve(Some(PathBuf::new()), None, None).log_file,
            None
        );
    }

    #[test]
    fn flags_pick_default_directive() {
        assert_eq!(default_directive(true, 3, "info"), "error");
        assert_eq!(default_directive(false, 0, "warn"), "warn");
        assert_eq!(default_directive(false, 1, "warn"), "debug");
        assert_eq!(default_directive(false, 2, "warn"), "trace");
    }
}
