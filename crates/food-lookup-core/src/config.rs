//! Configuration loading and discovery.
//!
//! Settings are merged with figment from, lowest precedence first:
//!
//! 1. built-in defaults,
//! 2. the user config `~/.config/food-lookup/config.<ext>`,
//! 3. `.food-lookup.<ext>` then `food-lookup.<ext>` in the closest directory
//!    (walking up from the search root, stopping at a `.git` boundary),
//! 4. files added with [`ConfigLoader::with_file`],
//! 5. `AIP_DATA_FOLDER` (alias for `data_dir`),
//! 6. `FOOD_LOOKUP_*` environment variables.
//!
//! `<ext>` is one of `toml`, `yaml`, `yml`, `json`. Several files in the same
//! directory are all merged, later extensions overriding earlier ones.
//!
//! # Example
//! ```no_run
//! use camino::Utf8PathBuf;
//! use food_lookup_core::config::ConfigLoader;
//!
//! let cwd = Utf8PathBuf::from(".");
//! let (config, sources) = ConfigLoader::new()
//!     .with_project_search(&cwd)
//!     .load()
//!     .unwrap();
//! println!("serving {} from {:?}", config.data_dir().as_str(), sources.primary_file());
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::resolver::DEFAULT_PHONETIC_THRESHOLD;
use crate::suggest::DEFAULT_SUGGESTION_LIMIT;

/// Address the HTTP server listens on when none is configured.
pub const DEFAULT_BIND: &str = "0.0.0.0:8080";

/// Legacy variable naming the data directory.
pub const DATA_DIR_ENV_ALIAS: &str = "AIP_DATA_FOLDER";

/// Service configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Log level (debug, info, warn, error).
    pub log_level: LogLevel,
    /// Directory for JSONL log files.
    pub log_dir: Option<Utf8PathBuf>,
    /// Root of the catalog tree and home of the suggestion logs.
    pub data_dir: Option<Utf8PathBuf>,
    /// Listen address for `serve`.
    pub bind: Option<String>,
    /// Maximum suggestions recorded per classification.
    pub suggestion_limit: Option<usize>,
    /// Exclusive primary-key distance for phonetic matches.
    pub phonetic_threshold: Option<u16>,
    /// Treat the reserved diagnostic query as an ordinary one.
    pub disable_diagnostic_query: bool,
    /// Bearer token required by the HTTP `/search` and `/suggest` routes.
    ///
    /// Unset means the routes are open.
    pub access_token: Option<String>,
}

impl Config {
    /// Configured data directory, or the working directory.
    pub fn data_dir(&self) -> &Utf8Path {
        self.data_dir
            .as_deref()
            .unwrap_or_else(|| Utf8Path::new("."))
    }

    /// Configured listen address, or [`DEFAULT_BIND`].
    pub fn bind(&self) -> &str {
        self.bind.as_deref().unwrap_or(DEFAULT_BIND)
    }

    /// Configured suggestion cap, or [`DEFAULT_SUGGESTION_LIMIT`].
    pub fn suggestion_limit(&self) -> usize {
        self.suggestion_limit.unwrap_or(DEFAULT_SUGGESTION_LIMIT)
    }

    /// Configured phonetic threshold, or [`DEFAULT_PHONETIC_THRESHOLD`].
    pub fn phonetic_threshold(&self) -> u16 {
        self.phonetic_threshold
            .unwrap_or(DEFAULT_PHONETIC_THRESHOLD)
    }

    /// Access token, ignoring an empty string.
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref().filter(|t| !t.is_empty())
    }
}

/// Log level configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Verbose output for debugging and development.
    Debug,
    /// Standard operational information (default).
    #[default]
    Info,
    /// Warnings about potential issues.
    Warn,
    /// Errors that indicate failures.
    Error,
}

impl LogLevel {
    /// Returns the log level as a lowercase string slice.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Which configuration files were merged.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigSources {
    /// Project files from the closest directory, low to high precedence.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub project_files: Vec<Utf8PathBuf>,
    /// User config file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_file: Option<Utf8PathBuf>,
    /// Files passed explicitly, e.g. with `--config`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub explicit_files: Vec<Utf8PathBuf>,
}

impl ConfigSources {
    /// The highest-precedence file that was loaded.
    pub fn primary_file(&self) -> Option<&Utf8Path> {
        self.explicit_files
            .last()
            .map(Utf8PathBuf::as_path)
            .or_else(|| self.project_files.last().map(Utf8PathBuf::as_path))
            .or(self.user_file.as_deref())
    }
}

const CONFIG_EXTENSIONS: &[&str] = &["toml", "yaml", "yml", "json"];

const APP_NAME: &str = "food-lookup";

const ENV_PREFIX: &str = "FOOD_LOOKUP_";

/// Builder for loading configuration from multiple sources.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    project_search_root: Option<Utf8PathBuf>,
    include_user_config: bool,
    boundary_marker: Option<String>,
    explicit_files: Vec<Utf8PathBuf>,
}

impl ConfigLoader {
    /// Create a loader that reads the user config and stops at `.git`.
    pub fn new() -> Self {
        Self {
            project_search_root: None,
            include_user_config: true,
            boundary_marker: Some(".git".to_string()),
            explicit_files: Vec::new(),
        }
    }

    /// Walk up from `path` looking for project config files.
    pub fn with_project_search<P: AsRef<Utf8Path>>(mut self, path: P) -> Self {
        self.project_search_root = Some(path.as_ref().to_path_buf());
        self
    }

    /// Whether to read `~/.config/food-lookup/config.<ext>`.
    pub const fn with_user_config(mut self, include: bool) -> Self {
        self.include_user_config = include;
        self
    }

    /// Stop the upward search at a directory containing `marker`.
    pub fn with_boundary_marker<S: Into<String>>(mut self, marker: S) -> Self {
        self.boundary_marker = Some(marker.into());
        self
    }

    /// Search all the way to the filesystem root.
    pub fn without_boundary_marker(mut self) -> Self {
        self.boundary_marker = None;
        self
    }

    /// Add an explicit config file. Later files take precedence.
    pub fn with_file<P: AsRef<Utf8Path>>(mut self, path: P) -> Self {
        self.explicit_files.push(path.as_ref().to_path_buf());
        self
    }

    /// Merge every source and extract the [`Config`].
    #[tracing::instrument(skip(self), fields(search_root = ?self.project_search_root))]
    pub fn load(self) -> ConfigResult<(Config, ConfigSources)> {
        tracing::debug!("loading configuration");
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        let mut sources = ConfigSources::default();

        if self.include_user_config
            && let Some(user_config) = find_user_config()
        {
            figment = merge_file(figment, &user_config);
            sources.user_file = Some(user_config);
        }

        if let Some(ref root) = self.project_search_root {
            let project_configs = self.find_project_configs(root);
            for pc in &project_configs {
                figment = merge_file(figment, pc);
            }
            sources.project_files = project_configs;
        }

        for file in &self.explicit_files {
            figment = merge_file(figment, file);
        }
        sources.explicit_files = self.explicit_files;

        figment = figment
            .merge(
                Env::raw()
                    .only(&[DATA_DIR_ENV_ALIAS])
                    .map(|_| "data_dir".into()),
            )
            .merge(Env::prefixed(ENV_PREFIX).lowercase(true));

        let config: Config = figment
            .extract()
            .map_err(|e| ConfigError::Deserialize(Box::new(e)))?;
        tracing::info!(
            log_level = config.log_level.as_str(),
            data_dir = %config.data_dir(),
            "configuration loaded"
        );
        Ok((config, sources))
    }

    /// Config files from the closest directory that has any, dotfiles first.
    fn find_project_configs(&self, start: &Utf8Path) -> Vec<Utf8PathBuf> {
        let mut current = Some(start.to_path_buf());

        while let Some(dir) = current {
            let names = CONFIG_EXTENSIONS
                .iter()
                .map(|ext| format!(".{APP_NAME}.{ext}"))
                .chain(CONFIG_EXTENSIONS.iter().map(|ext| format!("{APP_NAME}.{ext}")));
            let found: Vec<Utf8PathBuf> = names
                .map(|name| dir.join(name))
                .filter(|path| path.is_file())
                .collect();
            if !found.is_empty() {
                return found;
            }

            // A config next to the marker still counts.
            if let Some(ref marker) = self.boundary_marker
                && dir.join(marker).exists()
                && dir != start
            {
                break;
            }

            current = dir.parent().map(Utf8Path::to_path_buf);
        }

        Vec::new()
    }
}

fn find_user_config() -> Option<Utf8PathBuf> {
    let dir = user_config_dir()?;
    CONFIG_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("config.{ext}")))
        .find(|path| path.is_file())
}

fn merge_file(figment: Figment, path: &Utf8Path) -> Figment {
    match path.extension() {
        Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path.as_str())),
        Some("json") => figment.merge(Json::file_exact(path.as_str())),
        _ => figment.merge(Toml::file_exact(path.as_str())),
    }
}

/// The user config directory, e.g. `~/.config/food-lookup/` on Linux.
pub fn user_config_dir() -> Option<Utf8PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", APP_NAME)?;
    Utf8PathBuf::from_path_buf(dirs.config_dir().to_path_buf()).ok()
}
