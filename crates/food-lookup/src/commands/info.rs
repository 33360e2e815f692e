//! Info command: package metadata and the effective configuration.

use clap::Args;
use food_lookup_core::config::{Config, ConfigSources};
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument};

/// Arguments for the `info` subcommand.
#[derive(Args, Debug, Default)]
pub struct InfoArgs {
    // No subcommand-specific arguments; uses global --json flag
}

#[derive(Serialize)]
struct PackageInfo {
    name: &'static str,
    version: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    description: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    license: &'static str,
}

impl PackageInfo {
    const fn new() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            description: env!("CARGO_PKG_DESCRIPTION"),
            license: env!("CARGO_PKG_LICENSE"),
        }
    }
}

#[derive(Serialize)]
struct ConfigInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    config_file: Option<String>,
    log_level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    log_dir: Option<String>,
    data_dir: String,
    bind: String,
    suggestion_limit: usize,
    phonetic_threshold: u16,
    diagnostic_query: bool,
    access_token: bool,
}

impl ConfigInfo {
    fn from_config(config: &Config, sources: &ConfigSources) -> Self {
        Self {
            config_file: sources.primary_file().map(|p| p.to_string()),
            log_level: config.log_level.as_str().to_string(),
            log_dir: config.log_dir.as_ref().map(|p| p.to_string()),
            data_dir: config.data_dir().to_string(),
            bind: config.bind().to_string(),
            suggestion_limit: config.suggestion_limit(),
            phonetic_threshold: config.phonetic_threshold(),
            diagnostic_query: !config.disable_diagnostic_query,
            access_token: config.access_token().is_some(),
        }
    }
}

#[derive(Serialize)]
struct FullInfo {
    #[serde(flatten)]
    package: PackageInfo,
    config: ConfigInfo,
}

/// Print package information and the effective configuration.
#[instrument(name = "cmd_info", skip_all, fields(json_output))]
pub fn cmd_info(
    _args: InfoArgs,
    global_json: bool,
    config: &Config,
    sources: &ConfigSources,
) -> anyhow::Result<()> {
    let info = PackageInfo::new();

    debug!(json_output = global_json, "executing info command");

    let config_info = ConfigInfo::from_config(config, sources);
    let full_info = FullInfo {
        package: info,
        config: config_info,
    };

    if global_json {
        println!("{}", serde_json::to_string_pretty(&full_info)?);
    } else {
        println!(
            "{} {}",
            full_info.package.name.bold(),
            full_info.package.version.green()
        );
        if !full_info.package.description.is_empty() {
            println!("{}", full_info.package.description);
        }
        if !full_info.package.license.is_empty() {
            println!("{}: {}", "License".dimmed(), full_info.package.license);
        }

        println!();
        println!("{}", "Configuration".bold().underline());
        if let Some(ref path) = full_info.config.config_file {
            println!("{}: {}", "Config file".dimmed(), path.cyan());
        } else {
            println!("{}: {}", "Config file".dimmed(), "none loaded".yellow());
        }
        println!("{}: {}", "Log level".dimmed(), full_info.config.log_level);
        if let Some(ref dir) = full_info.config.log_dir {
            println!("{}: {}", "Log directory".dimmed(), dir);
        }
        println!("{}: {}", "Data directory".dimmed(), full_info.config.data_dir);

        println!();
        println!("{}", "Service".bold().underline());
        println!("{}: {}", "Bind".dimmed(), full_info.config.bind);
        println!(
            "{}: {}",
            "Suggestion limit".dimmed(),
            full_info.config.suggestion_limit
        );
        println!(
            "{}: {}",
            "Phonetic threshold".dimmed(),
            full_info.config.phonetic_threshold
        );
        println!(
            "{}: {}",
            "Diagnostic query".dimmed(),
            on_off(full_info.config.diagnostic_query)
        );
        println!(
            "{}: {}",
            "Access token".dimmed(),
            if full_info.config.access_token {
                "required".yellow().to_string()
            } else {
                "none".to_string()
            }
        );
    }

    Ok(())
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "enabled" } else { "disabled" }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config::default()
    }

    fn test_sources() -> ConfigSources {
        ConfigSources::default()
    }

    #[test]
    fn test_cmd_info_text_succeeds() {
        assert!(cmd_info(InfoArgs::default(), false, &test_config(), &test_sources()).is_ok());
    }

    #[test]
    fn test_cmd_info_json_via_global() {
        assert!(cmd_info(InfoArgs::default(), true, &test_config(), &test_sources()).is_ok());
    }

    #[test]
    fn test_config_info_no_file() {
        let config = Config::default();
        let sources = ConfigSources::default();
        let info = ConfigInfo::from_config(&config, &sources);
        assert!(info.config_file.is_none());
        assert_eq!(info.log_level, "info");
        assert_eq!(info.bind, "0.0.0.0:8080");
        assert!(info.diagnostic_query);
        assert!(!info.access_token);
    }

    #[test]
    fn test_config_info_reflects_overrides() {
        let config = Config {
            data_dir: Some("/srv/foods".into()),
            suggestion_limit: Some(7),
            disable_diagnostic_query: true,
            access_token: Some("t".to_string()),
            ..Config::default()
        };
        let info = ConfigInfo::from_config(&config, &ConfigSources::default());
        assert_eq!(info.data_dir, "/srv/foods");
        assert_eq!(info.suggestion_limit, 7);
        assert!(!info.diagnostic_query);
        assert!(info.access_token);
    }
}
