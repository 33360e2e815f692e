//! Stats command: load the data directory and report what was found.

use clap::Args;
use food_lookup_core::{Classification, Engine, LoadReport};
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::instrument;

/// Arguments for the `stats` subcommand.
#[derive(Args, Debug, Default)]
pub struct StatsArgs {}

#[derive(Serialize)]
struct Stats<'a> {
    data_dir: &'a str,
    allowed: usize,
    not_allowed: usize,
    #[serde(flatten)]
    report: &'a LoadReport,
}

/// Print load counters for the engine's data directory.
#[instrument(name = "cmd_stats", skip_all)]
pub fn cmd_stats(_args: StatsArgs, global_json: bool, engine: &Engine) -> anyhow::Result<()> {
    let catalog = engine.catalog();
    let stats = Stats {
        data_dir: engine.data_dir().as_str(),
        allowed: catalog.count(Classification::Allowed),
        not_allowed: catalog.count(Classification::NotAllowed),
        report: engine.report(),
    };

    if global_json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    let report = stats.report;
    println!("{}: {}", "Data directory".dimmed(), stats.data_dir.cyan());
    println!(
        "{}: {} ({} allowed, {} not allowed)",
        "Entries".dimmed(),
        report.entries.bold(),
        stats.allowed,
        stats.not_allowed
    );
    println!(
        "{}: {} loaded, {} skipped, {} truncated",
        "Files".dimmed(),
        report.files_loaded,
        report.files_skipped,
        warn_if_nonzero(report.files_truncated)
    );
    println!(
        "{}: {} duplicates, {} conflicts, {} malformed",
        "Lines".dimmed(),
        report.duplicates,
        warn_if_nonzero(report.conflicts),
        warn_if_nonzero(report.malformed_lines)
    );
    println!(
        "{}: {} allowed, {} not allowed",
        "Suggestions".dimmed(),
        report.suggested_allowed,
        report.suggested_not_allowed
    );
    Ok(())
}

fn warn_if_nonzero(count: usize) -> String {
    if count == 0 {
        count.to_string()
    } else {
        count.yellow().to_string()
    }
}
