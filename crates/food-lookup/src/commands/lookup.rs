//! Lookup command: resolve a query against the catalog.

use clap::Args;
use food_lookup_core::{Candidates, Classification, Engine, MatchSource};
use owo_colors::OwoColorize;
use tracing::{debug, instrument};

/// Arguments for the `lookup` subcommand.
#[derive(Args, Debug)]
pub struct LookupArgs {
    /// Food name to look up (case-insensitive, misspellings tolerated).
    pub query: String,

    /// Only print candidates of this classification.
    #[arg(long, value_enum)]
    pub only: Option<Classification>,

    /// Show how each list was produced (prefix or phonetic match).
    #[arg(long)]
    pub explain: bool,
}

impl LookupArgs {
    fn wants(&self, classification: Classification) -> bool {
        self.only.is_none_or(|only| only == classification)
    }
}

/// Resolve `args.query` and print the candidates.
#[instrument(name = "cmd_lookup", skip_all, fields(query_len = args.query.len()))]
pub fn cmd_lookup(args: LookupArgs, global_json: bool, engine: &Engine) -> anyhow::Result<()> {
    debug!(only = ?args.only, explain = args.explain, "executing lookup command");

    if args.explain {
        let resolution = engine.resolver().resolve_detailed(&args.query);
        if global_json {
            println!("{}", serde_json::to_string_pretty(&resolution)?);
            return Ok(());
        }
        println!(
            "{}: {:?} (key {:#06x})",
            "Query".dimmed(),
            resolution.query,
            resolution.query_key
        );
        if args.wants(Classification::Allowed) {
            print_candidates(Classification::Allowed, &resolution.allowed);
        }
        if args.wants(Classification::NotAllowed) {
            print_candidates(Classification::NotAllowed, &resolution.disallowed);
        }
        return Ok(());
    }

    let response = engine.lookup(&args.query);
    if global_json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }
    if args.wants(Classification::Allowed) {
        print_names(Classification::Allowed, &response.possible_allowed);
    }
    if args.wants(Classification::NotAllowed) {
        print_names(Classification::NotAllowed, &response.possible_disallowed);
    }
    Ok(())
}

fn heading(classification: Classification) -> String {
    match classification {
        Classification::Allowed => "Allowed".green().bold().to_string(),
        Classification::NotAllowed => "Not allowed".red().bold().to_string(),
    }
}

fn print_names(classification: Classification, names: &[String]) {
    println!("{} ({})", heading(classification), names.len());
    for name in names {
        println!("  {name}");
    }
}

fn print_candidates(classification: Classification, candidates: &Candidates) {
    let source = match candidates.source {
        MatchSource::Prefix => "prefix match".cyan().to_string(),
        MatchSource::Phonetic => "sounds like".yellow().to_string(),
        MatchSource::None => "no match".dimmed().to_string(),
    };
    println!(
        "{} ({}, {source})",
        heading(classification),
        candidates.names.len()
    );
    for name in &candidates.names {
        println!("  {name}");
    }
}
