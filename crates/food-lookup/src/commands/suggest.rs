//! Suggest command: propose a food that is missing from the catalog.

use anyhow::Context;
use clap::Args;
use food_lookup_core::{Classification, Engine, SubmitOutcome};
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument};

/// Arguments for the `suggest` subcommand.
#[derive(Args, Debug)]
pub struct SuggestArgs {
    /// Proposed food name (3 to 50 characters after trimming).
    pub text: String,

    /// Record the suggestion as not allowed (default: allowed).
    #[arg(long)]
    pub not_allowed: bool,
}

#[derive(Serialize)]
struct SuggestReport<'a> {
    text: &'a str,
    classification: Classification,
    outcome: SubmitOutcome,
}

/// Submit a suggestion to the data directory's log.
#[instrument(name = "cmd_suggest", skip_all, fields(not_allowed = args.not_allowed))]
pub fn cmd_suggest(args: SuggestArgs, global_json: bool, engine: &Engine) -> anyhow::Result<()> {
    let classification = Classification::from_allowed(!args.not_allowed);
    debug!(%classification, "executing suggest command");

    let outcome = engine
        .suggest(&args.text, classification)
        .with_context(|| format!("failed to suggest {:?}", args.text))?;

    if global_json {
        let report = SuggestReport {
            text: &args.text,
            classification,
            outcome,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        match outcome {
            SubmitOutcome::Recorded => println!(
                "{} {} as {classification} in {}",
                "Recorded:".green(),
                args.text.trim(),
                engine.sink().log_path(classification)
            ),
            SubmitOutcome::AlreadyKnown => {
                println!("{} {}", "Already known:".yellow(), args.text.trim());
            }
        }
    }
    Ok(())
}
