//! One-call assembly of the lookup service from a [`Config`].

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;

use crate::catalog::{Catalog, Classification};
use crate::config::Config;
use crate::error::SuggestResult;
use crate::loader::{LoadReport, load_data_dir};
use crate::resolver::{MatchResponse, Resolver};
use crate::suggest::{SubmitOutcome, SuggestionSink};

/// A loaded catalog with its resolver and suggestion sink.
///
/// Both halves share the same `Arc<Catalog>`. Clone the `Arc`s to hand
/// them to request handlers.
#[derive(Debug, Clone)]
pub struct Engine {
    data_dir: Utf8PathBuf,
    resolver: Arc<Resolver>,
    sink: Arc<SuggestionSink>,
    report: LoadReport,
}

/// Per-classification suggestion counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SuggestionCounts {
    /// Suggestions recorded as allowed.
    pub allowed: usize,
    /// Suggestions recorded as not allowed.
    pub not_allowed: usize,
}

impl Engine {
    /// Load `data_dir` and apply the tuning knobs from `config`.
    ///
    /// `config.data_dir` is ignored so callers can override it.
    #[tracing::instrument(skip(config))]
    pub fn open(data_dir: &Utf8Path, config: &Config) -> Self {
        let loaded = load_data_dir(data_dir);
        let catalog = Arc::new(loaded.catalog);

        let resolver = Resolver::new(Arc::clone(&catalog))
            .with_threshold(config.phonetic_threshold())
            .with_diagnostic_query(!config.disable_diagnostic_query);
        let sink = SuggestionSink::new(data_dir, catalog, loaded.suggestions)
            .with_limit(config.suggestion_limit());

        Self {
            data_dir: data_dir.to_path_buf(),
            resolver: Arc::new(resolver),
            sink: Arc::new(sink),
            report: loaded.report,
        }
    }

    /// Open using the data directory named in `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::open(config.data_dir(), config)
    }

    /// Data directory the engine was loaded from.
    pub fn data_dir(&self) -> &Utf8Path {
        &self.data_dir
    }

    /// The shared resolver.
    pub const fn resolver(&self) -> &Arc<Resolver> {
        &self.resolver
    }

    /// The shared suggestion sink.
    pub const fn sink(&self) -> &Arc<SuggestionSink> {
        &self.sink
    }

    /// The catalog both halves search.
    pub fn catalog(&self) -> &Catalog {
        self.resolver.catalog()
    }

    /// Counters from the initial load.
    pub const fn report(&self) -> &LoadReport {
        &self.report
    }

    /// Resolve a query.
    pub fn lookup(&self, query: &str) -> MatchResponse {
        self.resolver.resolve(query)
    }

    /// Submit a suggestion.
    pub fn suggest(&self, text: &str, classification: Classification) -> SuggestResult<SubmitOutcome> {
        self.sink.submit(text, classification)
    }

    /// Current suggestion counts, including those recorded since load.
    pub fn suggestion_counts(&self) -> SuggestionCounts {
        SuggestionCounts {
            allowed: self.sink.count(Classification::Allowed),
            not_allowed: self.sink.count(Classification::NotAllowed),
        }
    }
}
