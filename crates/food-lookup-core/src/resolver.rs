//! Query resolution: prefix match with a phonetic fallback.
//!
//! For each classification independently, entries whose token starts with
//! the lower-cased query win. Only when a classification has no prefix hit
//! do entries whose primary phonetic key lies within the threshold of the
//! query's key take its place.
//!
//! The alternate phonetic key is stored on every entry but does not take
//! part in the comparison.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, Classification};
use crate::phonetic::PhoneticKeys;

/// Default maximum (exclusive) primary-key distance for a phonetic match.
pub const DEFAULT_PHONETIC_THRESHOLD: u16 = 10;

/// Reserved query that returns [`diagnostic_response`] instead of matching.
pub const DIAGNOSTIC_QUERY: &str = "longlistjoe";

/// Wire shape of a lookup result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MatchResponse {
    /// Display names of allowed candidates.
    pub possible_allowed: Vec<String>,
    /// Display names of disallowed candidates.
    pub possible_disallowed: Vec<String>,
}

/// Which path produced a candidate list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MatchSource {
    /// Tokens starting with the query.
    Prefix,
    /// Tokens whose primary phonetic key is close to the query's.
    Phonetic,
    /// Nothing matched.
    None,
}

/// Candidates for one classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Candidates {
    /// Display names in token order. Not deduplicated.
    pub names: Vec<String>,
    /// Path that produced `names`.
    pub source: MatchSource,
}

impl Candidates {
    fn pick(prefix: Vec<String>, phonetic: Vec<String>) -> Self {
        if !prefix.is_empty() {
            Self {
                names: prefix,
                source: MatchSource::Prefix,
            }
        } else if !phonetic.is_empty() {
            Self {
                names: phonetic,
                source: MatchSource::Phonetic,
            }
        } else {
            Self {
                names: Vec::new(),
                source: MatchSource::None,
            }
        }
    }
}

/// Full resolution of a query, including how each list was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Resolution {
    /// The query after normalization.
    pub query: String,
    /// Primary phonetic key of the normalized query.
    pub query_key: u16,
    /// Allowed candidates.
    pub allowed: Candidates,
    /// Disallowed candidates.
    pub disallowed: Candidates,
}

impl From<Resolution> for MatchResponse {
    fn from(resolution: Resolution) -> Self {
        Self {
            possible_allowed: resolution.allowed.names,
            possible_disallowed: resolution.disallowed.names,
        }
    }
}

#[derive(Default)]
struct Buckets {
    prefix: Vec<String>,
    phonetic: Vec<String>,
}

/// Resolves queries against a shared catalog.
#[derive(Debug, Clone)]
pub struct Resolver {
    catalog: Arc<Catalog>,
    threshold: u16,
    diagnostic_query: bool,
}

impl Resolver {
    /// Create a resolver with the default threshold and the diagnostic query enabled.
    pub const fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            threshold: DEFAULT_PHONETIC_THRESHOLD,
            diagnostic_query: true,
        }
    }

    /// Override the phonetic distance threshold.
    #[must_use]
    pub const fn with_threshold(mut self, threshold: u16) -> Self {
        self.threshold = threshold;
        self
    }

    /// Enable or disable the [`DIAGNOSTIC_QUERY`] fixture.
    #[must_use]
    pub const fn with_diagnostic_query(mut self, enabled: bool) -> Self {
        self.diagnostic_query = enabled;
        self
    }

    /// The catalog being searched.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The phonetic distance threshold.
    pub const fn threshold(&self) -> u16 {
        self.threshold
    }

    /// Resolve `query` into allowed and disallowed candidates.
    ///
    /// The reserved [`DIAGNOSTIC_QUERY`] short-circuits to a fixed payload
    /// when enabled.
    pub fn resolve(&self, query: &str) -> MatchResponse {
        if self.diagnostic_query && query == DIAGNOSTIC_QUERY {
            tracing::debug!("serving diagnostic fixture");
            return diagnostic_response();
        }
        self.resolve_detailed(query).into()
    }

    /// Run the matching algorithm and report which path produced each list.
    ///
    /// An empty query is a prefix of every token, so it returns the whole
    /// catalog split by classification.
    #[tracing::instrument(skip(self, query), fields(query_len = query.len()))]
    pub fn resolve_detailed(&self, query: &str) -> Resolution {
        let query = query.to_lowercase();
        let query_keys = PhoneticKeys::encode(&query);

        let mut allowed = Buckets::default();
        let mut disallowed = Buckets::default();

        for entry in self.catalog.iter() {
            let buckets = match entry.classification {
                Classification::Allowed => &mut allowed,
                Classification::NotAllowed => &mut disallowed,
            };
            if entry.token.starts_with(&query) {
                buckets.prefix.push(entry.display_name.clone());
            } else if query_keys.primary_distance(&entry.keys) < self.threshold {
                buckets.phonetic.push(entry.display_name.clone());
            }
        }

        let resolution = Resolution {
            query_key: query_keys.primary,
            query,
            allowed: Candidates::pick(allowed.prefix, allowed.phonetic),
            disallowed: Candidates::pick(disallowed.prefix, disallowed.phonetic),
        };
        tracing::debug!(
            allowed = resolution.allowed.names.len(),
            allowed_source = ?resolution.allowed.source,
            disallowed = resolution.disallowed.names.len(),
            disallowed_source = ?resolution.disallowed.source,
            "query resolved"
        );
        resolution
    }
}

/// Fixed payload answered for [`DIAGNOSTIC_QUERY`].
pub fn diagnostic_response() -> MatchResponse {
    const ORDINALS: [&str; 10] = [
        "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    ];
    MatchResponse {
        possible_allowed: ORDINALS.iter().map(|n| format!("a {n}")).collect(),
        possible_disallowed: ORDINALS.iter().map(|n| format!("d {n}")).collect(),
    }
}
