//! User suggestions for foods that are not catalogued yet.
//!
//! Accepted suggestions are appended to one log per classification in the
//! data root (`suggested_allowed.txt`, `suggested_not_allowed.txt`) and
//! remembered in memory so the same term is never written twice. The
//! catalog and both logs share one namespace: a term known to any of them
//! is accepted as a no-op.

use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::catalog::{Catalog, Classification};
use crate::error::{SuggestError, SuggestResult};

/// Shortest accepted suggestion, after normalization.
pub const MIN_SUGGESTION_LEN: usize = 3;

/// Longest accepted suggestion, after normalization.
pub const MAX_SUGGESTION_LEN: usize = 50;

/// Default cap on suggestions per classification.
pub const DEFAULT_SUGGESTION_LIMIT: usize = 10_000;

/// Normalize submitted text: drop non-ASCII characters, trim, lower-case.
pub fn normalize_suggestion(text: &str) -> String {
    let ascii: String = text.chars().filter(char::is_ascii).collect();
    ascii.trim().to_ascii_lowercase()
}

/// Result of an accepted submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// The term was new and has been written to the log.
    Recorded,
    /// The term was already catalogued or suggested. Nothing was written.
    AlreadyKnown,
}

/// Already-suggested terms, one set per classification.
#[derive(Debug, Clone, Default)]
pub struct SuggestionSets {
    allowed: HashSet<String>,
    not_allowed: HashSet<String>,
}

impl SuggestionSets {
    /// Read both suggestion logs from `dir`.
    ///
    /// Logs are trusted input: lines are trimmed and lower-cased but not
    /// validated. Missing logs are treated as empty.
    pub fn load_from_dir(dir: &Utf8Path) -> Self {
        let mut sets = Self::default();
        for classification in Classification::ALL {
            let path = dir.join(classification.suggestion_log_name());
            match read_log(&path) {
                Ok(terms) => sets.set_mut(classification).extend(terms),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => warn!(%path, error = %err, "failed to read suggestion log"),
            }
        }
        sets
    }

    /// Returns `true` if either set holds `term`.
    pub fn contains(&self, term: &str) -> bool {
        self.allowed.contains(term) || self.not_allowed.contains(term)
    }

    /// Number of terms suggested under `classification`.
    pub fn len(&self, classification: Classification) -> usize {
        self.set(classification).len()
    }

    /// Returns `true` if neither set holds anything.
    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty() && self.not_allowed.is_empty()
    }

    fn insert(&mut self, classification: Classification, term: String) -> bool {
        self.set_mut(classification).insert(term)
    }

    const fn set(&self, classification: Classification) -> &HashSet<String> {
        match classification {
            Classification::Allowed => &self.allowed,
            Classification::NotAllowed => &self.not_allowed,
        }
    }

    const fn set_mut(&mut self, classification: Classification) -> &mut HashSet<String> {
        match classification {
            Classification::Allowed => &mut self.allowed,
            Classification::NotAllowed => &mut self.not_allowed,
        }
    }
}

fn read_log(path: &Utf8Path) -> std::io::Result<Vec<String>> {
    let file = std::fs::File::open(path.as_std_path())?;
    let mut terms = Vec::new();
    for line in BufReader::new(file).lines() {
        let term = line?.trim().to_lowercase();
        if !term.is_empty() {
            terms.push(term);
        }
    }
    Ok(terms)
}

/// Validates, deduplicates and persists suggestions.
///
/// The dedup check, the log append and the in-memory insert happen under a
/// single lock, so concurrent submissions of the same new term produce one
/// log line.
#[derive(Debug)]
pub struct SuggestionSink {
    dir: Utf8PathBuf,
    catalog: Arc<Catalog>,
    limit: usize,
    sets: Mutex<SuggestionSets>,
}

impl SuggestionSink {
    /// Create a sink writing into `dir`, seeded with `sets`.
    pub fn new<P: AsRef<Utf8Path>>(dir: P, catalog: Arc<Catalog>, sets: SuggestionSets) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            catalog,
            limit: DEFAULT_SUGGESTION_LIMIT,
            sets: Mutex::new(sets),
        }
    }

    /// Override the per-classification cap.
    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// The per-classification cap.
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Path of the log for `classification`.
    pub fn log_path(&self, classification: Classification) -> Utf8PathBuf {
        self.dir.join(classification.suggestion_log_name())
    }

    /// Number of terms currently known under `classification`.
    pub fn count(&self, classification: Classification) -> usize {
        self.sets.lock().len(classification)
    }

    /// Returns `true` if `term` (already normalized) is catalogued or suggested.
    pub fn is_known(&self, term: &str) -> bool {
        self.catalog.contains(term) || self.sets.lock().contains(term)
    }

    /// Submit `text` as a suggestion for `classification`.
    #[tracing::instrument(skip(self, text, classification), fields(text_len = text.len(), %classification))]
    pub fn submit(&self, text: &str, classification: Classification) -> SuggestResult<SubmitOutcome> {
        let term = normalize_suggestion(text);
        let len = term.len();
        if len < MIN_SUGGESTION_LEN {
            return Err(SuggestError::TooShort {
                len,
                min: MIN_SUGGESTION_LEN,
            });
        }
        if len > MAX_SUGGESTION_LEN {
            return Err(SuggestError::TooLong {
                len,
                max: MAX_SUGGESTION_LEN,
            });
        }
        if self.catalog.contains(&term) {
            debug!(%term, "suggestion already catalogued");
            return Ok(SubmitOutcome::AlreadyKnown);
        }

        let mut sets = self.sets.lock();
        if sets.contains(&term) {
            debug!(%term, "suggestion already recorded");
            return Ok(SubmitOutcome::AlreadyKnown);
        }
        if sets.len(classification) >= self.limit {
            warn!(limit = self.limit, "suggestion capacity reached");
            return Err(SuggestError::CapacityExceeded {
                classification,
                limit: self.limit,
            });
        }

        self.append(classification, &term)?;
        sets.insert(classification, term.clone());
        info!(%term, "suggestion recorded");
        Ok(SubmitOutcome::Recorded)
    }

    fn append(&self, classification: Classification, term: &str) -> SuggestResult<()> {
        let path = self.log_path(classification);
        let persist = |source| SuggestError::Persist {
            path: path.clone(),
            source,
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_std_path())
            .map_err(persist)?;
        file.write_all(format!("{term}\n").as_bytes())
            .map_err(persist)?;
        file.flush().map_err(persist)
    }
}
