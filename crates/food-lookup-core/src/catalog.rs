//! The in-memory catalog of known foods.
//!
//! A [`Catalog`] is assembled once through a [`CatalogBuilder`] and is
//! read-only afterwards, so it can be shared across request handlers
//! behind an `Arc` without locking. Entries are keyed by their normalized
//! token and kept in token order, which gives the resolver a stable
//! iteration order.

use std::collections::BTreeMap;
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::phonetic::PhoneticKeys;

/// Whether a food is allowed or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum Classification {
    /// The food is allowed.
    Allowed,
    /// The food is not allowed.
    NotAllowed,
}

impl Classification {
    /// Both classifications, allowed first.
    pub const ALL: [Self; 2] = [Self::Allowed, Self::NotAllowed];

    /// Returns the directory name that marks this classification on disk.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Allowed => "allowed",
            Self::NotAllowed => "not_allowed",
        }
    }

    /// Parse a data directory name. Only the exact sentinel names are accepted.
    pub fn from_dir_name(name: &str) -> Option<Self> {
        match name {
            "allowed" => Some(Self::Allowed),
            "not_allowed" => Some(Self::NotAllowed),
            _ => None,
        }
    }

    /// Map a submitter's boolean hint to a classification.
    pub const fn from_allowed(allowed: bool) -> Self {
        if allowed { Self::Allowed } else { Self::NotAllowed }
    }

    /// Returns `true` for [`Classification::Allowed`].
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// File name of the suggestion log for this classification.
    pub const fn suggestion_log_name(&self) -> &'static str {
        match self {
            Self::Allowed => "suggested_allowed.txt",
            Self::NotAllowed => "suggested_not_allowed.txt",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One catalogued food.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CatalogEntry {
    /// Trimmed, lower-cased text. Unique across the catalog.
    pub token: String,
    /// Trimmed text in its original case, as first seen.
    pub display_name: String,
    /// Allowed or not.
    pub classification: Classification,
    /// Phonetic keys of the display name.
    pub keys: PhoneticKeys,
    /// Category label, taken from the source file's stem.
    pub category: String,
}

impl CatalogEntry {
    /// Build an entry from a raw catalog line, computing its token and keys.
    ///
    /// Returns `None` for blank lines.
    pub fn from_line(line: &str, classification: Classification, category: &str) -> Option<Self> {
        let display_name = line.trim();
        if display_name.is_empty() {
            return None;
        }
        Some(Self {
            token: display_name.to_lowercase(),
            display_name: display_name.to_string(),
            classification,
            keys: PhoneticKeys::encode(display_name),
            category: category.to_string(),
        })
    }
}

/// What happened when an entry was offered to the builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The token was new and the entry was stored.
    Inserted,
    /// The token was already present with the same classification and category.
    Duplicate,
    /// The token was already present with a different classification or
    /// category. The existing entry is kept.
    Conflict {
        /// Classification of the entry that was kept.
        existing: Classification,
        /// Category of the entry that was kept.
        existing_category: String,
    },
}

/// Accumulates entries with first-occurrence-wins semantics.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    entries: BTreeMap<String, CatalogEntry>,
}

impl CatalogBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer an entry. Existing tokens are never overwritten.
    pub fn insert(&mut self, entry: CatalogEntry) -> InsertOutcome {
        match self.entries.get(&entry.token) {
            None => {
                self.entries.insert(entry.token.clone(), entry);
                InsertOutcome::Inserted
            }
            Some(existing)
                if existing.classification == entry.classification
                    && existing.category == entry.category =>
            {
                InsertOutcome::Duplicate
            }
            Some(existing) => InsertOutcome::Conflict {
                existing: existing.classification,
                existing_category: existing.category.clone(),
            },
        }
    }

    /// Number of entries collected so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been inserted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Freeze the collected entries.
    pub fn build(self) -> Catalog {
        Catalog {
            entries: self.entries,
        }
    }
}

/// Immutable token → entry index.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: BTreeMap<String, CatalogEntry>,
}

impl Catalog {
    /// An empty catalog.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Look up an entry by normalized token.
    pub fn get(&self, token: &str) -> Option<&CatalogEntry> {
        self.entries.get(token)
    }

    /// Returns `true` if `token` is catalogued.
    pub fn contains(&self, token: &str) -> bool {
        self.entries.contains_key(token)
    }

    /// Iterate entries in token order.
    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the catalog has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries with the given classification.
    pub fn count(&self, classification: Classification) -> usize {
        self.iter()
            .filter(|entry| entry.classification == classification)
            .count()
    }
}

impl FromIterator<CatalogEntry> for Catalog {
    fn from_iter<I: IntoIterator<Item = CatalogEntry>>(iter: I) -> Self {
        let mut builder = CatalogBuilder::new();
        for entry in iter {
            builder.insert(entry);
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(line: &str, classification: Classification, category: &str) -> CatalogEntry {
        CatalogEntry::from_line(line, classification, category).unwrap()
    }

    #[test]
    fn from_line_normalizes_token_and_keeps_display_case() {
        let e = entry("  Green Apple \t", Classification::Allowed, "fruit");
        assert_eq!(e.token, "green apple");
        assert_eq!(e.display_name, "Green Apple");
        assert_eq!(e.category, "fruit");
    }

    #[test]
    fn from_line_skips_blank_lines() {
        assert!(CatalogEntry::from_line("   ", Classification::Allowed, "fruit").is_none());
    }

    #[test]
    fn first_occurrence_wins_on_conflict() {
        let mut builder = CatalogBuilder::new();
        assert_eq!(
            builder.insert(entry("Apple", Classification::Allowed, "fruit")),
            InsertOutcome::Inserted
        );
        let outcome = builder.insert(entry("apple", Classification::NotAllowed, "sweets"));
        assert_eq!(
            outcome,
            InsertOutcome::Conflict {
                existing: Classification::Allowed,
                existing_category: "fruit".to_string(),
            }
        );

        let catalog = builder.build();
        let kept = catalog.get("apple").unwrap();
        assert_eq!(kept.display_name, "Apple");
        assert_eq!(kept.classification, Classification::Allowed);
    }

    #[test]
    fn repeated_identical_entry_is_a_duplicate() {
        let mut builder = CatalogBuilder::new();
        builder.insert(entry("kale", Classification::Allowed, "greens"));
        assert_eq!(
            builder.insert(entry("Kale", Classification::Allowed, "greens")),
            InsertOutcome::Duplicate
        );
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn category_mismatch_is_a_conflict() {
        let mut builder = CatalogBuilder::new();
        builder.insert(entry("kale", Classification::Allowed, "greens"));
        assert!(matches!(
            builder.insert(entry("kale", Classification::Allowed, "salad")),
            InsertOutcome::Conflict { .. }
        ));
    }

    #[test]
    fn iterates_in_token_order() {
        let catalog: Catalog = [
            entry("pear", Classification::Allowed, "fruit"),
            entry("Apple", Classification::Allowed, "fruit"),
            entry("bread", Classification::NotAllowed, "grains"),
        ]
        .into_iter()
        .collect();

        let tokens: Vec<&str> = catalog.iter().map(|e| e.token.as_str()).collect();
        assert_eq!(tokens, vec!["apple", "bread", "pear"]);
        assert_eq!(catalog.count(Classification::Allowed), 2);
        assert_eq!(catalog.count(Classification::NotAllowed), 1);
    }

    #[test]
    fn classification_dir_names_are_exact() {
        assert_eq!(
            Classification::from_dir_name("allowed"),
            Some(Classification::Allowed)
        );
        assert_eq!(
            Classification::from_dir_name("not_allowed"),
            Some(Classification::NotAllowed)
        );
        assert_eq!(Classification::from_dir_name("Allowed"), None);
        assert_eq!(Classification::from_dir_name("not-allowed"), None);
        assert_eq!(Classification::from_dir_name("misc"), None);
    }

    #[test]
    fn classification_serializes_as_dir_name() {
        for c in Classification::ALL {
            let json = serde_json::to_string(&c).unwrap();
            assert_eq!(json, format!("\"{}\"", c.as_str()));
        }
    }
}
