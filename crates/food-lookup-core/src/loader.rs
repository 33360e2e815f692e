//! Catalog ingestion from a data directory.
//!
//! The data directory is laid out as:
//!
//! ```text
//! <root>/
//!   suggested_allowed.txt          # optional, one term per line
//!   suggested_not_allowed.txt      # optional, one term per line
//!   **/allowed/<category>.dat      # one food per line
//!   **/not_allowed/<category>.dat
//! ```
//!
//! Every failure is confined to the file or line it happened in. A broken
//! file is logged and skipped, and a missing root produces an empty catalog,
//! so the service always starts with whatever could be read.

use std::io::{BufRead, BufReader};

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::catalog::{Catalog, CatalogBuilder, CatalogEntry, Classification, InsertOutcome};
use crate::error::{CatalogError, CatalogResult};
use crate::suggest::SuggestionSets;

/// Extension of catalog source files.
pub const DATA_EXTENSION: &str = "dat";

/// Counters describing one load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Data files ingested.
    pub files_loaded: usize,
    /// Data files skipped because of an error.
    pub files_skipped: usize,
    /// Data files whose read failed partway; lines before the failure are kept.
    pub files_truncated: usize,
    /// Distinct entries in the resulting catalog.
    pub entries: usize,
    /// Lines repeating an existing token with the same classification and category.
    pub duplicates: usize,
    /// Lines repeating an existing token with a different classification or category.
    pub conflicts: usize,
    /// Lines dropped because they were not valid UTF-8.
    pub malformed_lines: usize,
    /// Terms seeded from `suggested_allowed.txt`.
    pub suggested_allowed: usize,
    /// Terms seeded from `suggested_not_allowed.txt`.
    pub suggested_not_allowed: usize,
}

/// Everything produced by a load.
#[derive(Debug)]
pub struct LoadedData {
    /// The frozen catalog.
    pub catalog: Catalog,
    /// Dedup sets seeded from the suggestion logs.
    pub suggestions: SuggestionSets,
    /// Load counters.
    pub report: LoadReport,
}

/// Walks a data directory and builds the catalog.
#[derive(Debug)]
pub struct CatalogLoader {
    root: Utf8PathBuf,
    builder: CatalogBuilder,
    report: LoadReport,
}

impl CatalogLoader {
    /// Prepare a loader for `root`.
    pub fn new<P: AsRef<Utf8Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            builder: CatalogBuilder::new(),
            report: LoadReport::default(),
        }
    }

    /// Walk the tree, ingest every data file, and seed the suggestion sets.
    #[tracing::instrument(skip(self), fields(root = %self.root))]
    pub fn load(mut self) -> LoadedData {
        if self.root.is_dir() {
            self.walk();
        } else {
            warn!(root = %self.root, "data directory not found; starting with an empty catalog");
        }

        let suggestions = SuggestionSets::load_from_dir(&self.root);
        self.report.suggested_allowed = suggestions.len(Classification::Allowed);
        self.report.suggested_not_allowed = suggestions.len(Classification::NotAllowed);

        let catalog = self.builder.build();
        self.report.entries = catalog.len();

        info!(
            entries = self.report.entries,
            files = self.report.files_loaded,
            skipped = self.report.files_skipped,
            conflicts = self.report.conflicts,
            "catalog loaded"
        );

        LoadedData {
            catalog,
            suggestions,
            report: self.report,
        }
    }

    fn walk(&mut self) {
        let walker = WalkDir::new(self.root.as_std_path())
            .follow_links(false)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(error = %CatalogError::from(err), "skipping unreadable path");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let path = match Utf8Path::from_path(entry.path()) {
                Some(path) => path.to_path_buf(),
                None => {
                    let err = CatalogError::NonUtf8Path(entry.path().display().to_string());
                    warn!(error = %err, "skipping file");
                    continue;
                }
            };
            if path.extension() != Some(DATA_EXTENSION) {
                continue;
            }

            match self.ingest_file(&path) {
                Ok(()) => self.report.files_loaded += 1,
                Err(err) => {
                    self.report.files_skipped += 1;
                    warn!(error = %err, "skipping data file");
                }
            }
        }
    }

    /// Ingest one data file into the builder.
    fn ingest_file(&mut self, path: &Utf8Path) -> CatalogResult<()> {
        let classification = classify(path)?;
        let category = path.file_stem().unwrap_or_default();

        let file = std::fs::File::open(path.as_std_path()).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(%path, %classification, category, "ingesting data file");

        self.ingest_lines(BufReader::new(file), path, classification, category);
        Ok(())
    }

    /// Ingest newline-separated entries from `reader`.
    ///
    /// A read error ends the file; entries read before it stay in the catalog.
    fn ingest_lines<R: BufRead>(
        &mut self,
        reader: R,
        path: &Utf8Path,
        classification: Classification,
        category: &str,
    ) {
        for (idx, chunk) in reader.split(b'\n').enumerate() {
            let bytes = match chunk {
                Ok(bytes) => bytes,
                Err(source) => {
                    self.report.files_truncated += 1;
                    let err = CatalogError::Io {
                        path: path.to_path_buf(),
                        source,
                    };
                    warn!(error = %err, line = idx + 1, "data file truncated by read error");
                    break;
                }
            };
            let Ok(line) = String::from_utf8(bytes) else {
                self.report.malformed_lines += 1;
                let err = CatalogError::MalformedLine {
                    path: path.to_path_buf(),
                    line: idx + 1,
                };
                warn!(error = %err, "skipping line");
                continue;
            };
            let Some(entry) = CatalogEntry::from_line(&line, classification, category) else {
                continue;
            };
            self.insert(entry, path);
        }
    }

    fn insert(&mut self, entry: CatalogEntry, path: &Utf8Path) {
        let token = entry.token.clone();
        let category = entry.category.clone();
        match self.builder.insert(entry) {
            InsertOutcome::Inserted => {}
            InsertOutcome::Duplicate => {
                self.report.duplicates += 1;
                debug!(%path, %token, "duplicate catalog entry");
            }
            InsertOutcome::Conflict {
                existing,
                existing_category,
            } => {
                self.report.conflicts += 1;
                warn!(
                    %path,
                    %token,
                    %category,
                    existing = %existing,
                    %existing_category,
                    "conflicting catalog entry; keeping the first"
                );
            }
        }
    }
}

/// Derive the classification from the file's immediate parent directory.
fn classify(path: &Utf8Path) -> CatalogResult<Classification> {
    let dir = path
        .parent()
        .and_then(Utf8Path::file_name)
        .unwrap_or_default();
    Classification::from_dir_name(dir).ok_or_else(|| CatalogError::UnknownClassification {
        path: path.to_path_buf(),
        dir: dir.to_string(),
    })
}

/// Load a data directory. Shorthand for `CatalogLoader::new(root).load()`.
pub fn load_data_dir<P: AsRef<Utf8Path>>(root: P) -> LoadedData {
    CatalogLoader::new(root).load()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn utf8_root(tmp: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap()
    }

    fn write(root: &Utf8Path, rel: &str, contents: &[u8]) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn classification_follows_parent_directory() {
        let tmp = TempDir::new().unwrap();
        let root = utf8_root(&tmp);
        write(&root, "allowed/fruit.dat", b"Apple\nPear\n");
        write(&root, "not_allowed/grains.dat", b"Bread\nRice\n");

        let loaded = load_data_dir(&root);
        let catalog = &loaded.catalog;

        assert_eq!(catalog.len(), 4);
        for token in ["apple", "pear"] {
            assert_eq!(
                catalog.get(token).unwrap().classification,
                Classification::Allowed
            );
        }
        for token in ["bread", "rice"] {
            assert_eq!(
                catalog.get(token).unwrap().classification,
                Classification::NotAllowed
            );
        }
        assert_eq!(catalog.get("apple").unwrap().category, "fruit");
        assert_eq!(catalog.get("rice").unwrap().category, "grains");
        assert_eq!(loaded.report.files_loaded, 2);
    }

    #[test]
    fn repeated_lines_are_idempotent() {
        let tmp = TempDir::new().unwrap();
        let root = utf8_root(&tmp);
        write(&root, "allowed/fruit.dat", b"Apple\napple\n  APPLE  \n");

        let loaded = load_data_dir(&root);

        assert_eq!(loaded.catalog.len(), 1);
        assert_eq!(loaded.catalog.get("apple").unwrap().display_name, "Apple");
        assert_eq!(loaded.report.duplicates, 2);
        assert_eq!(loaded.report.conflicts, 0);
    }

    #[test]
    fn conflicting_classification_keeps_first_seen() {
        let tmp = TempDir::new().unwrap();
        let root = utf8_root(&tmp);
        // "allowed" sorts before "not_allowed", so the allowed file is read first.
        write(&root, "allowed/fruit.dat", b"Tomato\n");
        write(&root, "not_allowed/nightshades.dat", b"tomato\n");

        let loaded = load_data_dir(&root);
        let tomato = loaded.catalog.get("tomato").unwrap();

        assert_eq!(tomato.classification, Classification::Allowed);
        assert_eq!(tomato.category, "fruit");
        assert_eq!(loaded.report.conflicts, 1);
    }

    #[test]
    fn unknown_parent_directory_skips_only_that_file() {
        let tmp = TempDir::new().unwrap();
        let root = utf8_root(&tmp);
        write(&root, "allowed/fruit.dat", b"Apple\n");
        write(&root, "maybe/sweets.dat", b"Candy\n");

        let loaded = load_data_dir(&root);

        assert!(loaded.catalog.contains("apple"));
        assert!(!loaded.catalog.contains("candy"));
        assert_eq!(loaded.report.files_loaded, 1);
        assert_eq!(loaded.report.files_skipped, 1);
    }

    #[test]
    fn nested_directories_are_walked() {
        let tmp = TempDir::new().unwrap();
        let root = utf8_root(&tmp);
        write(&root, "phase1/allowed/greens.dat", b"Kale\n");
        write(&root, "phase1/not_allowed/dairy.dat", b"Cheese\n");

        let loaded = load_data_dir(&root);

        assert_eq!(loaded.catalog.len(), 2);
        assert_eq!(loaded.catalog.get("kale").unwrap().category, "greens");
    }

    #[test]
    fn non_data_files_are_ignored() {
        let tmp = TempDir::new().unwrap();
        let root = utf8_root(&tmp);
        write(&root, "allowed/fruit.dat", b"Apple\n");
        write(&root, "allowed/notes.txt", b"Banana\n");
        write(&root, "allowed/README", b"Cherry\n");

        let loaded = load_data_dir(&root);

        assert_eq!(loaded.catalog.len(), 1);
        assert_eq!(loaded.report.files_loaded, 1);
        assert_eq!(loaded.report.files_skipped, 0);
    }

    #[test]
    fn blank_lines_and_crlf_are_tolerated() {
        let tmp = TempDir::new().unwrap();
        let root = utf8_root(&tmp);
        write(&root, "allowed/fruit.dat", b"Apple\r\n\r\n   \nPear");

        let loaded = load_data_dir(&root);

        assert_eq!(loaded.catalog.len(), 2);
        assert_eq!(loaded.catalog.get("apple").unwrap().display_name, "Apple");
        assert!(loaded.catalog.contains("pear"));
    }

    #[test]
    fn invalid_utf8_line_is_skipped() {
        let tmp = TempDir::new().unwrap();
        let root = utf8_root(&tmp);
        write(&root, "allowed/fruit.dat", b"Apple\n\xff\xfe\nPear\n");

        let loaded = load_data_dir(&root);

        assert_eq!(loaded.catalog.len(), 2);
        assert_eq!(loaded.report.malformed_lines, 1);
        assert_eq!(loaded.report.files_loaded, 1);
    }

    struct FailAfter {
        data: &'static [u8],
        served: bool,
    }

    impl std::io::Read for FailAfter {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.served {
                return Err(std::io::Error::other("device went away"));
            }
            self.served = true;
            let n = self.data.len().min(buf.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            Ok(n)
        }
    }

    #[test]
    fn read_error_keeps_lines_before_it() {
        let tmp = TempDir::new().unwrap();
        let root = utf8_root(&tmp);
        let path = root.join("allowed/fruit.dat");
        let mut loader = CatalogLoader::new(&root);
        let reader = BufReader::new(FailAfter {
            data: b"Apple\nPear\n",
            served: false,
        });

        loader.ingest_lines(reader, &path, Classification::Allowed, "fruit");

        assert_eq!(loader.builder.len(), 2);
        assert_eq!(loader.report.files_truncated, 1);
        assert_eq!(loader.report.files_skipped, 0);
    }

    #[test]
    fn accented_lines_load_with_the_rest_of_the_file() {
        let tmp = TempDir::new().unwrap();
        let root = utf8_root(&tmp);
        write(
            &root,
            "allowed/drinks.dat",
            "Coffee\nCafé au lait\nCrème brûlée\nTea\n".as_bytes(),
        );

        let loaded = load_data_dir(&root);

        assert_eq!(loaded.catalog.len(), 4);
        assert_eq!(
            loaded.catalog.get("café au lait").unwrap().display_name,
            "Café au lait"
        );
        assert_eq!(loaded.report.files_loaded, 1);
    }

    #[test]
    fn missing_root_yields_empty_catalog() {
        let tmp = TempDir::new().unwrap();
        let root = utf8_root(&tmp).join("does-not-exist");

        let loaded = load_data_dir(&root);

        assert!(loaded.catalog.is_empty());
        assert_eq!(loaded.report, LoadReport::default());
    }

    #[test]
    fn suggestion_logs_seed_dedup_sets() {
        let tmp = TempDir::new().unwrap();
        let root = utf8_root(&tmp);
        write(&root, "allowed/fruit.dat", b"Apple\n");
        write(&root, "suggested_allowed.txt", b"Mango\nfig\n");
        write(&root, "suggested_not_allowed.txt", b"  Donut \n");

        let loaded = load_data_dir(&root);

        assert!(loaded.suggestions.contains("mango"));
        assert!(loaded.suggestions.contains("fig"));
        assert!(loaded.suggestions.contains("donut"));
        assert_eq!(loaded.report.suggested_allowed, 2);
        assert_eq!(loaded.report.suggested_not_allowed, 1);
        // Suggestion logs are not catalog sources.
        assert!(!loaded.catalog.contains("mango"));
    }
}
