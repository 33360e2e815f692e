//! Core library for food-lookup.
//!
//! Answers "is this food allowed?" against a catalog read from a directory
//! tree, tolerating typos through phonetic matching, and records user
//! suggestions for foods that are not catalogued yet.
//!
//! # Modules
//!
//! - [`catalog`] - Catalog entries, classifications and the immutable index
//! - [`loader`] - Building the catalog from a data directory
//! - [`phonetic`] - Double Metaphone short keys
//! - [`resolver`] - Prefix matching with phonetic fallback
//! - [`suggest`] - Deduplicated, capped, append-only suggestion logs
//! - [`engine`] - All of the above wired together from a [`Config`]
//! - [`config`] - Configuration loading and management
//! - [`error`] - Error types and result aliases
//!
//! # Quick Start
//!
//! ```no_run
//! use food_lookup_core::{Classification, ConfigLoader, Engine};
//!
//! let (config, _sources) = ConfigLoader::new().load().expect("configuration");
//! let engine = Engine::from_config(&config);
//!
//! let matches = engine.lookup("frute");
//! println!("allowed: {:?}", matches.possible_allowed);
//!
//! engine.suggest("dragon fruit", Classification::Allowed).ok();
//! ```
#![deny(unsafe_code)]

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod loader;
pub mod phonetic;
pub mod resolver;
pub mod suggest;

pub use catalog::{Catalog, CatalogEntry, Classification};
pub use config::{Config, ConfigLoader, ConfigSources, LogLevel};
pub use engine::{Engine, SuggestionCounts};
pub use error::{CatalogError, ConfigError, ConfigResult, SuggestError, SuggestResult};
pub use loader::{CatalogLoader, LoadReport, LoadedData, load_data_dir};
pub use phonetic::PhoneticKeys;
pub use resolver::{Candidates, MatchResponse, MatchSource, Resolution, Resolver};
pub use suggest::{SubmitOutcome, SuggestionSink};
