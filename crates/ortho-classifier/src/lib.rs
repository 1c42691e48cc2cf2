//! OrthoEvidence Issue Classifier
//!
//! Maps a paper's free-text metadata to dental issues via weighted keyword
//! matching, producing paper-issue relations with a relevance score and a
//! primary-issue flag.
//!
//! The matching itself is a pure function over the paper's text and the
//! keyword table, kept isolated so it can be swapped for a smarter matcher
//! without touching the aggregator or scorer. The store-backed entry point
//! replaces a paper's relation rows via keyed upsert, so re-classification
//! after a metadata change never appends duplicates and per-paper workers
//! can run in parallel.
//!
//! # Examples
//!
//! ```no_run
//! use ortho_classifier::{Classifier, ClassifierConfig};
//!
//! let classifier = Classifier::new(ClassifierConfig::default());
//! // let outcome = classifier.classify(&paper, &issues, &keywords);
//! ```

#![warn(missing_docs)]

mod classifier;
mod config;
mod error;

pub use classifier::{relevance_scores, Classification, Classifier, IssueRelevance};
pub use config::ClassifierConfig;
pub use error::ClassifierError;
