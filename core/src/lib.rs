//! Keyword search over a small corpus of movie records.
//!
//! The build phase turns a corpus into an [`InvertedIndex`] and persists it;
//! the query phase reloads it and answers single-term statistics ([`scoring`])
//! or free-text queries ([`search`]).

pub mod config;
pub mod corpus;
pub mod error;
pub mod index;
pub mod persist;
pub mod scoring;
pub mod search;
pub mod stemmer;
pub mod tokenizer;

use serde::{Deserialize, Serialize};

pub use config::SearchConfig;
pub use error::{Result, SearchError};
pub use index::InvertedIndex;
pub use scoring::Scorer;
pub use search::{Hit, SearchMode};

pub type DocId = u32;
/// A lowercased, punctuation-free, stemmed token.
pub type Term = String;

/// One corpus record. Fields beyond id, title and description are carried
/// through untouched in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub title: String,
    pub description: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Document {
    pub fn new(id: DocId, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self { id, title: title.into(), description: description.into(), extra: serde_json::Map::new() }
    }

    /// Text that goes into the index: title and description joined by one space.
    pub fn indexed_text(&self) -> String {
        format!("{} {}", self.title, self.description)
    }
}
