//! Movie corpus on disk: a JSON file of records and a plain-text stopword list.

use crate::error::{Result, SearchError};
use crate::tokenizer::{default_stopwords, Stopwords};
use crate::Document;
use serde::Deserialize;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

#[derive(Debug, Deserialize)]
struct CorpusFile {
    movies: Vec<Document>,
}

/// Read `{"movies": [...]}`, keeping records in file order.
pub fn load_documents(path: &Path) -> Result<Vec<Document>> {
    let f = File::open(path).map_err(|source| SearchError::Corpus { path: path.to_path_buf(), source })?;
    let corpus: CorpusFile = serde_json::from_reader(BufReader::new(f))?;
    tracing::debug!(path = %path.display(), num_docs = corpus.movies.len(), "loaded corpus");
    Ok(corpus.movies)
}

/// One stopword per line; blank lines are skipped.
pub fn load_stopwords(path: &Path) -> Result<Stopwords> {
    let f = File::open(path).map_err(|source| SearchError::Corpus { path: path.to_path_buf(), source })?;
    let mut words = Stopwords::new();
    for line in BufReader::new(f).lines() {
        let line = line?;
        let word = line.trim();
        if !word.is_empty() {
            words.insert(word.to_string());
        }
    }
    Ok(words)
}

/// Like [`load_stopwords`], but a missing file yields the built-in list.
pub fn load_stopwords_or_default(path: &Path) -> Result<Stopwords> {
    match load_stopwords(path) {
        Err(SearchError::Corpus { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "stopword file not found, using built-in list");
            Ok(default_stopwords())
        }
        other => other,
    }
}
