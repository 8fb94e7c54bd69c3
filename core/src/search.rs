//! Free-text retrieval. Three strategies with deliberately different orderings:
//!
//! - [`SearchMode::Substring`]: corpus order, a query token only has to appear
//!   inside a title token.
//! - [`SearchMode::Index`]: query-token order, then ascending id per posting list.
//!   A document matching two query tokens is listed twice.
//! - [`SearchMode::Bm25`]: descending score, ties broken by ascending id.

use crate::scoring::Scorer;
use crate::tokenizer::{tokenize, Stopwords};
use crate::{DocId, Document, InvertedIndex, SearchConfig, Term};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    Substring,
    #[default]
    Index,
    Bm25,
}

impl FromStr for SearchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "substring" => Ok(Self::Substring),
            "index" => Ok(Self::Index),
            "bm25" => Ok(Self::Bm25),
            other => Err(format!("unknown search mode {other:?} (expected substring, index or bm25)")),
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Substring => "substring",
            Self::Index => "index",
            Self::Bm25 => "bm25",
        })
    }
}

/// A matched document with its full record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hit {
    pub doc_id: DocId,
    /// Only BM25 results carry a score.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    pub document: Document,
}

impl Hit {
    fn unscored(doc: &Document) -> Self {
        Self { doc_id: doc.id, score: None, document: doc.clone() }
    }
}

/// First `limit` documents, in the given order, whose title has a token
/// containing any query token.
pub fn substring_search<'d, I>(documents: I, query: &str, stopwords: &Stopwords, limit: usize) -> Vec<Hit>
where
    I: IntoIterator<Item = &'d Document>,
{
    let query_tokens = tokenize(query, stopwords);
    if limit == 0 || query_tokens.is_empty() {
        return Vec::new();
    }
    documents
        .into_iter()
        .filter(|doc| has_matching_token(&query_tokens, &tokenize(&doc.title, stopwords)))
        .take(limit)
        .map(Hit::unscored)
        .collect()
}

fn has_matching_token(query_tokens: &[Term], title_tokens: &[Term]) -> bool {
    query_tokens.iter().any(|q| title_tokens.iter().any(|t| t.contains(q.as_str())))
}

/// Walk each query token's posting list in turn until `limit` hits are collected.
/// Repeated documents are kept.
pub fn index_search(index: &InvertedIndex, query: &str, stopwords: &Stopwords, limit: usize) -> Vec<Hit> {
    let mut hits = Vec::new();
    if limit == 0 {
        return hits;
    }
    for token in tokenize(query, stopwords) {
        for doc_id in index.get_documents(&token) {
            if let Some(doc) = index.document(doc_id) {
                hits.push(Hit::unscored(doc));
                if hits.len() >= limit {
                    return hits;
                }
            }
        }
    }
    hits
}

/// Score every document containing at least one query term by summing
/// `bm25_idf * bm25_tf` over the distinct query terms it contains.
pub fn bm25_search(index: &InvertedIndex, query: &str, stopwords: &Stopwords, config: &SearchConfig) -> Vec<(DocId, f64)> {
    let scorer = Scorer::new(index);
    let mut seen = HashSet::new();
    let mut scores: HashMap<DocId, f64> = HashMap::new();

    for term in tokenize(query, stopwords) {
        if !seen.insert(term.clone()) {
            continue;
        }
        // Terms missing from the index contribute nothing.
        let Ok(idf) = scorer.bm25_idf_of(&term) else { continue };
        for doc_id in index.get_documents(&term) {
            *scores.entry(doc_id).or_insert(0.0) += idf * scorer.bm25_tf_of(doc_id, &term, config);
        }
    }

    let mut ranked: Vec<(DocId, f64)> = scores.into_iter().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked.truncate(config.limit);
    ranked
}

/// One loaded index plus the query-side settings shared by every mode.
#[derive(Debug, Clone, Copy)]
pub struct Searcher<'a> {
    pub index: &'a InvertedIndex,
    pub stopwords: &'a Stopwords,
    pub config: SearchConfig,
}

impl<'a> Searcher<'a> {
    pub fn new(index: &'a InvertedIndex, stopwords: &'a Stopwords, config: SearchConfig) -> Self {
        Self { index, stopwords, config }
    }

    /// Substring mode walks the documents in the order the corpus listed them.
    pub fn search(&self, mode: SearchMode, query: &str) -> Vec<Hit> {
        let hits = match mode {
            SearchMode::Substring => {
                substring_search(self.index.documents(), query, self.stopwords, self.config.limit)
            }
            SearchMode::Index => index_search(self.index, query, self.stopwords, self.config.limit),
            SearchMode::Bm25 => bm25_search(self.index, query, self.stopwords, &self.config)
                .into_iter()
                .filter_map(|(doc_id, score)| {
                    self.index.document(doc_id).map(|doc| Hit { score: Some(score), ..Hit::unscored(doc) })
                })
                .collect(),
        };
        tracing::debug!(%mode, query, hits = hits.len(), "search");
        hits
    }
}
