//! Single-term statistics: TF, IDF, TF-IDF and the two BM25 factors.
//!
//! Every public function takes a raw user term and tokenizes it without
//! stopwords; anything that does not reduce to exactly one term is rejected.
//! The `*_of` variants take an already normalized term and are what the
//! ranker uses.

use crate::error::{Result, SearchError};
use crate::tokenizer::{tokenize, Stopwords};
use crate::{DocId, InvertedIndex, SearchConfig, Term};

#[derive(Debug, Clone, Copy)]
pub struct Scorer<'a> {
    index: &'a InvertedIndex,
}

impl<'a> Scorer<'a> {
    pub fn new(index: &'a InvertedIndex) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &'a InvertedIndex {
        self.index
    }

    pub fn term_frequency(&self, doc_id: DocId, term: &str) -> Result<u32> {
        let term = single_term(term)?;
        Ok(self.index.term_count(doc_id, &term))
    }

    /// `ln((N + 1) / (df + 1))`.
    pub fn inverse_document_frequency(&self, term: &str) -> Result<f64> {
        self.idf_of(&single_term(term)?)
    }

    pub fn tf_idf(&self, doc_id: DocId, term: &str) -> Result<f64> {
        let term = single_term(term)?;
        let idf = self.idf_of(&term)?;
        Ok(self.index.term_count(doc_id, &term) as f64 * idf)
    }

    /// `ln((N - df + 0.5) / (df + 0.5) + 1)`. Goes negative for very common
    /// terms; that is left as is.
    pub fn bm25_idf(&self, term: &str) -> Result<f64> {
        self.bm25_idf_of(&single_term(term)?)
    }

    /// `(tf * (k1 + 1)) / (tf + k1)`, saturating towards `k1 + 1`.
    pub fn bm25_tf(&self, doc_id: DocId, term: &str, config: &SearchConfig) -> Result<f64> {
        let term = single_term(term)?;
        Ok(self.bm25_tf_of(doc_id, &term, config))
    }

    pub fn idf_of(&self, term: &str) -> Result<f64> {
        let df = self.df(term)?;
        let n = self.index.num_docs() as f64;
        Ok(((n + 1.0) / (df + 1.0)).ln())
    }

    pub fn bm25_idf_of(&self, term: &str) -> Result<f64> {
        let df = self.df(term)?;
        let n = self.index.num_docs() as f64;
        Ok(((n - df + 0.5) / (df + 0.5) + 1.0).ln())
    }

    // TODO: apply `config.b` once per-document lengths (`InvertedIndex::doc_length`)
    // and the corpus average are fed into the denominator.
    pub fn bm25_tf_of(&self, doc_id: DocId, term: &str, config: &SearchConfig) -> f64 {
        let tf = self.index.term_count(doc_id, term) as f64;
        if tf == 0.0 {
            return 0.0;
        }
        (tf * (config.k1 + 1.0)) / (tf + config.k1)
    }

    fn df(&self, term: &str) -> Result<f64> {
        self.index
            .document_frequency(term)
            .map(|df| df as f64)
            .ok_or_else(|| SearchError::UnknownTerm(term.to_string()))
    }
}

fn single_term(raw: &str) -> Result<Term> {
    let mut tokens = tokenize(raw, &Stopwords::new());
    if tokens.len() != 1 {
        return Err(SearchError::InvalidInput { term: raw.to_string(), tokens: tokens.len() });
    }
    Ok(tokens.remove(0))
}
