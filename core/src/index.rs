use crate::tokenizer::{tokenize, Stopwords};
use crate::{DocId, Document, Term};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Postings, per-document term counts and the records they point at.
///
/// Built in one pass by [`InvertedIndex::build`] and never mutated afterwards;
/// a rebuild produces a new value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvertedIndex {
    /// term -> ids of every document containing it
    pub postings: HashMap<Term, BTreeSet<DocId>>,
    pub docmap: BTreeMap<DocId, Document>,
    /// ids in the order the corpus yielded them
    pub order: Vec<DocId>,
    /// doc id -> term -> occurrence count
    pub term_frequencies: HashMap<DocId, HashMap<Term, u32>>,
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    /// Index title and description of every document. Stopwords are not
    /// filtered here; only queries drop them.
    ///
    /// A document whose id was already seen in this pass is skipped.
    pub fn build<'a, I>(documents: I) -> Self
    where
        I: IntoIterator<Item = &'a Document>,
    {
        let no_stopwords = Stopwords::new();
        let mut postings: HashMap<Term, BTreeSet<DocId>> = HashMap::new();
        let mut docmap = BTreeMap::new();
        let mut order = Vec::new();
        let mut term_frequencies: HashMap<DocId, HashMap<Term, u32>> = HashMap::new();

        for doc in documents {
            if docmap.contains_key(&doc.id) {
                tracing::warn!(doc_id = doc.id, "duplicate document id, keeping the first record");
                continue;
            }
            let counts = term_frequencies.entry(doc.id).or_default();
            for term in tokenize(&doc.indexed_text(), &no_stopwords) {
                postings.entry(term.clone()).or_default().insert(doc.id);
                *counts.entry(term).or_insert(0) += 1;
            }
            docmap.insert(doc.id, doc.clone());
            order.push(doc.id);
        }

        tracing::info!(num_docs = docmap.len(), num_terms = postings.len(), "built inverted index");
        Self { postings, docmap, order, term_frequencies }
    }

    /// Records in corpus order.
    pub fn documents(&self) -> impl Iterator<Item = &Document> + '_ {
        self.order.iter().filter_map(|id| self.docmap.get(id))
    }

    /// Ids containing `term`, ascending. Unknown terms give an empty list.
    pub fn get_documents(&self, term: &str) -> Vec<DocId> {
        self.postings.get(term).map(|ids| ids.iter().copied().collect()).unwrap_or_default()
    }

    pub fn num_docs(&self) -> usize { self.docmap.len() }

    pub fn num_terms(&self) -> usize { self.postings.len() }

    /// `None` when the term has no postings entry at all.
    pub fn document_frequency(&self, term: &str) -> Option<usize> {
        self.postings.get(term).map(BTreeSet::len)
    }

    /// Raw count; zero for unknown documents or terms.
    pub fn term_count(&self, doc_id: DocId, term: &str) -> u32 {
        self.term_frequencies
            .get(&doc_id)
            .and_then(|counts| counts.get(term))
            .copied()
            .unwrap_or(0)
    }

    /// Number of indexed tokens in a document.
    pub fn doc_length(&self, doc_id: DocId) -> u32 {
        self.term_frequencies.get(&doc_id).map(|counts| counts.values().sum()).unwrap_or(0)
    }

    pub fn document(&self, doc_id: DocId) -> Option<&Document> {
        self.docmap.get(&doc_id)
    }
}
