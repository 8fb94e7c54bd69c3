use anyhow::Result;
use clap::{Parser, Subcommand};
use search_core::config::{DEFAULT_B, DEFAULT_K1, DEFAULT_SEARCH_LIMIT};
use search_core::corpus::{load_documents, load_stopwords_or_default};
use search_core::persist::{load_index, save_index, IndexPaths};
use search_core::search::{substring_search, Searcher};
use search_core::{DocId, InvertedIndex, Scorer, SearchConfig, SearchMode};
use tracing_subscriber::{fmt, EnvFilter};

use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "keyword_search")]
#[command(about = "Keyword search over the movie corpus", long_about = None)]
struct Cli {
    /// Corpus file with a top-level "movies" array
    #[arg(long, global = true, default_value = "data/movies.json")]
    data: PathBuf,
    /// Stopword list, one word per line
    #[arg(long, global = true, default_value = "data/stopwords.txt")]
    stopwords: PathBuf,
    /// Directory holding the built index
    #[arg(long, global = true, default_value = "cache")]
    cache: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the inverted index from the corpus and save it
    Build,
    /// Search movie titles
    Search {
        query: String,
        #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
        limit: usize,
        /// substring, index or bm25
        #[arg(long, default_value_t = SearchMode::Index)]
        mode: SearchMode,
    },
    /// Raw count of a term in one document
    Tf { doc_id: DocId, term: String },
    /// Inverse document frequency of a term
    Idf { term: String },
    /// TF-IDF of a term in one document
    Tfidf { doc_id: DocId, term: String },
    /// BM25 inverse document frequency of a term
    Bm25idf { term: String },
    /// BM25 saturated term frequency of a term in one document
    Bm25tf {
        doc_id: DocId,
        term: String,
        #[arg(long, default_value_t = DEFAULT_K1)]
        k1: f64,
        /// Length normalization; accepted but not applied yet
        #[arg(long, default_value_t = DEFAULT_B)]
        b: f64,
    },
    /// Rank movies for a query with BM25
    Bm25search {
        query: String,
        #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
        limit: usize,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(io::stderr).init();
    let cli = Cli::parse();
    let stdout = io::stdout();
    run(cli, &mut stdout.lock())
}

fn run(cli: Cli, out: &mut impl Write) -> Result<()> {
    let paths = IndexPaths::new(&cli.cache);
    match cli.command {
        Commands::Build => {
            let docs = load_documents(&cli.data)?;
            let index = InvertedIndex::build(&docs);
            save_index(&paths, &index)?;
            tracing::info!(cache = %paths.root.display(), "index build complete");
            writeln!(out, "Indexed {} movies ({} terms) into {}", index.num_docs(), index.num_terms(), paths.root.display())?;
        }
        Commands::Search { query, limit, mode } => {
            let stopwords = load_stopwords_or_default(&cli.stopwords)?;
            writeln!(out, "Searching for: {query}")?;
            let hits = match mode {
                // Substring matching walks the corpus file itself, in file order.
                SearchMode::Substring => substring_search(&load_documents(&cli.data)?, &query, &stopwords, limit),
                mode => {
                    let index = load_index(&paths)?;
                    Searcher::new(&index, &stopwords, SearchConfig::default().with_limit(limit)).search(mode, &query)
                }
            };
            for (rank, hit) in hits.iter().enumerate() {
                match hit.score {
                    Some(score) => writeln!(out, "{}. ({}) {} - Score: {score:.2}", rank + 1, hit.doc_id, hit.document.title)?,
                    None => writeln!(out, "{}. ({}) {}", rank + 1, hit.doc_id, hit.document.title)?,
                }
            }
        }
        Commands::Tf { doc_id, term } => {
            let index = load_index(&paths)?;
            let tf = Scorer::new(&index).term_frequency(doc_id, &term)?;
            writeln!(out, "Term frequency of '{term}' in document '{doc_id}': {tf}")?;
        }
        Commands::Idf { term } => {
            let index = load_index(&paths)?;
            let idf = Scorer::new(&index).inverse_document_frequency(&term)?;
            writeln!(out, "Inverse document frequency of '{term}': {idf:.2}")?;
        }
        Commands::Tfidf { doc_id, term } => {
            let index = load_index(&paths)?;
            let score = Scorer::new(&index).tf_idf(doc_id, &term)?;
            writeln!(out, "TF-IDF score of '{term}' in document '{doc_id}': {score:.2}")?;
        }
        Commands::Bm25idf { term } => {
            let index = load_index(&paths)?;
            let score = Scorer::new(&index).bm25_idf(&term)?;
            writeln!(out, "BM25 IDF score of '{term}': {score:.2}")?;
        }
        Commands::Bm25tf { doc_id, term, k1, b } => {
            let index = load_index(&paths)?;
            let config = SearchConfig { k1, b, ..SearchConfig::default() };
            let score = Scorer::new(&index).bm25_tf(doc_id, &term, &config)?;
            writeln!(out, "BM25 TF score of '{term}' in document '{doc_id}': {score:.2}")?;
        }
        Commands::Bm25search { query, limit } => {
            let stopwords = load_stopwords_or_default(&cli.stopwords)?;
            let index = load_index(&paths)?;
            let hits = Searcher::new(&index, &stopwords, SearchConfig::default().with_limit(limit))
                .search(SearchMode::Bm25, &query);
            for (rank, hit) in hits.iter().enumerate() {
                writeln!(out, "{}. ({}) {} - Score: {:.2}", rank + 1, hit.doc_id, hit.document.title, hit.score.unwrap_or_default())?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use search_core::SearchError;
    use std::fs;
    use std::path::Path;

    fn workspace(dir: &Path) {
        fs::write(
            dir.join("movies.json"),
            r#"{"movies": [
                {"id": 1, "title": "The Cat", "description": "A cat sits."},
                {"id": 2, "title": "Dog House", "description": "A dog barks."},
                {"id": 3, "title": "Category 7", "description": "A storm."}
            ]}"#,
        )
        .unwrap();
        fs::write(dir.join("stopwords.txt"), "a\nthe\n").unwrap();
    }

    fn exec(dir: &Path, args: &[&str]) -> Result<String> {
        let mut argv = vec!["keyword_search".to_string()];
        for flag in ["data", "stopwords", "cache"] {
            let file = match flag {
                "data" => "movies.json",
                "stopwords" => "stopwords.txt",
                _ => "cache",
            };
            argv.push(format!("--{flag}"));
            argv.push(dir.join(file).to_string_lossy().into_owned());
        }
        argv.extend(args.iter().map(|a| a.to_string()));
        let mut out = Vec::new();
        run(Cli::try_parse_from(argv)?, &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn stats_need_a_build_first() {
        let dir = tempfile::tempdir().unwrap();
        workspace(dir.path());
        let err = exec(dir.path(), &["tf", "1", "cat"]).unwrap_err();
        assert!(matches!(err.downcast_ref::<SearchError>(), Some(SearchError::IndexNotBuilt { .. })));
    }

    #[test]
    fn build_then_query() {
        let dir = tempfile::tempdir().unwrap();
        workspace(dir.path());
        assert!(exec(dir.path(), &["build"]).unwrap().starts_with("Indexed 3 movies"));

        assert!(exec(dir.path(), &["tf", "1", "cats"]).unwrap().ends_with(": 2\n"));
        assert!(exec(dir.path(), &["idf", "cat"]).unwrap().ends_with(": 0.69\n"));
        assert!(exec(dir.path(), &["bm25tf", "1", "cat", "--k1", "1.5"]).unwrap().ends_with(": 1.43\n"));

        let out = exec(dir.path(), &["search", "cat"]).unwrap();
        assert_eq!(out, "Searching for: cat\n1. (1) The Cat\n");
        let out = exec(dir.path(), &["search", "cat", "--mode", "substring"]).unwrap();
        assert!(out.contains("(3) Category 7"));
        let out = exec(dir.path(), &["bm25search", "dog"]).unwrap();
        assert!(out.starts_with("1. (2) Dog House - Score: "));
    }

    #[test]
    fn multi_word_terms_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        workspace(dir.path());
        exec(dir.path(), &["build"]).unwrap();
        let err = exec(dir.path(), &["idf", "big cat"]).unwrap_err();
        assert!(matches!(err.downcast_ref::<SearchError>(), Some(SearchError::InvalidInput { .. })));
    }
}
