pub mod error;

use anyhow::Result;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use error::ApiError;
use parking_lot::{Mutex, RwLock};
use search_core::corpus::{load_documents, load_stopwords_or_default};
use search_core::persist::{load_index, save_index, IndexPaths};
use search_core::search::Searcher;
use search_core::tokenizer::Stopwords;
use search_core::{DocId, Document, Hit, InvertedIndex, Scorer, SearchConfig, SearchMode};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Debug, Clone)]
pub struct ServerOptions {
    pub index_dir: PathBuf,
    pub corpus: PathBuf,
    pub stopwords: PathBuf,
    pub admin_token: Option<String>,
    /// Comma-separated origins; any origin when unset or unparsable.
    pub cors_allow_origin: Option<String>,
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    pub limit: Option<usize>,
    #[serde(default)]
    pub mode: SearchMode,
    pub k1: Option<f64>,
    pub b: Option<f64>,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub mode: SearchMode,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<Hit>,
}

#[derive(Deserialize)]
pub struct StatParams {
    pub term: String,
    pub doc_id: Option<DocId>,
    pub k1: Option<f64>,
    pub b: Option<f64>,
}

#[derive(Serialize)]
pub struct StatResponse {
    pub stat: String,
    pub term: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<DocId>,
    pub value: f64,
}

#[derive(Serialize)]
pub struct IndexSummary {
    pub num_docs: usize,
    pub num_terms: usize,
}

/// Readers clone the inner `Arc` and work on that snapshot; reload and
/// rebuild replace it wholesale.
#[derive(Clone)]
pub struct AppState {
    pub index_paths: IndexPaths,
    pub corpus: PathBuf,
    pub snapshot: Arc<RwLock<Arc<InvertedIndex>>>,
    pub stopwords: Arc<Stopwords>,
    pub admin_token: Option<String>,
    /// Held for the whole of a reload or rebuild so two of them never
    /// write the cache directory at once.
    pub maintenance: Arc<Mutex<()>>,
}

impl AppState {
    pub fn current(&self) -> Arc<InvertedIndex> {
        self.snapshot.read().clone()
    }

    fn publish(&self, index: InvertedIndex) -> IndexSummary {
        let summary = IndexSummary { num_docs: index.num_docs(), num_terms: index.num_terms() };
        *self.snapshot.write() = Arc::new(index);
        tracing::info!(num_docs = summary.num_docs, num_terms = summary.num_terms, "swapped index snapshot");
        summary
    }
}

pub fn build_app(opts: ServerOptions) -> Result<Router> {
    // Load index at startup
    let index_paths = IndexPaths::new(&opts.index_dir);
    let index = load_index(&index_paths)?;
    let stopwords = load_stopwords_or_default(&opts.stopwords)?;
    let app_state = AppState {
        index_paths,
        corpus: opts.corpus,
        snapshot: Arc::new(RwLock::new(Arc::new(index))),
        stopwords: Arc::new(stopwords),
        admin_token: opts.admin_token,
        maintenance: Arc::new(Mutex::new(())),
    };

    let cors = match opts.cors_allow_origin {
        Some(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        None => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .route("/stats/:stat", get(stats_handler))
        .route("/index/reload", post(index_reload))
        .route("/index/rebuild", post(index_rebuild))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());
    Ok(app)
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Json<SearchResponse> {
    let start = std::time::Instant::now();
    let index = state.current();
    let defaults = SearchConfig::default();
    let config = SearchConfig {
        k1: params.k1.unwrap_or(defaults.k1),
        b: params.b.unwrap_or(defaults.b),
        limit: params.limit.unwrap_or(defaults.limit).min(100),
    };
    let results = Searcher::new(&index, &state.stopwords, config).search(params.mode, &params.q);
    let elapsed = start.elapsed();
    Json(SearchResponse {
        query: params.q,
        mode: params.mode,
        took_s: elapsed.as_secs_f64(),
        total_hits: results.len(),
        results,
    })
}

pub async fn doc_handler(State(state): State<AppState>, Path(doc_id): Path<DocId>) -> Result<Json<Document>, ApiError> {
    state
        .current()
        .document(doc_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("document {doc_id} not found")))
}

pub async fn stats_handler(
    State(state): State<AppState>,
    Path(stat): Path<String>,
    Query(params): Query<StatParams>,
) -> Result<Json<StatResponse>, ApiError> {
    let index = state.current();
    let scorer = Scorer::new(&index);
    let doc_id = || params.doc_id.ok_or_else(|| ApiError::BadRequest(format!("{stat} needs a doc_id")));
    let value = match stat.as_str() {
        "tf" => scorer.term_frequency(doc_id()?, &params.term)? as f64,
        "idf" => scorer.inverse_document_frequency(&params.term)?,
        "tfidf" => scorer.tf_idf(doc_id()?, &params.term)?,
        "bm25idf" => scorer.bm25_idf(&params.term)?,
        "bm25tf" => {
            let defaults = SearchConfig::default();
            let config = SearchConfig {
                k1: params.k1.unwrap_or(defaults.k1),
                b: params.b.unwrap_or(defaults.b),
                ..defaults
            };
            scorer.bm25_tf(doc_id()?, &params.term, &config)?
        }
        other => return Err(ApiError::NotFound(format!("unknown statistic {other:?}"))),
    };
    Ok(Json(StatResponse { stat: stat.clone(), term: params.term.clone(), doc_id: params.doc_id, value }))
}

async fn index_reload(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<IndexSummary>, ApiError> {
    authorize(&state, &headers)?;
    run_maintenance(state, |state| {
        let index = load_index(&state.index_paths)?;
        Ok(state.publish(index))
    })
    .await
}

async fn index_rebuild(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<IndexSummary>, ApiError> {
    authorize(&state, &headers)?;
    run_maintenance(state, |state| {
        let docs = load_documents(&state.corpus)?;
        let index = InvertedIndex::build(&docs);
        save_index(&state.index_paths, &index)?;
        Ok(state.publish(index))
    })
    .await
}

/// Run blocking index work on the blocking pool under the maintenance lock.
/// Searches keep reading the previous snapshot until `publish` swaps it.
async fn run_maintenance<F>(state: AppState, work: F) -> Result<Json<IndexSummary>, ApiError>
where
    F: FnOnce(&AppState) -> search_core::Result<IndexSummary> + Send + 'static,
{
    let summary = tokio::task::spawn_blocking(move || {
        let _guard = state.maintenance.lock();
        work(&state)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("index task failed: {e}")))??;
    Ok(Json(summary))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err(ApiError::Unauthorized("ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err(ApiError::Unauthorized("invalid admin token".into()))
    }
}
