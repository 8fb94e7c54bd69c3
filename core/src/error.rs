use std::path::PathBuf;

pub type Result<T, E = SearchError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// A single-term statistic was asked for something that is not one term.
    #[error("term {term:?} must reduce to exactly one token, got {tokens}")]
    InvalidInput { term: String, tokens: usize },

    #[error("term {0:?} is not in the index")]
    UnknownTerm(String),

    #[error("no index found in {}; run `build` first", root.display())]
    IndexNotBuilt { root: PathBuf },

    #[error("index in {} is incomplete: {missing}", root.display())]
    IncompleteIndex { root: PathBuf, missing: String },

    #[error("failed to read corpus file {}: {source}", path.display())]
    Corpus {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Encode(#[from] bincode::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("failed to format index timestamp: {0}")]
    Timestamp(#[from] time::error::Format),
}
