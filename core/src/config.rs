//! Query-time tuning knobs.
//!
//! Values travel with each call rather than living in globals, so two callers
//! can score the same loaded index with different parameters.

use serde::{Deserialize, Serialize};

/// BM25 term frequency saturation.
pub const DEFAULT_K1: f64 = 1.5;
/// BM25 document length normalization. Accepted but not applied yet, see
/// [`crate::scoring::Scorer::bm25_tf`].
pub const DEFAULT_B: f64 = 0.75;
pub const DEFAULT_SEARCH_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub k1: f64,
    pub b: f64,
    pub limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { k1: DEFAULT_K1, b: DEFAULT_B, limit: DEFAULT_SEARCH_LIMIT }
    }
}

impl SearchConfig {
    pub fn with_limit(self, limit: usize) -> Self {
        Self { limit, ..self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let cfg: SearchConfig = serde_json::from_str(r#"{"k1": 2.0}"#).unwrap();
        assert_eq!(cfg.k1, 2.0);
        assert_eq!(cfg.b, DEFAULT_B);
        assert_eq!(cfg.limit, DEFAULT_SEARCH_LIMIT);
    }
}
