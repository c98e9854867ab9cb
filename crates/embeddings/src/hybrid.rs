//! Hybrid ranking: semantic similarity boosted by exact keyword matches.

use std::collections::HashSet;

use crate::{
    error::Result,
    search::{SearchResult, VectorSearch, normalize_limit, sort_by_similarity},
};

/// Multiplier applied to the score of a result that also matched by keyword.
pub const KEYWORD_BOOST: f32 = 1.2;

/// Boost every result whose slug is in `keyword_matches`, clamp to 1.0,
/// re-sort and keep the top `limit`. Among equal scores, keyword matches
/// come first.
///
/// Only positive scores are multiplied; scaling a negative score would push
/// a keyword match below an unmatched result with the same similarity.
pub fn boost_keyword_matches(
    mut results: Vec<SearchResult>,
    keyword_matches: &HashSet<String>,
    limit: usize,
) -> Vec<SearchResult> {
    for result in &mut results {
        if result.similarity > 0.0 && keyword_matches.contains(&result.slug) {
            result.similarity = (result.similarity * KEYWORD_BOOST).min(1.0);
        }
    }
    // Both sorts are stable.
    results.sort_by_key(|r| !keyword_matches.contains(&r.slug));
    sort_by_similarity(&mut results);
    results.truncate(limit);
    results
}

impl VectorSearch {
    /// Semantic search over a `2 × limit` candidate pool, then keyword boosting.
    pub async fn hybrid_search(
        &self,
        query: &[f32],
        keyword_matches: &HashSet<String>,
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        let limit = normalize_limit(limit);
        let candidates = self.search(query, limit.saturating_mul(2)).await?;
        Ok(boost_keyword_matches(candidates, keyword_matches, limit))
    }
}
