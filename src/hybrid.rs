//! Hybrid lexical + semantic ranking.
//!
//! Every corpus item gets a lexical title-match score (bidirectional
//! case-insensitive substring containment, 1.0 or 0.0) and a semantic
//! cosine score against the query embedding, blended into a composite.
//! Items below the semantic threshold with no lexical match are gated
//! out.
//!
//! When nothing qualifies but the corpus is non-empty, the ranker falls
//! back to the most recently created items so the caller never shows an
//! empty screen over existing content. Fallback results keep their
//! recency order and are tagged as such.

use crate::content::ContentItem;
use crate::similarity::cosine;

/// Composite score weights. Tunable policy, stable within this
/// implementation; ordering (not exact values) is what callers may
/// rely on.
pub const SEMANTIC_WEIGHT: f32 = 0.7;
pub const LEXICAL_WEIGHT: f32 = 0.3;

/// One ranked corpus item with its score breakdown.
#[derive(Debug, Clone)]
pub struct RankedResult {
    pub item: ContentItem,
    pub lexical_score: f32,
    pub semantic_score: f32,
    pub composite_score: f32,
}

/// Ranked (or fallback) search results.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub results: Vec<RankedResult>,
    /// True when no item qualified and the recency fallback was used.
    pub fallback: bool,
}

/// Rank `corpus` against a query.
///
/// Items without an embedding score 0.0 semantically but still qualify
/// through a lexical match. Results are truncated to `limit` and
/// ordered descending by composite score, ties broken newest-first;
/// fallback results keep pure recency order instead.
pub fn rank(
    query: &str,
    query_embedding: &[f32],
    corpus: &[ContentItem],
    threshold: f32,
    limit: usize,
) -> SearchOutcome {
    let mut qualifying: Vec<RankedResult> = Vec::new();

    for item in corpus {
        let lexical_score = lexical_match(query, &item.title);
        let semantic_score = item
            .embedding
            .as_deref()
            .map(|e| cosine(query_embedding, e))
            .unwrap_or(0.0);

        if semantic_score >= threshold || lexical_score > 0.0 {
            qualifying.push(RankedResult {
                item: item.clone(),
                lexical_score,
                semantic_score,
                composite_score: SEMANTIC_WEIGHT * semantic_score
                    + LEXICAL_WEIGHT * lexical_score,
            });
        }
    }

    if qualifying.is_empty() && !corpus.is_empty() {
        log::debug!(
            "No items qualified (threshold {}), returning recency fallback",
            threshold
        );
        return SearchOutcome {
            results: recency_fallback(query, query_embedding, corpus, limit),
            fallback: true,
        };
    }

    qualifying.sort_by(|a, b| {
        b.composite_score
            .partial_cmp(&a.composite_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.item.created_at.cmp(&a.item.created_at))
    });
    qualifying.truncate(limit);

    SearchOutcome {
        results: qualifying,
        fallback: false,
    }
}

/// Bidirectional case-insensitive substring containment between query
/// and title. Boolean-derived, not a distance: 1.0 or 0.0. Blank
/// strings never match.
fn lexical_match(query: &str, title: &str) -> f32 {
    let query = query.trim().to_lowercase();
    let title = title.trim().to_lowercase();

    if query.is_empty() || title.is_empty() {
        return 0.0;
    }

    if title.contains(&query) || query.contains(&title) {
        1.0
    } else {
        0.0
    }
}

/// The `limit` most recently created items in recency order, with their
/// (sub-threshold) scores attached for transparency.
fn recency_fallback(
    query: &str,
    query_embedding: &[f32],
    corpus: &[ContentItem],
    limit: usize,
) -> Vec<RankedResult> {
    let mut recent: Vec<&ContentItem> = corpus.iter().collect();
    recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    recent
        .into_iter()
        .take(limit)
        .map(|item| {
            let lexical_score = lexical_match(query, &item.title);
            let semantic_score = item
                .embedding
                .as_deref()
                .map(|e| cosine(query_embedding, e))
                .unwrap_or(0.0);
            RankedResult {
                item: item.clone(),
                lexical_score,
                semantic_score,
                composite_score: SEMANTIC_WEIGHT * semantic_score
                    + LEXICAL_WEIGHT * lexical_score,
            }
        })
        .collect()
}
