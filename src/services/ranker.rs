use std::cmp::Ordering;
use std::collections::HashMap;

use crate::{
    error::AppResult,
    models::{Recommendation, SimilarityEdge, Track},
    stores::CatalogStore,
};

/// Ranks similarity edges for a seed into the final recommendation list.
///
/// Two-phase sort: per-artist grouping with a top-K cap first, then a global
/// re-sort of the survivors, so the diversity rule and the tie-breaks stay
/// auditable in isolation.
pub struct RecommendationRanker {
    artist_cap: usize,
    max_results: usize,
}

/// Shared tie-break key: score descending, then popularity descending, then
/// URI ascending for determinism. Comparisons always use the unrounded score.
fn rank_order(a_track: &Track, a_score: f64, b_track: &Track, b_score: f64) -> Ordering {
    b_score
        .partial_cmp(&a_score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| b_track.popularity.cmp(&a_track.popularity))
        .then_with(|| a_track.uri.cmp(&b_track.uri))
}

impl RecommendationRanker {
    pub fn new(artist_cap: usize, max_results: usize) -> Self {
        Self {
            artist_cap,
            max_results,
        }
    }

    /// Produces at most `max_results` recommendations for `seed`, with at
    /// most `artist_cap` tracks per artist. Zero incident edges yield an
    /// empty list, a valid "nothing similar on record" outcome.
    pub async fn rank(
        &self,
        seed: &Track,
        edges: Vec<SimilarityEdge>,
        catalog: &dyn CatalogStore,
    ) -> AppResult<Vec<Recommendation>> {
        // Dedup by the far endpoint; the table may hold both directions, so
        // keep the higher score. Self-similarity is excluded outright.
        let mut best_score: HashMap<String, f64> = HashMap::new();
        for edge in edges {
            let Some(other) = edge.other_endpoint(&seed.uri) else {
                tracing::warn!(
                    seed = %seed.uri,
                    track_a = %edge.track_a,
                    track_b = %edge.track_b,
                    "similarity edge does not touch the seed; skipping"
                );
                continue;
            };
            if other == seed.uri {
                continue;
            }
            let entry = best_score.entry(other.to_string()).or_insert(edge.score);
            if edge.score > *entry {
                *entry = edge.score;
            }
        }

        // Sorted for a deterministic catalog join order.
        let mut neighbors: Vec<(String, f64)> = best_score.into_iter().collect();
        neighbors.sort_by(|a, b| a.0.cmp(&b.0));

        // Join against the catalog. An edge pointing at a URI with no
        // catalog record is a broken reference: log and skip, never fail
        // the request over it.
        let mut scored: Vec<(Track, f64)> = Vec::with_capacity(neighbors.len());
        for (uri, score) in neighbors {
            match catalog.get_by_uri(&uri).await? {
                Some(track) => scored.push((track, score)),
                None => {
                    tracing::warn!(
                        seed = %seed.uri,
                        missing = %uri,
                        "similarity edge references a track absent from the catalog; skipping"
                    );
                }
            }
        }

        // Per-artist top-K, so one prolific artist cannot flood the list.
        let mut by_artist: HashMap<String, Vec<(Track, f64)>> = HashMap::new();
        for (track, score) in scored {
            by_artist
                .entry(track.artist_name.clone())
                .or_default()
                .push((track, score));
        }

        let mut merged: Vec<Recommendation> = Vec::new();
        for mut group in by_artist.into_values() {
            group.sort_by(|a, b| rank_order(&a.0, a.1, &b.0, b.1));
            group.truncate(self.artist_cap);
            for (idx, (track, score)) in group.into_iter().enumerate() {
                merged.push(Recommendation {
                    track,
                    score,
                    artist_rank: idx as u32 + 1,
                });
            }
        }

        // Global re-sort of the capped survivors, same tie-break key.
        merged.sort_by(|a, b| rank_order(&a.track, a.score, &b.track, b.score));
        merged.truncate(self.max_results);

        tracing::debug!(
            seed = %seed.uri,
            results = merged.len(),
            "ranked recommendations"
        );

        Ok(merged)
    }
}
