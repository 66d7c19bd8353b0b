use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::{
    error::{AppError, AppResult},
    models::{Recommendation, SeedCandidate, Track},
    services::{ranker::RecommendationRanker, resolver, resolver::TrackQuery},
    stores::{CatalogStore, SimilarityIndex},
};

/// Tunables for the recommendation engine
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Maximum seed candidates returned by search (N)
    pub search_limit: usize,
    /// Maximum recommendations per request (M)
    pub max_results: usize,
    /// Maximum recommendations per artist (K, the diversity cap)
    pub artist_cap: usize,
    /// Request-scoped deadline applied to each store lookup
    pub lookup_timeout: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            search_limit: 5,
            max_results: 10,
            artist_cap: 3,
            lookup_timeout: Duration::from_secs(2),
        }
    }
}

/// A served recommendation list: the resolved seed plus its ranked results.
/// `results` may be empty; a seed with no similarity edges is a valid
/// outcome, not an error.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationSet {
    pub seed: Track,
    pub results: Vec<Recommendation>,
}

/// The query façade: composes the seed resolver and the recommendation
/// ranker over the read-only stores. Stateless; every request computes
/// independently, so instances are freely shared across tasks.
pub struct Recommender {
    catalog: Arc<dyn CatalogStore>,
    index: Arc<dyn SimilarityIndex>,
    settings: EngineSettings,
}

impl Recommender {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        index: Arc<dyn SimilarityIndex>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            catalog,
            index,
            settings,
        }
    }

    /// Disambiguation search: the ordered candidate list, which may be empty
    /// or hold several tracks. Choosing among them is the caller's job.
    pub async fn search(&self, track: &str, artist: Option<&str>) -> AppResult<Vec<SeedCandidate>> {
        let query = TrackQuery::parse(track, artist)?;
        let candidates = self.find_candidates(&query).await?;

        tracing::debug!(
            track = %query.track,
            candidates = candidates.len(),
            "search produced candidates"
        );
        Ok(candidates)
    }

    /// Resolves the query to a single seed and ranks its similarity edges.
    /// Surfaces `Ambiguous` with the candidate list when the query does not
    /// pin down one track, and `NotFound` when nothing matches.
    pub async fn recommend(
        &self,
        track: &str,
        artist: Option<&str>,
    ) -> AppResult<RecommendationSet> {
        let query = TrackQuery::parse(track, artist)?;
        let candidates = self.find_candidates(&query).await?;
        let seed = resolver::resolve_seed(candidates, &query)?;

        let edges = self
            .with_deadline("similarity_lookup", self.index.edges_for(&seed.uri))
            .await?;

        let ranker = RecommendationRanker::new(self.settings.artist_cap, self.settings.max_results);
        let results = self
            .with_deadline("catalog_join", ranker.rank(&seed, edges, self.catalog.as_ref()))
            .await?;

        tracing::info!(
            seed = %seed.uri,
            results = results.len(),
            "recommendation request served"
        );
        Ok(RecommendationSet { seed, results })
    }

    async fn find_candidates(&self, query: &TrackQuery) -> AppResult<Vec<SeedCandidate>> {
        let matches = self
            .with_deadline(
                "catalog_search",
                self.catalog
                    .find_matches(&query.track, query.artist.as_deref()),
            )
            .await?;
        Ok(resolver::rank_candidates(
            matches,
            query,
            self.settings.search_limit,
        ))
    }

    /// Applies the request-scoped deadline to one store lookup. An elapsed
    /// deadline surfaces as a retryable upstream failure; it is never
    /// swallowed or retried here.
    async fn with_deadline<T, F>(&self, operation: &'static str, fut: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        match tokio::time::timeout(self.settings.lookup_timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::error!(operation, "store lookup exceeded deadline");
                Err(AppError::Timeout(self.settings.lookup_timeout))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SimilarityEdge;
    use crate::stores::{
        MemoryCatalog, MemoryIndex, MockCatalogStore, MockSimilarityIndex,
    };

    fn engine(catalog: impl CatalogStore + 'static, index: impl SimilarityIndex + 'static) -> Recommender {
        Recommender::new(Arc::new(catalog), Arc::new(index), EngineSettings::default())
    }

    fn seeded_catalog() -> MemoryCatalog {
        MemoryCatalog::default()
            .with_track(Track::new("t1", "Hey Jude", "The Beatles", 82))
            .with_track(Track::new("t2", "Let It Be", "The Beatles", 80))
            .with_track(Track::new("y1", "Yesterday", "The Beatles", 74))
            .with_track(Track::new("y2", "Yesterday", "Leona Lewis", 60))
    }

    #[tokio::test]
    async fn test_search_empty_track_is_invalid_input() {
        let rec = engine(MemoryCatalog::default(), MemoryIndex::default());
        let err = rec.search("   ", None).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_search_no_match_returns_empty_list() {
        let rec = engine(seeded_catalog(), MemoryIndex::default());
        let candidates = rec.search("Purple Rain", None).await.unwrap();
        assert!(candidates.is_empty());
    }

    #[tokio::test]
    async fn test_recommend_resolves_seed_and_ranks() {
        let index = MemoryIndex::default()
            .with_edge(SimilarityEdge::new("t1", "t2", 0.9))
            .with_edge(SimilarityEdge::new("t1", "y1", 0.7));
        let rec = engine(seeded_catalog(), index);

        let set = rec.recommend("Hey Jude", None).await.unwrap();
        assert_eq!(set.seed.uri, "t1");
        assert_eq!(set.results.len(), 2);
        assert_eq!(set.results[0].track.uri, "t2");
    }

    #[tokio::test]
    async fn test_recommend_ambiguous_query_lists_candidates() {
        let rec = engine(seeded_catalog(), MemoryIndex::default());
        let err = rec.recommend("Yesterday", None).await.unwrap_err();

        match err {
            AppError::Ambiguous { candidates } => {
                assert_eq!(candidates.len(), 2);
                // Popularity descending within the exact tier
                assert_eq!(candidates[0].track.uri, "y1");
            }
            other => panic!("expected Ambiguous, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_recommend_unknown_track_is_not_found() {
        let rec = engine(seeded_catalog(), MemoryIndex::default());
        let err = rec.recommend("Purple Rain", None).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_recommend_seed_without_edges_is_empty_result() {
        let rec = engine(seeded_catalog(), MemoryIndex::default());
        let set = rec.recommend("Hey Jude", None).await.unwrap();
        assert_eq!(set.seed.uri, "t1");
        assert!(set.results.is_empty());
    }

    #[tokio::test]
    async fn test_upstream_store_error_propagates() {
        let mut catalog = MockCatalogStore::new();
        catalog
            .expect_find_matches()
            .returning(|_, _| Err(AppError::Upstream(sqlx::Error::PoolTimedOut)));
        let rec = engine(catalog, MockSimilarityIndex::new());

        let err = rec.search("Hey Jude", None).await.unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));
    }

    #[tokio::test]
    async fn test_slow_similarity_lookup_hits_deadline() {
        struct SlowIndex;

        #[async_trait::async_trait]
        impl SimilarityIndex for SlowIndex {
            async fn edges_for(&self, _uri: &str) -> AppResult<Vec<SimilarityEdge>> {
                tokio::time::sleep(Duration::from_millis(100)).await;
                Ok(vec![])
            }
        }

        let settings = EngineSettings {
            lookup_timeout: Duration::from_millis(10),
            ..EngineSettings::default()
        };
        let rec = Recommender::new(Arc::new(seeded_catalog()), Arc::new(SlowIndex), settings);

        let err = rec.recommend("Hey Jude", None).await.unwrap_err();
        assert!(matches!(err, AppError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_recommend_is_idempotent_against_unchanged_stores() {
        let index = MemoryIndex::default()
            .with_edge(SimilarityEdge::new("t1", "t2", 0.9))
            .with_edge(SimilarityEdge::new("t1", "y1", 0.7));
        let rec = engine(seeded_catalog(), index);

        let first = rec.recommend("Hey Jude", None).await.unwrap();
        let second = rec.recommend("Hey Jude", None).await.unwrap();
        assert_eq!(first, second);
    }
}
