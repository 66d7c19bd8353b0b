/// Read-only data-access contracts
///
/// The catalog and the similarity index are owned and written by an upstream
/// ingestion pipeline; the engine only ever reads them. Both contracts are
/// traits so the engine runs against Postgres in production and against
/// in-memory fixtures (or mockall mocks) in tests.
use crate::{
    error::AppResult,
    models::{SimilarityEdge, Track},
};

pub mod memory;
pub mod postgres;

pub use memory::{MemoryCatalog, MemoryIndex};
pub use postgres::{create_pool, PgCatalogStore, PgSimilarityIndex};

/// Read contract against the track catalog
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync {
    /// Tracks satisfying the containment predicate: track name starts with
    /// `track_prefix` (case-insensitive), or, when `artist_filter` is given,
    /// track name and artist name both contain their query as a substring.
    async fn find_matches<'a>(
        &self,
        track_prefix: &'a str,
        artist_filter: Option<&'a str>,
    ) -> AppResult<Vec<Track>>;

    /// Single track lookup by URI
    async fn get_by_uri(&self, uri: &str) -> AppResult<Option<Track>>;
}

/// Read contract against the precomputed similarity index
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SimilarityIndex: Send + Sync {
    /// All edges with `uri` in either position. The table's directionality
    /// is not guaranteed, so callers dedup by the far endpoint themselves.
    async fn edges_for(&self, uri: &str) -> AppResult<Vec<SimilarityEdge>>;
}
