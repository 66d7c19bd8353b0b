use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};

use crate::{
    error::AppResult,
    models::{SimilarityEdge, Track},
    stores::{CatalogStore, SimilarityIndex},
};

/// Upper bound on rows fetched per candidate query; the resolver trims the
/// list further after tier assignment.
const CANDIDATE_FETCH_LIMIT: i64 = 50;

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

#[derive(Debug, FromRow)]
struct TrackRow {
    track_uri: String,
    track_name: String,
    artist_name: String,
    popularity: i32,
}

impl From<TrackRow> for Track {
    fn from(row: TrackRow) -> Self {
        Track {
            uri: row.track_uri,
            name: row.track_name,
            artist_name: row.artist_name,
            popularity: row.popularity,
        }
    }
}

#[derive(Debug, FromRow)]
struct EdgeRow {
    track_a: String,
    track_b: String,
    score: f64,
}

/// Catalog reads backed by the upstream `tracks` table
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl CatalogStore for PgCatalogStore {
    async fn find_matches<'a>(
        &self,
        track_prefix: &'a str,
        artist_filter: Option<&'a str>,
    ) -> AppResult<Vec<Track>> {
        let prefix_pattern = format!("{}%", track_prefix.to_lowercase());

        let rows: Vec<TrackRow> = match artist_filter {
            Some(artist) => {
                let contains_pattern = format!("%{}%", track_prefix.to_lowercase());
                let artist_pattern = format!("%{}%", artist.to_lowercase());
                sqlx::query_as(
                    r#"
                    SELECT track_uri, track_name, artist_name, popularity
                    FROM tracks
                    WHERE LOWER(track_name) LIKE $1
                       OR (LOWER(track_name) LIKE $2 AND LOWER(artist_name) LIKE $3)
                    ORDER BY popularity DESC
                    LIMIT $4
                    "#,
                )
                .bind(&prefix_pattern)
                .bind(&contains_pattern)
                .bind(&artist_pattern)
                .bind(CANDIDATE_FETCH_LIMIT)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(
                    r#"
                    SELECT track_uri, track_name, artist_name, popularity
                    FROM tracks
                    WHERE LOWER(track_name) LIKE $1
                    ORDER BY popularity DESC
                    LIMIT $2
                    "#,
                )
                .bind(&prefix_pattern)
                .bind(CANDIDATE_FETCH_LIMIT)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows.into_iter().map(Track::from).collect())
    }

    async fn get_by_uri(&self, uri: &str) -> AppResult<Option<Track>> {
        let row: Option<TrackRow> = sqlx::query_as(
            r#"
            SELECT track_uri, track_name, artist_name, popularity
            FROM tracks
            WHERE track_uri = $1
            "#,
        )
        .bind(uri)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Track::from))
    }
}

/// Similarity reads backed by the upstream `track_similarity` table
///
/// The upstream generation process does not guarantee that edges are
/// pre-expanded for both directions, so the query matches either position.
pub struct PgSimilarityIndex {
    pool: PgPool,
}

impl PgSimilarityIndex {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl SimilarityIndex for PgSimilarityIndex {
    async fn edges_for(&self, uri: &str) -> AppResult<Vec<SimilarityEdge>> {
        let rows: Vec<EdgeRow> = sqlx::query_as(
            r#"
            SELECT track_a, track_b, score
            FROM track_similarity
            WHERE track_a = $1 OR track_b = $1
            ORDER BY score DESC
            "#,
        )
        .bind(uri)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| SimilarityEdge::new(row.track_a, row.track_b, row.score))
            .collect())
    }
}
