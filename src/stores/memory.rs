use crate::{
    error::AppResult,
    models::{SimilarityEdge, Track},
    stores::{CatalogStore, SimilarityIndex},
};

/// In-memory catalog mirroring the Postgres matching semantics.
///
/// Used by tests and by anything that wants the engine without a database.
#[derive(Debug, Default, Clone)]
pub struct MemoryCatalog {
    tracks: Vec<Track>,
}

impl MemoryCatalog {
    pub fn new(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }

    pub fn with_track(mut self, track: Track) -> Self {
        self.tracks.push(track);
        self
    }
}

#[async_trait::async_trait]
impl CatalogStore for MemoryCatalog {
    async fn find_matches<'a>(
        &self,
        track_prefix: &'a str,
        artist_filter: Option<&'a str>,
    ) -> AppResult<Vec<Track>> {
        let track_q = track_prefix.to_lowercase();
        let artist_q = artist_filter.map(str::to_lowercase);

        let mut matches: Vec<Track> = self
            .tracks
            .iter()
            .filter(|t| {
                let name = t.name.to_lowercase();
                if name.starts_with(&track_q) {
                    return true;
                }
                match &artist_q {
                    Some(artist) => {
                        name.contains(&track_q)
                            && t.artist_name.to_lowercase().contains(artist)
                    }
                    None => false,
                }
            })
            .cloned()
            .collect();

        matches.sort_by(|a, b| b.popularity.cmp(&a.popularity));
        Ok(matches)
    }

    async fn get_by_uri(&self, uri: &str) -> AppResult<Option<Track>> {
        Ok(self.tracks.iter().find(|t| t.uri == uri).cloned())
    }
}

/// In-memory similarity index. Edges are returned for either endpoint, same
/// as the Postgres query.
#[derive(Debug, Default, Clone)]
pub struct MemoryIndex {
    edges: Vec<SimilarityEdge>,
}

impl MemoryIndex {
    pub fn new(edges: Vec<SimilarityEdge>) -> Self {
        Self { edges }
    }

    pub fn with_edge(mut self, edge: SimilarityEdge) -> Self {
        self.edges.push(edge);
        self
    }
}

#[async_trait::async_trait]
impl SimilarityIndex for MemoryIndex {
    async fn edges_for(&self, uri: &str) -> AppResult<Vec<SimilarityEdge>> {
        Ok(self
            .edges
            .iter()
            .filter(|e| e.track_a == uri || e.track_b == uri)
            .cloned()
            .collect())
    }
}
