use serde::{Deserialize, Serialize};

/// A cataloged track. Immutable once ingested; the engine only reads it.
///
/// Serde field names follow the upstream catalog columns so responses match
/// what the chat UI already consumes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Track {
    /// Unique track identifier (Spotify-style URI)
    #[serde(rename = "track_uri")]
    pub uri: String,
    /// Track name
    #[serde(rename = "track_name")]
    pub name: String,
    /// Primary artist name
    pub artist_name: String,
    /// Popularity score; higher is more popular
    pub popularity: i32,
}

impl Track {
    pub fn new(
        uri: impl Into<String>,
        name: impl Into<String>,
        artist_name: impl Into<String>,
        popularity: i32,
    ) -> Self {
        Self {
            uri: uri.into(),
            name: name.into(),
            artist_name: artist_name.into(),
            popularity,
        }
    }
}

/// A precomputed similarity score between two tracks.
///
/// Undirected in meaning, but the backing table may store one direction or
/// both; callers must look up both positions and dedup by the far endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityEdge {
    pub track_a: String,
    pub track_b: String,
    /// Similarity in [0, 1]; higher means more similar
    pub score: f64,
}

impl SimilarityEdge {
    pub fn new(track_a: impl Into<String>, track_b: impl Into<String>, score: f64) -> Self {
        Self {
            track_a: track_a.into(),
            track_b: track_b.into(),
            score,
        }
    }

    /// The endpoint on the far side of `uri`, or `None` when `uri` is not
    /// part of this edge.
    pub fn other_endpoint(&self, uri: &str) -> Option<&str> {
        if self.track_a == uri {
            Some(&self.track_b)
        } else if self.track_b == uri {
            Some(&self.track_a)
        } else {
            None
        }
    }
}

/// A track paired with the relevance tier it earned for the current query.
/// Only used to order disambiguation candidates; discarded after resolution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeedCandidate {
    #[serde(flatten)]
    pub track: Track,
    /// 1 = exact, 2 = prefix, 3 = fallback
    pub tier: u8,
}

/// A single ranked recommendation produced for a seed track.
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub track: Track,
    /// Unrounded similarity score; all ordering uses this value
    pub score: f64,
    /// 1-based rank within the recommended track's artist group
    pub artist_rank: u32,
}

impl Recommendation {
    /// Display-only percentage; internal ranking never uses the rounded value.
    pub fn match_percentage(&self) -> u32 {
        (self.score * 100.0).round() as u32
    }
}
