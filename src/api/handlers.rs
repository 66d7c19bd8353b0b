use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::AppResult;
use crate::models::{Recommendation, SeedCandidate, Track};

use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct TrackQueryParams {
    pub track: String,
    pub artist: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub candidates: Vec<SeedCandidate>,
}

/// One recommended track, with field names the chat UI renders directly.
#[derive(Debug, Serialize)]
pub struct RecommendedTrack {
    pub recommended_uri: String,
    pub recommended_track: String,
    pub recommended_artist: String,
    pub match_percentage: u32,
    pub artist_rank: u32,
}

impl From<&Recommendation> for RecommendedTrack {
    fn from(rec: &Recommendation) -> Self {
        Self {
            recommended_uri: rec.track.uri.clone(),
            recommended_track: rec.track.name.clone(),
            recommended_artist: rec.track.artist_name.clone(),
            match_percentage: rec.match_percentage(),
            artist_rank: rec.artist_rank,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub seed: Track,
    pub results: Vec<RecommendedTrack>,
}

// Handlers

/// Liveness probe
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

/// Disambiguation search endpoint; an empty candidate array is a valid
/// response, not an error.
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<TrackQueryParams>,
) -> AppResult<Json<SearchResponse>> {
    let candidates = state
        .recommender
        .search(&params.track, params.artist.as_deref())
        .await?;
    Ok(Json(SearchResponse { candidates }))
}

/// Recommendation endpoint: resolves the seed, then returns the ranked list.
/// Ambiguous and not-found outcomes render as structured errors.
pub async fn recommend(
    State(state): State<AppState>,
    Query(params): Query<TrackQueryParams>,
) -> AppResult<Json<RecommendResponse>> {
    let set = state
        .recommender
        .recommend(&params.track, params.artist.as_deref())
        .await?;

    let results = set.results.iter().map(RecommendedTrack::from).collect();
    Ok(Json(RecommendResponse {
        seed: set.seed,
        results,
    }))
}
