use crate::{
    error::{AppError, AppResult},
    models::{SeedCandidate, Track, TIER_EXACT, TIER_FALLBACK, TIER_PREFIX},
};

/// A validated, normalized search query.
#[derive(Debug, Clone)]
pub struct TrackQuery {
    /// Trimmed track name query, as entered
    pub track: String,
    /// Trimmed artist name query, when supplied
    pub artist: Option<String>,
    track_norm: String,
    artist_norm: Option<String>,
}

impl TrackQuery {
    /// Validates the raw query strings. The track query must be non-empty
    /// after trimming; a blank artist is treated as absent.
    pub fn parse(track: &str, artist: Option<&str>) -> AppResult<Self> {
        let track = track.trim();
        if track.is_empty() {
            return Err(AppError::InvalidInput(
                "track query must not be empty".to_string(),
            ));
        }
        let artist = artist.map(str::trim).filter(|a| !a.is_empty());

        Ok(Self {
            track: track.to_string(),
            artist: artist.map(str::to_string),
            track_norm: track.to_lowercase(),
            artist_norm: artist.map(str::to_lowercase),
        })
    }
}

/// The tiered relevance policy, as an ordered rule table.
///
/// Rules are tried in order and the first hit decides the tier; reordering
/// or adding a tier is a table edit, not a logic change. A track matching no
/// rule is dropped from the candidate list.
const TIER_RULES: &[(u8, fn(&TrackQuery, &Track) -> bool)] = &[
    (TIER_EXACT, exact_match),
    (TIER_PREFIX, prefix_match),
    (TIER_FALLBACK, fallback_match),
];

/// Normalized track name equals the query, and the artist matches exactly
/// when one was supplied.
fn exact_match(query: &TrackQuery, track: &Track) -> bool {
    track.name.trim().to_lowercase() == query.track_norm
        && match &query.artist_norm {
            Some(artist) => track.artist_name.trim().to_lowercase() == *artist,
            None => true,
        }
}

/// Normalized track name starts with the query.
fn prefix_match(query: &TrackQuery, track: &Track) -> bool {
    track.name.to_lowercase().starts_with(&query.track_norm)
}

/// Substring containment on track name, or on artist name when an artist
/// query was supplied.
fn fallback_match(query: &TrackQuery, track: &Track) -> bool {
    track.name.to_lowercase().contains(&query.track_norm)
        || query
            .artist_norm
            .as_ref()
            .is_some_and(|artist| track.artist_name.to_lowercase().contains(artist))
}

fn assign_tier(query: &TrackQuery, track: &Track) -> Option<u8> {
    TIER_RULES
        .iter()
        .find(|(_, rule)| rule(query, track))
        .map(|(tier, _)| *tier)
}

/// Tier-assigns and orders catalog matches for a query.
///
/// Candidates sort by (tier ascending, popularity descending, uri ascending)
/// and are truncated to `limit`. An empty result is a valid outcome, not an
/// error.
pub fn rank_candidates(matches: Vec<Track>, query: &TrackQuery, limit: usize) -> Vec<SeedCandidate> {
    let mut candidates: Vec<SeedCandidate> = matches
        .into_iter()
        .filter_map(|track| {
            assign_tier(query, &track).map(|tier| SeedCandidate { track, tier })
        })
        .collect();

    candidates.sort_by(|a, b| {
        a.tier
            .cmp(&b.tier)
            .then_with(|| b.track.popularity.cmp(&a.track.popularity))
            .then_with(|| a.track.uri.cmp(&b.track.uri))
    });
    candidates.truncate(limit);
    candidates
}

/// Picks the single seed track from an ordered candidate list.
///
/// Exactly one exact match wins outright. Multiple exact matches need the
/// caller to re-prompt, as does any lower-tier spread of two or more; a
/// lone surviving candidate resolves even without an exact match.
pub fn resolve_seed(mut candidates: Vec<SeedCandidate>, query: &TrackQuery) -> AppResult<Track> {
    if candidates.is_empty() {
        return Err(AppError::NotFound(format!(
            "no track matching '{}'",
            query.track
        )));
    }

    let exact_count = candidates.iter().filter(|c| c.tier == TIER_EXACT).count();
    if exact_count > 1 || (exact_count == 0 && candidates.len() > 1) {
        return Err(AppError::Ambiguous { candidates });
    }

    // Exact candidates sort first, so the winner leads the list.
    Ok(candidates.swap_remove(0).track)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(track: &str, artist: Option<&str>) -> TrackQuery {
        TrackQuery::parse(track, artist).unwrap()
    }

    fn beatles_catalog() -> Vec<Track> {
        vec![
            Track::new("t1", "Hey Jude", "The Beatles", 82),
            Track::new("t2", "Hey Jude - Remastered", "The Beatles", 75),
            Track::new("t3", "Hey Jude", "Joe Cocker", 50),
        ]
    }

    #[test]
    fn test_parse_rejects_blank_track() {
        assert!(TrackQuery::parse("   ", None).is_err());
    }

    #[test]
    fn test_parse_treats_blank_artist_as_absent() {
        let q = query("Hey Jude", Some("  "));
        assert!(q.artist.is_none());
    }

    #[test]
    fn test_exact_match_is_case_insensitive_and_trimmed() {
        let q = query("  hey jude  ", None);
        assert_eq!(
            assign_tier(&q, &Track::new("t1", "Hey Jude", "The Beatles", 82)),
            Some(TIER_EXACT)
        );
    }

    #[test]
    fn test_exact_requires_artist_match_when_supplied() {
        let q = query("Hey Jude", Some("Joe Cocker"));
        let track = Track::new("t1", "Hey Jude", "The Beatles", 82);
        // Name is exact, artist is not: falls through to the prefix rule.
        assert_eq!(assign_tier(&q, &track), Some(TIER_PREFIX));
    }

    #[test]
    fn test_fallback_tier_for_substring_matches() {
        let q = query("jude", Some("beatles"));
        let track = Track::new("t1", "Hey Jude", "The Beatles", 82);
        assert_eq!(assign_tier(&q, &track), Some(TIER_FALLBACK));
    }

    #[test]
    fn test_unique_exact_match_ranks_first() {
        let q = query("hey jude", Some("The Beatles"));
        let candidates = rank_candidates(beatles_catalog(), &q, 5);

        assert_eq!(candidates[0].track.uri, "t1");
        assert_eq!(candidates[0].tier, TIER_EXACT);
    }

    #[test]
    fn test_candidates_sorted_by_tier_then_popularity() {
        let q = query("hey jude", None);
        let candidates = rank_candidates(beatles_catalog(), &q, 5);

        let order: Vec<&str> = candidates.iter().map(|c| c.track.uri.as_str()).collect();
        // Two exact (by popularity), then the remastered prefix match.
        assert_eq!(order, vec!["t1", "t3", "t2"]);
        assert_eq!(candidates[2].tier, TIER_PREFIX);
    }

    #[test]
    fn test_candidate_list_truncated_to_limit() {
        let tracks: Vec<Track> = (0..20)
            .map(|i| Track::new(format!("t{i:02}"), format!("Song {i}"), "Artist", i))
            .collect();
        let q = query("Song", None);
        assert_eq!(rank_candidates(tracks, &q, 5).len(), 5);
    }

    #[test]
    fn test_no_matches_is_empty_not_error() {
        let q = query("Purple Rain", None);
        assert!(rank_candidates(beatles_catalog(), &q, 5).is_empty());
    }

    #[test]
    fn test_resolve_single_exact_match() {
        let q = query("hey jude", Some("The Beatles"));
        let candidates = rank_candidates(beatles_catalog(), &q, 5);
        let seed = resolve_seed(candidates, &q).unwrap();
        assert_eq!(seed.uri, "t1");
    }

    #[test]
    fn test_resolve_multiple_exact_matches_is_ambiguous() {
        let q = query("hey jude", None);
        let candidates = rank_candidates(beatles_catalog(), &q, 5);
        let err = resolve_seed(candidates, &q).unwrap_err();
        match err {
            AppError::Ambiguous { candidates } => {
                assert!(candidates.iter().any(|c| c.track.uri == "t1"));
                assert!(candidates.iter().any(|c| c.track.uri == "t3"));
            }
            other => panic!("expected Ambiguous, got {other:?}"),
        }
    }

    #[test]
    fn test_resolve_no_candidates_is_not_found() {
        let q = query("Purple Rain", None);
        let err = resolve_seed(vec![], &q).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_resolve_lone_prefix_candidate_wins() {
        let q = query("hey jude - rem", None);
        let candidates = rank_candidates(beatles_catalog(), &q, 5);
        assert_eq!(candidates.len(), 1);
        let seed = resolve_seed(candidates, &q).unwrap();
        assert_eq!(seed.uri, "t2");
    }
}
