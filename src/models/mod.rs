pub mod track;

pub use track::{Recommendation, SeedCandidate, SimilarityEdge, Track};

// Relevance tiers of a seed candidate; lower is better.
pub const TIER_EXACT: u8 = 1;
pub const TIER_PREFIX: u8 = 2;
pub const TIER_FALLBACK: u8 = 3;
