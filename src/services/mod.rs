pub mod engine;
pub mod ranker;
pub mod resolver;

pub use engine::{EngineSettings, RecommendationSet, Recommender};
pub use ranker::RecommendationRanker;
pub use resolver::TrackQuery;
