use std::sync::Arc;

use crate::services::Recommender;

/// Shared application state
///
/// The engine is stateless and read-only against its stores, so a single
/// shared instance serves all requests concurrently without locking.
#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<Recommender>,
}

impl AppState {
    pub fn new(recommender: Recommender) -> Self {
        Self {
            recommender: Arc::new(recommender),
        }
    }
}
