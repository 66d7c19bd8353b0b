use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use curtify_api::api::{create_router, AppState};
use curtify_api::config::Config;
use curtify_api::services::Recommender;
use curtify_api::stores::{create_pool, PgCatalogStore, PgSimilarityIndex};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    let catalog = Arc::new(PgCatalogStore::new(pool.clone()));
    let index = Arc::new(PgSimilarityIndex::new(pool));

    let recommender = Recommender::new(catalog, index, config.engine_settings());
    let state = AppState::new(recommender);
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "recommendation engine listening");
    axum::serve(listener, app).await?;

    Ok(())
}
