use std::sync::Arc;

use movie_explorer::{
    api::{create_router, AppState},
    config::{Config, StoreBackend},
    db::{create_pool, create_redis_client, DocumentStore, MemoryStore, PostgresStore, RedisStore},
    services::{MetadataSource, TmdbClient},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("movie_explorer=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let store = connect_store(&config).await?;
    tracing::info!(store = store.name(), "Document store ready");

    let metadata: Arc<dyn MetadataSource> = Arc::new(TmdbClient::new(
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
        config.tmdb_language.clone(),
    ));

    let state = AppState::new(store, metadata, config.read_failure_policy);
    let app = create_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(address = %address, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

async fn connect_store(config: &Config) -> anyhow::Result<Arc<dyn DocumentStore>> {
    let store: Arc<dyn DocumentStore> = match config.store_backend {
        StoreBackend::Postgres => {
            let pool = create_pool(&config.database_url).await?;
            sqlx::migrate!("./migrations").run(&pool).await?;
            Arc::new(PostgresStore::new(pool))
        }
        StoreBackend::Redis => {
            let client = create_redis_client(&config.redis_url)?;
            Arc::new(RedisStore::connect(client).await?)
        }
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; documents are lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    Ok(store)
}
