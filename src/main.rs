//! Gateway binary: wires configuration, adapters and the HTTP router.

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::EnvFilter;

use timesheet_sync::api::{AppState, StaticCallerVerifier, create_router};
use timesheet_sync::cache::{InMemoryResponseCache, RedisResponseCache, ResponseCache};
use timesheet_sync::config::ConfigLoader;
use timesheet_sync::error::{EngineError, EngineResult};
use timesheet_sync::storage::{InMemoryTotalsRepository, PostgresTotalsRepository, TotalsRepository};
use timesheet_sync::sync::SyncService;
use timesheet_sync::upstream::{EnvCredentialsProvider, HttpUpstream};

const CACHE_KEY_PREFIX: &str = "timesheet-sync";

#[tokio::main]
async fn main() -> EngineResult<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config_dir = env::var("SYNC_CONFIG_DIR").unwrap_or_else(|_| "./config/default".to_owned());
    let bind_addr = env::var("SYNC_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3002".to_owned());
    let address: SocketAddr = bind_addr.parse().map_err(|error| EngineError::Config {
        message: format!("invalid SYNC_BIND_ADDR '{bind_addr}': {error}"),
    })?;

    let loader = ConfigLoader::load(&config_dir)?;
    let config = loader.config();
    info!(config_dir = %config_dir, "Configuration loaded");

    let upstream = Arc::new(HttpUpstream::new(config.upstream())?);
    let cache = build_cache()?;
    let repository = build_repository().await?;

    let service = SyncService::new(
        config,
        upstream,
        Arc::new(EnvCredentialsProvider::default()),
        cache,
        repository,
    );
    let verifier = StaticCallerVerifier::from_config(config.access());
    let app = create_router(AppState::new(Arc::new(service), Arc::new(verifier)));

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| EngineError::Config {
            message: format!("failed to bind listener: {error}"),
        })?;

    info!(%address, "timesheet-sync listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| EngineError::Config {
            message: format!("server error: {error}"),
        })
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn optional_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn build_cache() -> EngineResult<Arc<dyn ResponseCache>> {
    match optional_env("REDIS_URL") {
        Some(redis_url) => {
            let client = redis::Client::open(redis_url).map_err(|error| EngineError::Config {
                message: format!("invalid REDIS_URL: {error}"),
            })?;
            info!("Using redis response cache");
            Ok(Arc::new(RedisResponseCache::new(client, CACHE_KEY_PREFIX)))
        }
        None => {
            info!("REDIS_URL not set, using in-process response cache");
            Ok(Arc::new(InMemoryResponseCache::new()))
        }
    }
}

async fn build_repository() -> EngineResult<Arc<dyn TotalsRepository>> {
    match optional_env("DATABASE_URL") {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(&database_url)
                .await
                .map_err(|error| EngineError::Persistence {
                    message: format!("failed to connect to database: {error}"),
                })?;
            let repository = PostgresTotalsRepository::new(pool);
            repository.migrate().await?;
            info!("Using postgres totals repository");
            Ok(Arc::new(repository))
        }
        None => {
            info!("DATABASE_URL not set, totals are kept in memory");
            Ok(Arc::new(InMemoryTotalsRepository::new()))
        }
    }
}
