//! # Textboard Binary
//!
//! The entry point that assembles the application based on compile-time
//! features and the loaded configuration.

mod telemetry;

use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use anyhow::Context;
use tb_api::handlers::AppState;
use tb_api::middleware::{cors_policy, security_headers, standard_middleware};
use tb_config::{AppConfig, StoreBackend, StoreConfig};
use tb_core::{BoardEngine, KvStore};

// Feature-gated imports: each backend is compiled only when requested
#[cfg(feature = "kv-memory")]
use tb_kv_memory::MemoryKvStore;

#[cfg(feature = "kv-redis")]
use tb_kv_redis::RedisKvStore;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    telemetry::init(&config.logging)?;

    // 1. Open the backing store; it lives until the server has drained
    let store = open_store(&config.store)?;
    store.ping().await.context("backing store is not answering")?;

    // 2. Assemble the engine over the injected store handle
    let engine = BoardEngine::new(store.clone(), config.board_registry())
        .with_preview_replies(config.listing.preview_replies);

    let state = web::Data::new(AppState {
        engine,
        max_pages: config.listing.max_pages,
        limits: config.limits,
    });

    let addr = (config.server.host.clone(), config.server.port);
    tracing::info!(
        host = %addr.0,
        port = addr.1,
        backend = ?config.store.backend,
        boards = config.boards.len(),
        "textboard starting"
    );

    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(security_headers())
            .wrap(cors_policy())
            .wrap(standard_middleware())
            .configure(tb_api::configure_routes)
    });
    if let Some(workers) = config.server.workers {
        server = server.workers(workers);
    }
    server.bind(addr)?.run().await?;

    // 3. Release connections once every worker has stopped
    store.close().await;
    tracing::info!("textboard stopped");
    Ok(())
}

fn open_store(config: &StoreConfig) -> anyhow::Result<Arc<dyn KvStore>> {
    match config.backend {
        StoreBackend::Memory => open_memory(),
        StoreBackend::Redis => open_redis(config),
    }
}

#[cfg(feature = "kv-memory")]
fn open_memory() -> anyhow::Result<Arc<dyn KvStore>> {
    tracing::warn!("using the in-memory store; posts are lost on restart");
    Ok(Arc::new(MemoryKvStore::new()))
}

#[cfg(not(feature = "kv-memory"))]
fn open_memory() -> anyhow::Result<Arc<dyn KvStore>> {
    anyhow::bail!("store.backend = \"memory\" but this binary was built without the kv-memory feature")
}

#[cfg(feature = "kv-redis")]
fn open_redis(config: &StoreConfig) -> anyhow::Result<Arc<dyn KvStore>> {
    use secrecy::ExposeSecret;

    let url = config
        .redis_url
        .as_ref()
        .context("store.redis_url is required for the redis backend")?;
    let store = RedisKvStore::connect(url.expose_secret(), config.pool_size, config.op_timeout())?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "kv-redis"))]
fn open_redis(_config: &StoreConfig) -> anyhow::Result<Arc<dyn KvStore>> {
    anyhow::bail!("store.backend = \"redis\" but this binary was built without the kv-redis feature")
}
