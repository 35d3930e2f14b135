//! Ring Cache probe
//!
//! Loads configuration, builds the accessor and performs one set/get/delete
//! round trip against the configured backend.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{ensure, Context};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ring_cache::{
    cache_key, spawn_cleanup_task, BackendKind, Cache, CacheBackend, Config, MemoryBackend,
    RedisRing,
};

/// Main entry point for the cache probe.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables (and `.env`)
/// 3. Build the configured backend and the accessor
/// 4. Write, read back and delete a probe key
#[tokio::main]
async fn main() -> ExitCode {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ring_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Cache probe failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let config = Config::from_env();
    info!(
        "Configuration loaded: backend={:?}, shards={}, default_ttl={}s",
        config.backend,
        config.addrs.len(),
        config.default_ttl
    );

    let (backend, cleanup_handle) = match config.backend {
        BackendKind::Redis => {
            let ring = RedisRing::from_config(&config).context("invalid Redis address")?;
            (Arc::new(ring) as Arc<dyn CacheBackend>, None)
        }
        BackendKind::Memory => {
            let memory = MemoryBackend::new();
            let handle = spawn_cleanup_task(memory.clone(), config.cleanup_interval);
            (Arc::new(memory) as Arc<dyn CacheBackend>, Some(handle))
        }
    };

    let cache = Cache::with_ttl(backend, Duration::from_secs(config.default_ttl));
    let result = probe(&cache).await;

    if let Some(handle) = cleanup_handle {
        handle.abort();
    }
    result
}

async fn probe(cache: &Cache) -> anyhow::Result<()> {
    let key = cache_key!("ring_cache", "probe", std::process::id());
    let written = chrono::Utc::now().to_rfc3339();

    cache
        .set(&key, written.as_str(), &[])
        .await
        .context("probe write failed")?;
    let read = cache
        .get_string(&key)
        .await
        .context("probe read failed")?;
    ensure!(
        read.as_deref() == Some(written.as_str()),
        "probe read returned {:?}, expected {:?}",
        read,
        written
    );
    cache.delete(&key).await.context("probe delete failed")?;

    info!("Cache probe succeeded for key {}", key);
    Ok(())
}
