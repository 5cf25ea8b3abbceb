//! Satellite tile stitching API service.
//!
//! HTTP server that composes upstream imagery tiles into a single image.

use anyhow::{Context, Result};
use clap::Parser;
use std::{env, net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use stitch_api::{build_router, state::AppState};
use stitcher::{HttpTransport, Stitcher, UpstreamConfig};
use storage::{open_cache, CacheBackend, CacheConfig};

#[derive(Parser, Debug)]
#[command(name = "stitch-api")]
#[command(about = "Satellite tile stitching HTTP server")]
struct Args {
    /// Listen address
    #[arg(short, long, env = "STITCH_LISTEN", default_value = "127.0.0.1:7000")]
    listen: String,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Number of tokio worker threads (default: number of CPU cores)
    #[arg(long)]
    worker_threads: Option<usize>,

    /// Tile cache backend: none, memory, redb or redis
    #[arg(long, env = "STITCH_CACHE", default_value = "memory")]
    cache: CacheBackend,

    /// Redis URL for the redis cache backend
    #[arg(long, env = "REDIS_URL", default_value = "redis://127.0.0.1:6379")]
    redis_url: String,

    /// Database file for the redb cache backend
    #[arg(long, env = "STITCH_REDB_PATH", default_value = "stitch-cache.redb")]
    redb_path: PathBuf,

    /// Memory limit for the memory cache backend, in megabytes
    #[arg(long, env = "STITCH_CACHE_MB", default_value_t = 512)]
    cache_mb: usize,

    /// Upstream data root
    #[arg(long, env = "STITCH_UPSTREAM_URL", default_value = stitcher::config::DEFAULT_BASE_URL)]
    upstream_url: String,

    /// Maximum concurrent upstream requests
    #[arg(long, env = "STITCH_MAX_FETCHES", default_value_t = 8)]
    max_fetches: usize,

    /// Upstream request timeout in seconds
    #[arg(long, env = "STITCH_REQUEST_TIMEOUT", default_value_t = 30)]
    request_timeout: u64,

    /// Seconds a catalog listing stays cached
    #[arg(long, env = "STITCH_METADATA_TTL", default_value_t = 60)]
    metadata_ttl: u64,
}

fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Build tokio runtime with configurable worker threads
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    let worker_threads = args.worker_threads.or_else(|| {
        env::var("TOKIO_WORKER_THREADS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
    });
    if let Some(threads) = worker_threads {
        runtime_builder.worker_threads(threads);
    }

    let runtime = runtime_builder.build()?;
    runtime.block_on(async_main(args, worker_threads))?;
    Ok(())
}

async fn async_main(args: Args, worker_threads: Option<usize>) -> Result<()> {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    if let Some(threads) = worker_threads {
        info!(threads, "Configured tokio worker threads");
    }

    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;
    stitcher::metrics::describe();
    info!("Prometheus metrics exporter initialized");

    let upstream = UpstreamConfig {
        request_timeout: Duration::from_secs(args.request_timeout),
        max_concurrent_fetches: args.max_fetches,
        metadata_ttl: Duration::from_secs(args.metadata_ttl),
        ..UpstreamConfig::default()
    }
    .with_base_url(args.upstream_url);

    let cache = open_cache(&CacheConfig {
        backend: args.cache,
        redis_url: args.redis_url,
        redb_path: args.redb_path,
        memory_max_mb: args.cache_mb,
    })
    .await
    .context("Failed to open tile cache")?;

    let transport = HttpTransport::new(&upstream)?;
    info!(
        upstream = %upstream.base_url,
        max_fetches = upstream.max_concurrent_fetches,
        "Starting stitch API server"
    );

    let stitcher = Stitcher::new(Arc::new(transport), upstream).with_cache(cache);
    let state = Arc::new(AppState::new(stitcher).with_prometheus(prometheus_handle));
    let app = build_router(state);

    let addr: SocketAddr = args.listen.parse()?;
    info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
