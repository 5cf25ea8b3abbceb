//! Batch front end: build one composite and save it.
//!
//! The output format follows the output path's extension.

use anyhow::{Context, Result};
use clap::Parser;
use std::{path::PathBuf, sync::Arc, time::Duration};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use renderer::{codec, EncodeOptions, OutputFormat};
use stitch_common::request::{
    DEFAULT_HEIGHT, DEFAULT_PRODUCT, DEFAULT_SATELLITE, DEFAULT_SECTOR, DEFAULT_TIMESTAMP,
    DEFAULT_WIDTH,
};
use stitch_common::time::format_timestamp;
use stitch_common::{parse_filter_spec, BuildRequest};
use stitcher::{HttpTransport, Stitcher, UpstreamConfig};
use storage::{open_cache, CacheBackend, CacheConfig};

#[derive(Parser, Debug)]
#[command(name = "rammb-stitch")]
#[command(about = "Stitch satellite imagery tiles into one image")]
struct Args {
    /// Satellite identifier
    #[arg(short, long, default_value = DEFAULT_SATELLITE)]
    satellite: String,

    /// Sector identifier
    #[arg(short = 'c', long, default_value = DEFAULT_SECTOR)]
    sector: String,

    /// Product identifier
    #[arg(short, long, default_value = DEFAULT_PRODUCT)]
    product: String,

    /// `latest`, a catalog timestamp, or a date/time to match nearest
    #[arg(short, long, default_value = DEFAULT_TIMESTAMP)]
    time: String,

    /// Zoom level (derived from the output size when omitted)
    #[arg(long)]
    zoom: Option<u32>,

    /// Output width
    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    width: u32,

    /// Output height
    #[arg(long, default_value_t = DEFAULT_HEIGHT)]
    height: u32,

    /// Filters, e.g. `trim,scale,timestamp`
    #[arg(long, default_value = "")]
    filters: String,

    /// Print the available timestamps and exit
    #[arg(long)]
    list_timestamps: bool,

    /// Where to save the output (.png, .jpg, .jpeg or .webp)
    #[arg(required_unless_present = "list_timestamps")]
    output_path: Option<PathBuf>,

    /// JPEG quality (1-100)
    #[arg(long, default_value_t = 90)]
    jpeg_quality: u8,

    /// Log level
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Tile cache backend: none, memory, redb or redis
    #[arg(long, env = "STITCH_CACHE", default_value = "none")]
    cache: CacheBackend,

    /// Redis URL for the redis cache backend
    #[arg(long, env = "REDIS_URL", default_value = "redis://127.0.0.1:6379")]
    redis_url: String,

    /// Database file for the redb cache backend
    #[arg(long, env = "STITCH_REDB_PATH", default_value = "stitch-cache.redb")]
    redb_path: PathBuf,

    /// Upstream data root
    #[arg(long, env = "STITCH_UPSTREAM_URL", default_value = stitcher::config::DEFAULT_BASE_URL)]
    upstream_url: String,

    /// Maximum concurrent upstream requests
    #[arg(long, env = "STITCH_MAX_FETCHES", default_value_t = 8)]
    max_fetches: usize,

    /// Upstream request timeout in seconds
    #[arg(long, env = "STITCH_REQUEST_TIMEOUT", default_value_t = 30)]
    request_timeout: u64,
}

impl Args {
    fn request(&self) -> BuildRequest {
        BuildRequest::new(&self.satellite)
            .with_sector(&self.sector)
            .with_product(&self.product)
            .with_timestamp(&self.time)
            .with_zoom(self.zoom)
            .with_size(self.width, self.height)
            .with_filters(parse_filter_spec(&self.filters))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let upstream = UpstreamConfig {
        request_timeout: Duration::from_secs(args.request_timeout),
        max_concurrent_fetches: args.max_fetches,
        ..UpstreamConfig::default()
    }
    .with_base_url(args.upstream_url.clone());

    let cache = open_cache(&CacheConfig {
        backend: args.cache,
        redis_url: args.redis_url.clone(),
        redb_path: args.redb_path.clone(),
        ..CacheConfig::default()
    })
    .await
    .context("Failed to open tile cache")?;

    let transport = HttpTransport::new(&upstream)?;
    let stitcher = Stitcher::new(Arc::new(transport), upstream).with_cache(cache);
    let request = args.request();

    if args.list_timestamps {
        let catalog = stitcher.timestamps(&request.product_id()).await?;
        for ts in catalog.as_slice() {
            println!("{}\t{}", ts, format_timestamp(*ts));
        }
        return Ok(());
    }

    let output_path = args
        .output_path
        .as_ref()
        .context("an output path is required")?;
    // Fail on a bad extension before doing any network work
    let format = OutputFormat::from_path(output_path)?;

    let outcome = stitcher.build(&request).await?;
    info!(
        timestamp = outcome.timestamp,
        zoom = outcome.zoom,
        tiles = outcome.tiles,
        "Built image"
    );

    let options = EncodeOptions {
        jpeg_quality: args.jpeg_quality,
        ..EncodeOptions::default()
    };
    let bytes = codec::encode(&outcome.image, format, &options)?;

    tokio::fs::write(output_path, &bytes)
        .await
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    eprintln!(
        "Wrote {} ({}x{}, {})",
        output_path.display(),
        outcome.image.width(),
        outcome.image.height(),
        format_timestamp(outcome.timestamp)
    );

    Ok(())
}
