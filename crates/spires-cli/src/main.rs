use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use spires_core::config_file;
use spires_core::{DiskCache, Frontend, InspireSource};

mod output;

/// INSPIRE search front-end for launcher script filters
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The launcher's current input (words are re-joined with spaces)
    query: Vec<String>,

    /// Directory for the per-query result cache
    #[arg(long)]
    storage_dir: Option<PathBuf>,

    /// Directory for the last-results snapshot
    #[arg(long)]
    session_dir: Option<PathBuf>,

    /// Base URL of the INSPIRE service
    #[arg(long)]
    site_url: Option<String>,

    /// Remote fetch timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    // Feedback goes to stdout; everything else must stay on stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = config_file::load_config();
    let search = config.search.unwrap_or_default();
    let cache_config = config.cache.unwrap_or_default();

    // Resolve configuration: CLI flags > env vars > config file > defaults
    let site_url = cli
        .site_url
        .or_else(|| std::env::var("SPIRES_SITE_URL").ok())
        .or(search.site_url)
        .unwrap_or_else(|| spires_core::DEFAULT_SITE_URL.to_string());
    let timeout = cli
        .timeout
        .or(search.timeout_secs)
        .map(Duration::from_secs)
        .unwrap_or(spires_core::DEFAULT_FETCH_TIMEOUT);
    let max_results = search.max_results.unwrap_or(spires_core::DEFAULT_MAX_RESULTS);

    let storage_dir = cli
        .storage_dir
        .or(cache_config.storage_dir.map(PathBuf::from))
        .unwrap_or_else(|| app_dir(dirs::data_dir()));
    let session_dir = cli
        .session_dir
        .or(cache_config.session_dir.map(PathBuf::from))
        .unwrap_or_else(|| app_dir(dirs::cache_dir()));

    let cache = match cache_config.freshness_days {
        Some(days) => DiskCache::with_freshness(
            storage_dir,
            session_dir,
            Duration::from_secs(days * 24 * 60 * 60),
        ),
        None => DiskCache::new(storage_dir, session_dir),
    };

    let source = Arc::new(InspireSource::new(site_url.clone(), max_results));
    let frontend = Frontend::new(cache, source, site_url, timeout, invocation_token());

    let input = cli.query.join(" ");
    tracing::debug!(input, "invocation");
    let entries = frontend.respond(&input).await;

    output::write_feedback(&mut std::io::stdout().lock(), &entries)?;
    Ok(())
}

fn app_dir(base: Option<PathBuf>) -> PathBuf {
    base.unwrap_or_else(std::env::temp_dir).join("spires")
}

/// Per-invocation base token for context-menu entry uids.
fn invocation_token() -> String {
    let epoch = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("org.spires.launcher.{}", epoch.as_secs())
}
