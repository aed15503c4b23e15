//! Demo binary: wire the engine together and print results as JSON.
//!
//! Usage:
//!   melodex genre rock [limit]
//!   melodex search "daft punk" [limit]
//!
//! Provider credentials come from SPOTIFY_TOKEN, YOUTUBE_API_KEY and
//! LASTFM_API_KEY; providers without credentials are simply not
//! registered and the engine degrades accordingly.

use std::env;
use std::fs;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use sqlx::sqlite::SqlitePoolOptions;

use melodex::aggregator::{AggregatorEngine, EngineConfig, RequestOptions};
use melodex::cache::SqliteCache;
use melodex::deezer::DeezerProvider;
use melodex::lastfm::LastfmProvider;
use melodex::providers::ProviderManager;
use melodex::quota::{QuotaManager, SqliteQuotaStore};
use melodex::spotify::SpotifyProvider;
use melodex::throttle::ThrottleController;
use melodex::youtube::YoutubeProvider;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let (mode, input, limit) = match args.as_slice() {
        [_, mode, input] => (mode.as_str(), input.as_str(), 10),
        [_, mode, input, limit] => (
            mode.as_str(),
            input.as_str(),
            limit.parse().context("limit must be a positive integer")?,
        ),
        _ => bail!("usage: melodex <genre|search> <input> [limit]"),
    };

    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| ".".into())
        .join("melodex");
    fs::create_dir_all(&data_dir)?;
    let db_path = data_dir.join("melodex.db");

    log::info!("Opening database at {:?}", db_path);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(
            sqlx::sqlite::SqliteConnectOptions::new()
                .filename(&db_path)
                .create_if_missing(true),
        )
        .await
        .context("failed to open database")?;

    let manager = Arc::new(ProviderManager::new());

    if let Ok(token) = env::var("SPOTIFY_TOKEN") {
        manager.register(Arc::new(SpotifyProvider::new(token)?)).await;
    }
    if let Ok(key) = env::var("YOUTUBE_API_KEY") {
        manager.register(Arc::new(YoutubeProvider::new(key)?)).await;
    }
    if let Ok(key) = env::var("LASTFM_API_KEY") {
        manager.register(Arc::new(LastfmProvider::new(key)?)).await;
    }
    manager.register(Arc::new(DeezerProvider::new()?)).await;

    let quota_store = Arc::new(SqliteQuotaStore::new(pool.clone()).await?);
    let quota = Arc::new(QuotaManager::with_defaults(quota_store));
    quota.restore().await;
    let _persist_task = Arc::clone(&quota).spawn_periodic_persist(Duration::from_secs(60));

    let cache = Arc::new(SqliteCache::new(pool).await?);

    let engine = AggregatorEngine::new(
        manager,
        quota,
        Arc::new(ThrottleController::with_defaults()),
        cache,
        EngineConfig::default(),
    );

    let options = RequestOptions::default();
    let tracks = match mode {
        "genre" => engine.get_recommendations_by_genre(input, limit, &options).await,
        "search" => engine.search_multi_source(input, limit, &options).await,
        other => bail!("unknown mode '{}', expected genre or search", other),
    };

    println!("{}", serde_json::to_string_pretty(&tracks)?);
    Ok(())
}
