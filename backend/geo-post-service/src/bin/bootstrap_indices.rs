//! Creates the post and user indices with their mappings if they are missing.
//! Safe to run repeatedly.

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use geo_post_service::services::{ensure_indices, ElasticsearchClient};
use geo_post_service::Config;

#[tokio::main]
async fn main() -> Result<()> {
    rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install rustls crypto provider"))?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "geo_post_service=debug,bootstrap_indices=debug,info".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    let client = ElasticsearchClient::new(&config.elasticsearch_url)
        .context("Failed to create Elasticsearch client")?;

    let created = ensure_indices(&client, &config.post_index, &config.user_index)
        .await
        .context("Failed to bootstrap indices")?;

    if created.is_empty() {
        info!("Indices already exist, nothing to do");
    } else {
        info!(created = ?created, "Indices are created");
    }
    Ok(())
}
