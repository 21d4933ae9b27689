//! Geo Post Service - Main entry point
//!
//! Serves `/post`, `/search` and `/cluster` over HTTP. Indices are created
//! by the `bootstrap-indices` binary, not here.

use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use geo_post_service::handlers;
use geo_post_service::services::{
    AuthMode, ElasticsearchClient, GcpCredentials, GcsClient, GoogleVisionClient,
};
use geo_post_service::{AppState, Config};

#[actix_web::main]
async fn main() -> Result<()> {
    // Initialize rustls crypto provider (required for rustls 0.23+)
    rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install rustls crypto provider"))?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "geo_post_service=debug,actix_web=info,info".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    info!("Starting geo-post-service: index={}", config.post_index);

    let search = ElasticsearchClient::new(&config.elasticsearch_url)
        .context("Failed to create Elasticsearch client")?;

    // Storage and Vision share one token provider when ADC is in use.
    let credentials = GcpCredentials::new();
    let storage = GcsClient::new(
        &config.gcs_endpoint,
        &config.gcs_bucket,
        credentials.clone(),
        config.gcs_timeout(),
    )
    .context("Failed to create GCS client")?;
    info!("Media uploads go to gs://{}", storage.bucket());

    let auth_mode = match config.vision_api_key.as_deref() {
        Some(key) if !key.is_empty() => AuthMode::ApiKey(key.to_string()),
        _ => {
            info!("No Vision API key provided, using Application Default Credentials");
            AuthMode::Adc(credentials)
        }
    };
    let annotator =
        GoogleVisionClient::new(&config.vision_endpoint, auth_mode, config.vision_timeout())
            .context("Failed to create Vision client")?;
    info!("Google Vision client initialized (auth: {:?})", annotator.auth_mode());

    let state = AppState::new(
        Arc::new(search),
        Arc::new(storage),
        Arc::new(annotator),
        config.handler_settings(),
    );

    let bind_address = config.http_bind_address();
    info!("Starting HTTP server on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(handlers::configure)
    })
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run()
    .await?;

    info!("geo-post-service stopped");
    Ok(())
}
