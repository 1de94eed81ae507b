//! # nowpoll Agent
//!
//! Polls a remote now-playing endpoint and logs track changes to the
//! console.
//!
//! The agent wires the pieces together: an HTTP [`HistoryClient`] as the
//! fetch source, the [`PollEngine`] driving the fixed-interval loop, and a
//! [`NowPlayingView`] registered as an observer. Polling starts with that
//! first registration and runs until Ctrl+C.

use anyhow::{Context, Result};
use nowpoll_engine::{EngineConfig, PollEngine};
use nowpoll_http::{HistoryClient, HistoryClientConfig};
use tracing_subscriber::EnvFilter;

mod config;
mod display;

pub use config::AgentConfig;
pub use display::NowPlayingView;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting nowpoll agent"
    );

    let config = AgentConfig::from_env()?;

    let client = HistoryClient::new(HistoryClientConfig {
        endpoint_url: config.endpoint_url.clone(),
        timeout: config.request_timeout,
        cache_bust: true,
    })
    .context("Failed to create history client")?;

    let (engine, handle) = PollEngine::new(
        client,
        EngineConfig {
            poll_interval: config.poll_interval,
            ..Default::default()
        },
    )
    .context("Failed to create poll engine")?;

    let engine_task = tokio::spawn(engine.run());

    let mut view = NowPlayingView::new();
    handle
        .register(move |changed, snapshot| {
            view.update(changed, snapshot);
            Ok(())
        })
        .await
        .context("Failed to register now-playing view")?;

    tracing::info!(
        endpoint = %config.endpoint_url,
        interval = ?config.poll_interval,
        "Agent running, press Ctrl+C to stop"
    );

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");

    engine_task.abort();

    Ok(())
}
