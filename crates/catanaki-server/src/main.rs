//! Catanaki multiplayer game server.

use catanaki_core::{BoardLayout, RandomSource, RngSource};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod protocol;
mod room;
mod server;

use server::ServerState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr: SocketAddr = std::env::var("SERVER_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8080".into())
        .parse()?;

    // Fixed seed makes every hosted game reproducible
    let seeds: Box<dyn RandomSource> = match std::env::var("CATANAKI_SEED") {
        Ok(seed) => {
            let seed: u64 = seed.parse()?;
            info!(seed, "Using fixed seed");
            Box::new(RngSource::seeded(seed))
        }
        Err(_) => Box::new(RngSource::from_entropy()),
    };

    info!("Starting Catanaki server...");

    let state = Arc::new(ServerState::new(BoardLayout::standard(), seeds));

    server::run_server(addr, state).await
}
