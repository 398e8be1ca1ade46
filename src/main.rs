// Copyright (c) 2025 Eloquent
// SPDX-License-Identifier: MIT
use anyhow::Result;
use finbot_node::{
    api::{start_server, AppState},
    config::Config,
    container::Container,
};
use std::env;

#[tokio::main]
async fn main() -> Result<()> {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;
    tracing::info!(
        "Starting FinBot node (chat_model={}, embed_dim={}, top_k={})",
        config.chat_model,
        config.embed_dim,
        config.top_k
    );

    let container = Container::build(&config)?;

    if !container.vector_store.health_check().await {
        tracing::warn!("Vector index health check failed at startup; continuing anyway");
    }

    start_server(AppState::new(container), config.api_port).await
}
