use anyhow::{Context, Result};
use std::sync::OnceLock;
use tokio::fs;
use tokio::net::TcpListener;
use tracing::info;

use crate::models::extension_model::ExtensionConfig;

const CONFIG_FILE: &str = "plugin.json";

static CONFIG_CACHE: OnceLock<ExtensionConfig> = OnceLock::new();

pub async fn init_config_and_bind() -> Result<TcpListener> {
    let data = fs::read_to_string(CONFIG_FILE)
        .await
        .with_context(|| format!("reading {CONFIG_FILE}"))?;

    let mut config: ExtensionConfig =
        serde_json::from_str(&data).with_context(|| format!("parsing {CONFIG_FILE}"))?;

    let bind_addr = format!("{}:{}", config.connection.ip, config.connection.port);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {bind_addr}"))?;

    let actual_port = listener.local_addr().context("reading bound address")?.port();

    // Port 0 asks the OS for a free port; publish the one we got
    config.connection.port = actual_port;

    CONFIG_CACHE
        .set(config)
        .map_err(|_| anyhow::anyhow!("Config already initialized"))?;

    info!("Config initialized with dynamic port: {}", actual_port);

    Ok(listener)
}

pub fn get_cached_config() -> &'static ExtensionConfig {
    CONFIG_CACHE.get().expect("Config not initialized")
}
