use axum::Router;
use tracing::{info, Level};

mod routes;
mod models;
mod utils;
mod state;

use crate::utils::conf_helper::{init_config_and_bind, get_cached_config};
use crate::state::app_state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let state = AppState::new();

    // === CONFIG + LISTENER ===
    let listener = init_config_and_bind().await?;

    let config = get_cached_config();

    info!(
        "{} v{} serving on {}:{}",
        config.name,
        config.version,
        config.connection.ip,
        config.connection.port
    );

    let app = Router::new()
        .merge(routes::info_routes::health_routes())
        .merge(routes::data_routes::data_routes(state.clone()));

    axum::serve(listener, app).await?;
    Ok(())
}
