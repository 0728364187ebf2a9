use tracing_subscriber::{fmt, EnvFilter};

use casa_core::CasaConfig;
use casa_server::{start_server, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    fmt()
        .compact()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = CasaConfig::load()?;
    tracing::info!(
        address = %config.server.address(),
        device = %config.device.base_url,
        "Starting Casa"
    );

    let state = AppState::from_config(config)?;

    start_server(state).await?;
    Ok(())
}
