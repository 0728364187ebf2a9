//! Casa server: REST endpoints for lights, weather and accounts, plus the
//! `/ws` channel that keeps dashboards in sync with the light controller.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tokio::{
    net::TcpListener,
    signal::{self, ctrl_c},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

pub mod auth;
pub mod error;
pub mod routes;
pub mod state;
pub mod ws;

pub use error::AppError;
pub use state::AppState;

use routes::{
    authenticate, create_user, forecast, health, light_status, light_usage, logout, raw_weather,
    reset_light_usage, temperature, temperature_history, toggle_all_lights, toggle_light,
};

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/light/status", get(light_status))
        .route("/light/toggle", post(toggle_light))
        .route("/light/toggle/all", post(toggle_all_lights))
        .route("/light/usage", get(light_usage).delete(reset_light_usage))
        .route("/weather/get", get(raw_weather))
        .route("/weather/temperature/:city", get(temperature))
        .route("/weather/forecast/:city", get(forecast))
        .route("/weather/history/:city", get(temperature_history))
        .route("/api/user/create", post(create_user))
        .route("/api/user/auth", post(authenticate))
        .route("/api/user/logout/:user_id", delete(logout))
        .route("/ws", get(ws::ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub async fn start_server(state: AppState) -> std::io::Result<()> {
    let address = state.config.server.address();
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await?;
    info!(url = %format!("http://{}", address), "Server running");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
