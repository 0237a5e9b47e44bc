//! Barista - conversational coffee ordering backend
//!
//! An HTTP service where a hosted model takes coffee orders by calling a
//! fixed set of order-management tools, one session per customer.

mod api;
mod config;
mod llm;
mod menu;
mod money;
mod order;
mod runtime;
mod session;
mod state_machine;
mod system_prompt;
mod tools;
mod transcript;

use api::{cors_layer, create_router, AppState};
use config::Config;
use llm::{LlmService, UnavailableService};
use menu::Menu;
use runtime::Barista;
use session::SessionStore;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "barista=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = Config::from_env();

    let menu = match &config.menu_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "Loading menu");
            Menu::from_json_file(path)?
        }
        None => Menu::standard(),
    };
    tracing::info!(items = menu.items().len(), "Menu ready");

    let llm: Arc<dyn LlmService> = match config.llm.build_service() {
        Ok(service) => {
            tracing::info!(model = %service.model_id(), "Model client initialized");
            service
        }
        Err(e) => {
            tracing::warn!(error = %e, "Model unavailable; /start and /chat will fail");
            Arc::new(UnavailableService::new(e.message))
        }
    };

    let sessions = Arc::new(SessionStore::new());
    let sweeper = sessions.spawn_sweeper(config.session_ttl, config.sweep_interval);

    let barista = Arc::new(Barista::new(
        llm,
        Arc::new(menu),
        Arc::clone(&sessions),
        config.turn_config(),
    ));

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(AppState::new(barista))
        .layer(cors_layer(config.frontend_url.clone()))
        .layer(compression)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(%addr, "Barista server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    tracing::info!("Barista server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
