use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use panels_api::config::ServerConfig;
use panels_api::state::AppState;
use panels_db::{DbConfig, LibraryPanelService};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "panels_api=debug,panels_db=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env().expect("Invalid server configuration");
    let db_config = DbConfig::from_env().expect("DATABASE_URL must be set");

    let pool = panels_db::create_pool_with_config(&db_config)
        .await
        .expect("Failed to connect to database");
    panels_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!(
        max_connections = db_config.max_connections,
        "Panel store ready"
    );

    let panels = LibraryPanelService::new(pool);
    panels
        .health_check()
        .await
        .expect("Panel store health check failed");

    let addr = config.bind_addr();
    let app = panels_api::build_app(AppState::new(panels, config));

    tracing::info!(%addr, "Serving library panels");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
