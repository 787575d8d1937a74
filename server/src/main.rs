mod app;
mod config;
mod data;
mod routes;
mod state;

use geonet_shared::MapConfig;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use crate::state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let meta_path = config::meta_path();
    let features_path = config::features_path();
    let documents = match data::read_documents(&meta_path, &features_path).await {
        Ok(documents) => documents,
        Err(e) => {
            tracing::error!(error = %e, "failed to load map data");
            return;
        }
    };
    let map_config = MapConfig {
        use_track_colors: config::use_track_colors(),
    };
    tracing::info!(
        tracks = documents.meta.tracks.len(),
        features = documents.features.features.len(),
        use_track_colors = map_config.use_track_colors,
        meta = %meta_path.display(),
        features_path = %features_path.display(),
        "Map data loaded"
    );

    let static_dir = config::static_dir();
    if !static_dir.is_dir() {
        tracing::warn!(static_dir = %static_dir.display(), "static asset directory not found");
    }

    let state = AppState::new(documents, map_config, static_dir);
    let app = app::build_app(state);

    let addr = format!("0.0.0.0:{}", config::server_port());
    tracing::info!("Geonet map server listening on {addr}");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, %addr, "failed to bind TCP listener");
            return;
        }
    };
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "server failed");
    }

    tracing::info!("Server shut down gracefully");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        let mut sigterm = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                return;
            }
        };
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
