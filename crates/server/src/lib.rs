//! HTTP surface of the trending video service.
//!
//! Routes are thin: they consult the session gate, then hand the request to
//! the core services held in [`state::AppState`].
use std::{sync::Arc, time::Duration};

use axum::{
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tokio::{net::TcpListener, signal::ctrl_c};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

pub mod config;
pub mod error;
pub mod routes;
pub mod session;
pub mod state;

use config::Config;
use routes::{
    check_session_handler, graph_data_handler, login_handler, logout_handler, refresh_handler,
    scrape_handler, search_handler, videos_handler,
};
use state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/search", get(search_handler))
        .route("/scrape_youtube", get(scrape_handler))
        .route("/refresh", post(refresh_handler))
        .route("/api/videos", get(videos_handler))
        .route("/api/graph-data", get(graph_data_handler))
        .route("/login", post(login_handler))
        .route("/logout", post(logout_handler))
        .route("/api/check-session", get(check_session_handler))
        .layer(cors(&state.config))
        .with_state(state)
}

fn cors(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|e| warn!("Ignoring invalid CORS origin {origin}: {e}"))
                .ok()
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60))
}

pub async fn start_server(state: Arc<AppState>) -> std::io::Result<()> {
    info!("Starting server...");

    let address = state.config.address();
    let app = router(state);

    info!("Binding to {address}");
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install terminate handler: {e}");
                std::future::pending::<()>().await;
            }
        }

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
