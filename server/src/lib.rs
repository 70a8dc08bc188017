//! # Project Zurich API
//!
//! Visitor and analytics ingestion for the investor-relations site.
//!
//! # General Infrastructure
//! - Static pages are hosted separately; this service only answers `/api/*`
//! - The tracking script on every page posts events here, fire-and-forget
//! - Records land in the hosted record store when credentials are present,
//!   otherwise in a process-lifetime in-memory fallback
//!
//! # Routes
//! - `POST /api/visitors`, `POST /api/analytics-events` — create records
//! - `GET /api/visitors` — paginated visitor listing
//! - `GET /api/analytics-events` (alias `/api/analytics`) — paginated,
//!   filterable event listing
//!
//! Every response carries permissive CORS headers since the marketing pages
//! and the API live on different origins.
use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::{get, post},
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod error;
pub mod ingest;
pub mod query;
pub mod routes;
pub mod state;

use routes::{
    create_handler, fallback_handler, list_analytics_handler, list_visitors_handler,
    options_handler,
};
use state::State;

pub fn app(state: Arc<State>) -> Router {
    // Credentialed CORS cannot use a wildcard origin, so the requesting
    // origin is mirrored back instead.
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route(
            "/api/visitors",
            post(create_handler)
                .get(list_visitors_handler)
                .options(options_handler),
        )
        .route(
            "/api/analytics-events",
            post(create_handler)
                .get(list_analytics_handler)
                .options(options_handler),
        )
        .route(
            "/api/analytics",
            get(list_analytics_handler).options(options_handler),
        )
        .fallback(fallback_handler)
        .layer(cors)
        .with_state(state)
}

pub async fn start_server() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = State::new();

    info!("Starting server...");
    let app = app(state.clone());

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await.unwrap();
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    println!("Server shutting down...");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
