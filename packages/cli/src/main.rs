use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use flipscan_api::sweeper::{spawn_state_sweeper, DEFAULT_SWEEP_INTERVAL};
use flipscan_auth::MarketplaceAuth;

mod config;

use config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let mut app = Router::new().route("/api/health", get(health_check));

    // Marketplace routes only exist when credentials are configured
    match MarketplaceAuth::from_env() {
        Some(auth) => {
            let auth = Arc::new(auth);
            let _sweeper = spawn_state_sweeper(auth.clone(), DEFAULT_SWEEP_INTERVAL);
            app = app.nest(
                "/api/marketplace",
                flipscan_api::create_marketplace_router().with_state(auth),
            );
            info!("marketplace integration enabled");
        }
        None => {
            warn!("marketplace credentials not configured; marketplace routes disabled");
        }
    }

    let cors = CorsLayer::new()
        .allow_origin(config.cors_origin.parse::<HeaderValue>()?)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any);
    let app = app.layer(cors);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    info!("flipscan API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().timestamp(),
        "version": env!("CARGO_PKG_VERSION"),
        "service": flipscan_core::APP_NAME,
    }))
}
