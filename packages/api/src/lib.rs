// ABOUTME: HTTP API layer for Flipscan marketplace authentication and search
// ABOUTME: Routers and background sweep wiring around the auth manager

use std::sync::Arc;

use axum::{
    routing::{delete, get},
    Router,
};

use flipscan_auth::MarketplaceAuth;

pub mod oauth_handlers;
pub mod response;
pub mod search_handlers;
pub mod sweeper;

/// Shared auth manager handed to every handler
pub type AuthState = Arc<MarketplaceAuth>;

/// Creates the marketplace API router
///
/// These routes are the only touchpoints the surrounding application needs:
/// start/complete authorization, check status, disconnect, and issue
/// authenticated marketplace calls.
pub fn create_marketplace_router() -> Router<AuthState> {
    Router::new()
        .route("/auth/status", get(oauth_handlers::get_auth_status))
        .route("/auth/callback", get(oauth_handlers::oauth_callback))
        .route("/auth", delete(oauth_handlers::logout))
        .route("/search", get(search_handlers::search_listings))
}
