// ABOUTME: OAuth module implementing the PKCE authorization-code flow for the marketplace API
// ABOUTME: Includes PKCE generation, pending authorization tracking, and token lifecycle

pub mod config;
pub mod manager;
pub mod pkce;
pub mod state;
pub mod tokens;

pub use config::MarketplaceConfig;
pub use manager::{AuthStatus, AuthorizationRequest, MarketplaceAuth};
pub use pkce::PkceChallenge;
pub use tokens::{TokenResponse, TokenSet};
