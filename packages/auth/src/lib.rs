// ABOUTME: Flipscan authentication library managing the marketplace OAuth token lifecycle
// ABOUTME: PKCE authorization, code exchange, token refresh, and authenticated request dispatch

pub mod error;
pub mod oauth;

// Re-export main types
pub use error::{AuthError, AuthResult};
pub use oauth::{
    AuthStatus, AuthorizationRequest, MarketplaceAuth, MarketplaceConfig, PkceChallenge,
    TokenResponse,
};
