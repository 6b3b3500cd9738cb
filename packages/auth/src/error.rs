// ABOUTME: Error types for marketplace OAuth operations
// ABOUTME: Covers authorization state validation, token exchange/refresh, and API dispatch

use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Error, Debug)]
pub enum AuthError {
    /// The authorization state is unknown, already consumed, or expired.
    #[error("unknown or expired authorization state")]
    InvalidState,

    #[error("token exchange failed with status {status}: {body}")]
    TokenExchangeFailed { status: u16, body: String },

    #[error("token refresh failed with status {status}: {body}")]
    TokenRefreshFailed { status: u16, body: String },

    #[error("no refresh token available")]
    NoRefreshToken,

    /// Refresh failed; the caller must restart the authorization flow.
    #[error("marketplace authorization expired; re-authorization required")]
    ReauthorizationRequired,

    #[error("no valid access token; authorization required")]
    NoValidToken,

    /// The marketplace rejected the bearer token (HTTP 401).
    #[error("marketplace authentication expired")]
    AuthenticationExpired,

    #[error("marketplace API request failed with status {status}: {body}")]
    ApiRequestFailed { status: u16, body: String },

    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
