// ABOUTME: In-memory token set and token endpoint response types
// ABOUTME: Tracks access/refresh tokens and expiry with a safety margin

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

/// Seconds subtracted from the advertised token lifetime so a token is
/// refreshed before the marketplace actually rejects it.
const EXPIRY_SAFETY_MARGIN_SECS: i64 = 60;

/// Token response from the marketplace token endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub expires_in: i64, // Seconds
    pub token_type: String,
    #[serde(default)]
    pub scope: Option<String>,
}

/// The process-local token set for one connected marketplace account.
///
/// Never persisted; lost on restart, after which a fresh authorization flow
/// is required.
#[derive(Debug, Clone, Default)]
pub struct TokenSet {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl TokenSet {
    /// Apply a token endpoint response.
    ///
    /// The refresh token is only replaced when the response carries one;
    /// rotation is optional per server behavior.
    pub fn apply(&mut self, response: &TokenResponse) {
        self.access_token = Some(response.access_token.clone());
        if let Some(refresh_token) = &response.refresh_token {
            self.refresh_token = Some(refresh_token.clone());
        }
        self.expires_at =
            Some(Utc::now() + Duration::seconds(response.expires_in - EXPIRY_SAFETY_MARGIN_SECS));
    }

    /// The cached access token, if present and unexpired.
    pub fn valid_access_token(&self) -> Option<&str> {
        let expires_at = self.expires_at?;
        if Utc::now() < expires_at {
            self.access_token.as_deref()
        } else {
            None
        }
    }

    /// Whether an unexpired access token is cached.
    pub fn has_valid_access(&self) -> bool {
        self.valid_access_token().is_some()
    }

    /// Drop the access token but keep the refresh token, forcing the next
    /// caller through a refresh.
    pub fn clear_access(&mut self) {
        self.access_token = None;
        self.expires_at = None;
    }

    /// Reset to the unauthenticated state.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
