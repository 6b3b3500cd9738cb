// ABOUTME: Marketplace OAuth configuration sourced from the process environment
// ABOUTME: Endpoint defaults target production; env overrides exist for testing

use flipscan_core::{env_or, optional_env};
use tracing::debug;

/// Production marketplace endpoints. Overridable via environment for tests
/// and sandbox accounts.
const DEFAULT_AUTH_URL: &str = "https://auth.ebay.com/oauth2/authorize";
const DEFAULT_TOKEN_URL: &str = "https://api.ebay.com/identity/v1/oauth2/token";
const DEFAULT_API_BASE_URL: &str = "https://api.ebay.com";
const DEFAULT_SCOPE: &str = "https://api.ebay.com/oauth/api_scope";

/// Path the marketplace redirects back to after user consent.
const CALLBACK_PATH: &str = "/api/marketplace/auth/callback";

/// Configuration for one connected marketplace application
#[derive(Debug, Clone)]
pub struct MarketplaceConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    pub auth_url: String,
    pub token_url: String,
    pub api_base_url: String,
}

impl MarketplaceConfig {
    /// Build a config from explicit credentials and the application base URL.
    pub fn new(client_id: String, client_secret: String, app_base_url: &str) -> Self {
        let redirect_uri = format!("{}{}", app_base_url.trim_end_matches('/'), CALLBACK_PATH);

        Self {
            client_id,
            client_secret,
            redirect_uri,
            scopes: vec![DEFAULT_SCOPE.to_string()],
            auth_url: DEFAULT_AUTH_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }

    /// Read configuration from the process environment.
    ///
    /// Returns `None` when the client id or secret is absent so callers
    /// cannot construct a manager without credentials.
    pub fn from_env() -> Option<Self> {
        let client_id = optional_env("EBAY_CLIENT_ID")?;
        let client_secret = optional_env("EBAY_CLIENT_SECRET")?;
        let app_base_url = env_or("APP_BASE_URL", "http://localhost:4800");

        let mut config = Self::new(client_id, client_secret, &app_base_url);

        if let Some(scopes) = optional_env("EBAY_OAUTH_SCOPES") {
            config.scopes = scopes.split_whitespace().map(String::from).collect();
        }
        if let Some(auth_url) = optional_env("EBAY_AUTH_URL") {
            config.auth_url = auth_url;
        }
        if let Some(token_url) = optional_env("EBAY_TOKEN_URL") {
            config.token_url = token_url;
        }
        if let Some(api_base_url) = optional_env("EBAY_API_BASE_URL") {
            config.api_base_url = api_base_url;
        }

        debug!("loaded marketplace config for client {}", config.client_id);
        Some(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn clear_marketplace_env() {
        for var in [
            "EBAY_CLIENT_ID",
            "EBAY_CLIENT_SECRET",
            "EBAY_OAUTH_SCOPES",
            "EBAY_AUTH_URL",
            "EBAY_TOKEN_URL",
            "EBAY_API_BASE_URL",
            "APP_BASE_URL",
        ] {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_new_builds_redirect_uri() {
        let config = MarketplaceConfig::new(
            "client-id".to_string(),
            "client-secret".to_string(),
            "https://flipscan.example.com/",
        );

        assert_eq!(
            config.redirect_uri,
            "https://flipscan.example.com/api/marketplace/auth/callback"
        );
        assert_eq!(config.auth_url, DEFAULT_AUTH_URL);
        assert_eq!(config.scopes, vec![DEFAULT_SCOPE.to_string()]);
    }

    #[test]
    #[serial]
    fn test_from_env_requires_credentials() {
        clear_marketplace_env();
        assert!(MarketplaceConfig::from_env().is_none());

        // Id alone is not enough
        env::set_var("EBAY_CLIENT_ID", "client-id");
        assert!(MarketplaceConfig::from_env().is_none());

        clear_marketplace_env();
    }

    #[test]
    #[serial]
    fn test_from_env_with_overrides() {
        clear_marketplace_env();
        env::set_var("EBAY_CLIENT_ID", "client-id");
        env::set_var("EBAY_CLIENT_SECRET", "client-secret");
        env::set_var("EBAY_OAUTH_SCOPES", "scope.a scope.b");
        env::set_var("EBAY_TOKEN_URL", "http://localhost:9999/token");
        env::set_var("APP_BASE_URL", "https://app.example.com");

        let config = MarketplaceConfig::from_env().unwrap();

        assert_eq!(config.client_id, "client-id");
        assert_eq!(config.scopes, vec!["scope.a", "scope.b"]);
        assert_eq!(config.token_url, "http://localhost:9999/token");
        assert_eq!(
            config.redirect_uri,
            "https://app.example.com/api/marketplace/auth/callback"
        );

        clear_marketplace_env();
    }
}
