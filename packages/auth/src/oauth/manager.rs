// ABOUTME: Marketplace OAuth manager orchestrating the token lifecycle
// ABOUTME: PKCE authorization, code exchange, refresh, and authenticated API dispatch

use std::time::Duration;

use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::{
    error::{AuthError, AuthResult},
    oauth::{
        config::MarketplaceConfig,
        pkce,
        state::PendingAuthStore,
        tokens::{TokenResponse, TokenSet},
    },
};

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// An authorization request the caller must redirect the user-agent to
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationRequest {
    pub auth_url: String,
    pub state: String,
}

/// Authentication status reported to the application layer
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthStatus {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub needs_authorization: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_url: Option<String>,
}

impl AuthStatus {
    fn authenticated() -> Self {
        Self {
            authenticated: true,
            needs_authorization: None,
            auth_url: None,
        }
    }

    fn needs_authorization(auth_url: String) -> Self {
        Self {
            authenticated: false,
            needs_authorization: Some(true),
            auth_url: Some(auth_url),
        }
    }
}

/// OAuth token lifecycle manager for one connected marketplace account.
///
/// Holds its own token set and pending-authorization store, so isolated
/// instances can be created per test or per connected account. Tokens live
/// only in memory; a process restart requires a fresh authorization flow.
pub struct MarketplaceAuth {
    config: MarketplaceConfig,
    client: Client,
    tokens: Mutex<TokenSet>,
    pending: Mutex<PendingAuthStore>,
}

impl MarketplaceAuth {
    /// Create a manager with an explicit configuration
    pub fn new(config: MarketplaceConfig) -> AuthResult<Self> {
        let client = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .user_agent(flipscan_core::USER_AGENT)
            .build()?;

        Ok(Self {
            config,
            client,
            tokens: Mutex::new(TokenSet::default()),
            pending: Mutex::new(PendingAuthStore::default()),
        })
    }

    /// Create a manager from the process environment.
    ///
    /// Returns `None` when the marketplace client id or secret is not
    /// configured; the surrounding application serves without marketplace
    /// integration in that case.
    pub fn from_env() -> Option<Self> {
        let config = MarketplaceConfig::from_env()?;
        match Self::new(config) {
            Ok(manager) => Some(manager),
            Err(e) => {
                error!("failed to construct marketplace auth manager: {e}");
                None
            }
        }
    }

    pub fn config(&self) -> &MarketplaceConfig {
        &self.config
    }

    /// Start a new authorization attempt.
    ///
    /// Mints a CSRF state and PKCE verifier, records them as pending, and
    /// returns the URL the user-agent must be redirected to.
    pub async fn begin_authorization(&self) -> AuthResult<AuthorizationRequest> {
        let state = pkce::generate_state();
        let challenge = pkce::generate_pkce_challenge();
        let auth_url = self.build_auth_url(&challenge, &state)?;

        self.pending
            .lock()
            .await
            .insert(state.clone(), challenge.code_verifier);

        debug!("issued marketplace authorization request");
        Ok(AuthorizationRequest { auth_url, state })
    }

    /// Exchange an authorization code for tokens.
    ///
    /// The state is single-use: it is consumed here whether or not the
    /// exchange succeeds. Unknown or expired states fail with
    /// [`AuthError::InvalidState`] before any network call.
    pub async fn exchange_code(&self, code: &str, state: &str) -> AuthResult<TokenResponse> {
        let pending = self
            .pending
            .lock()
            .await
            .take(state)
            .ok_or(AuthError::InvalidState)?;

        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("code_verifier", pending.code_verifier.as_str()),
        ];

        let response = self
            .client
            .post(&self.config.token_url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            error!(status, "marketplace token exchange failed");
            return Err(AuthError::TokenExchangeFailed { status, body });
        }

        let token_response: TokenResponse = response.json().await?;
        self.tokens.lock().await.apply(&token_response);

        info!("marketplace account authorized");
        Ok(token_response)
    }

    /// Obtain a new access token using the cached refresh token.
    pub async fn refresh_access_token(&self) -> AuthResult<TokenResponse> {
        let refresh_token = self
            .tokens
            .lock()
            .await
            .refresh_token
            .clone()
            .ok_or(AuthError::NoRefreshToken)?;

        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token.as_str()),
        ];

        let response = self
            .client
            .post(&self.config.token_url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            warn!(status, "marketplace token refresh failed");
            return Err(AuthError::TokenRefreshFailed { status, body });
        }

        let token_response: TokenResponse = response.json().await?;
        self.tokens.lock().await.apply(&token_response);

        debug!("marketplace access token refreshed");
        Ok(token_response)
    }

    /// A valid bearer token, refreshing once if the cached one has expired.
    ///
    /// Fails with [`AuthError::NoValidToken`] when nothing is cached and no
    /// refresh token exists, or [`AuthError::ReauthorizationRequired`] when
    /// the refresh attempt fails (the token set is cleared so the caller is
    /// routed back into the authorization flow).
    pub async fn valid_access_token(&self) -> AuthResult<String> {
        let (cached, has_refresh) = {
            let tokens = self.tokens.lock().await;
            (
                tokens.valid_access_token().map(String::from),
                tokens.refresh_token.is_some(),
            )
        };

        if let Some(token) = cached {
            return Ok(token);
        }
        if !has_refresh {
            return Err(AuthError::NoValidToken);
        }

        match self.refresh_access_token().await {
            Ok(response) => Ok(response.access_token),
            Err(e) => {
                warn!("marketplace refresh failed ({e}); re-authorization required");
                self.tokens.lock().await.clear();
                Err(AuthError::ReauthorizationRequired)
            }
        }
    }

    /// Perform an authenticated GET against the marketplace API
    pub async fn get_json(&self, path: &str) -> AuthResult<Value> {
        self.send(Method::GET, path, None).await
    }

    /// Perform an authenticated request against the marketplace API
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> AuthResult<Value> {
        self.send_with_headers(method, path, body, &[]).await
    }

    /// Perform an authenticated request with extra headers.
    ///
    /// A 401 clears the cached access token (the refresh token is kept) so
    /// the next call goes through a refresh, and surfaces as
    /// [`AuthError::AuthenticationExpired`].
    pub async fn send_with_headers(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        headers: &[(&str, &str)],
    ) -> AuthResult<Value> {
        let token = self.valid_access_token().await?;
        let url = format!("{}{}", self.config.api_base_url, path);

        let mut request = self.client.request(method, &url).bearer_auth(&token);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            warn!("marketplace rejected access token; clearing cached token");
            self.tokens.lock().await.clear_access();
            return Err(AuthError::AuthenticationExpired);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::ApiRequestFailed {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Whether an unexpired access token is cached
    pub async fn is_authenticated(&self) -> bool {
        self.tokens.lock().await.has_valid_access()
    }

    /// Authentication status for the application layer.
    ///
    /// While unauthenticated this mints a fresh authorization request so the
    /// caller always has a usable URL to offer; the pending store is bounded
    /// so repeated polling cannot grow it without limit.
    pub async fn auth_status(&self) -> AuthResult<AuthStatus> {
        if self.is_authenticated().await {
            return Ok(AuthStatus::authenticated());
        }

        let request = self.begin_authorization().await?;
        Ok(AuthStatus::needs_authorization(request.auth_url))
    }

    /// Forget all cached tokens (logout or detected invalidation)
    pub async fn clear_auth(&self) {
        self.tokens.lock().await.clear();
        info!("marketplace authentication cleared");
    }

    /// Remove authorization attempts older than the TTL.
    ///
    /// Invoked by an external scheduler; the manager never schedules itself.
    /// Returns the number of entries removed.
    pub async fn purge_expired_states(&self) -> usize {
        self.pending.lock().await.purge_expired()
    }

    /// Number of outstanding authorization attempts
    pub async fn pending_authorizations(&self) -> usize {
        self.pending.lock().await.len()
    }

    fn build_auth_url(&self, challenge: &pkce::PkceChallenge, state: &str) -> AuthResult<String> {
        let mut url = Url::parse(&self.config.auth_url)
            .map_err(|e| AuthError::Configuration(format!("invalid auth URL: {e}")))?;

        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", &self.config.scopes.join(" "))
            .append_pair("state", state)
            .append_pair("code_challenge", &challenge.code_challenge)
            .append_pair("code_challenge_method", &challenge.code_challenge_method);

        Ok(url.to_string())
    }
}
