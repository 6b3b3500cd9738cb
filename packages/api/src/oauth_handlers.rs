// ABOUTME: HTTP request handlers for marketplace OAuth authentication
// ABOUTME: Status, redirect callback, and disconnect endpoints around the auth manager

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Response,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};

use flipscan_auth::AuthError;

use crate::response::{error_json, ok_json, ok_or_internal_error};
use crate::AuthState;

/// Query parameters delivered on the marketplace redirect
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Get marketplace authentication status.
///
/// While unauthenticated the response carries a fresh authorization URL the
/// frontend can send the user to.
pub async fn get_auth_status(State(auth): State<AuthState>) -> Response {
    let result = auth.auth_status().await;
    ok_or_internal_error(result, "Failed to get marketplace auth status")
}

/// Complete the authorization flow from the marketplace redirect
pub async fn oauth_callback(
    State(auth): State<AuthState>,
    Query(query): Query<CallbackQuery>,
) -> Response {
    if let Some(error) = query.error {
        warn!("marketplace authorization denied: {error}");
        return error_json(
            StatusCode::BAD_REQUEST,
            format!("authorization denied: {error}"),
        );
    }

    let (Some(code), Some(state)) = (query.code, query.state) else {
        return error_json(StatusCode::BAD_REQUEST, "missing code or state parameter");
    };

    match auth.exchange_code(&code, &state).await {
        Ok(_) => {
            info!("marketplace account connected");
            ok_json(json!({ "message": "marketplace account connected" }))
        }
        Err(e @ AuthError::InvalidState) => error_json(StatusCode::BAD_REQUEST, e.to_string()),
        Err(e) => {
            error!("marketplace token exchange failed: {e}");
            error_json(StatusCode::BAD_GATEWAY, e.to_string())
        }
    }
}

/// Disconnect the marketplace account (forget cached tokens)
pub async fn logout(State(auth): State<AuthState>) -> Response {
    auth.clear_auth().await;
    ok_json(json!({ "message": "marketplace account disconnected" }))
}
