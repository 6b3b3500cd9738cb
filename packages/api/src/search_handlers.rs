// ABOUTME: Authenticated marketplace search proxy used by the pricing layer
// ABOUTME: Forwards item-summary searches with the managed bearer token attached

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Response,
};
use serde::Deserialize;
use tracing::{error, warn};

use flipscan_auth::AuthError;

use crate::response::{error_json, ok_json};
use crate::AuthState;

fn default_limit() -> u32 {
    10
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

/// Search marketplace listings for comparable items
pub async fn search_listings(
    State(auth): State<AuthState>,
    Query(query): Query<SearchQuery>,
) -> Response {
    let term = query.q.trim();
    if term.is_empty() {
        return error_json(StatusCode::BAD_REQUEST, "search query must not be empty");
    }

    let path = format!(
        "/buy/browse/v1/item_summary/search?q={}&limit={}",
        urlencoding::encode(term),
        query.limit
    );

    match auth.get_json(&path).await {
        Ok(body) => ok_json(body),
        Err(
            e @ (AuthError::NoValidToken
            | AuthError::ReauthorizationRequired
            | AuthError::AuthenticationExpired),
        ) => {
            warn!("marketplace search rejected: {e}");
            error_json(StatusCode::UNAUTHORIZED, e.to_string())
        }
        Err(e) => {
            error!("marketplace search failed: {e}");
            error_json(StatusCode::BAD_GATEWAY, e.to_string())
        }
    }
}
