// ABOUTME: In-memory store for pending PKCE authorization attempts
// ABOUTME: Bounded, TTL-enforced map keyed by the CSRF state parameter

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tracing::warn;

/// Entries older than this are invalid for exchange and removed by the sweep.
const AUTH_STATE_TTL_MINUTES: i64 = 10;

/// Cap on concurrently outstanding authorization attempts. Inserting beyond
/// the cap evicts the oldest entry, so repeated status polling while
/// unauthenticated cannot grow the map without bound.
const MAX_PENDING_AUTHORIZATIONS: usize = 128;

/// A PKCE authorization attempt awaiting its redirect callback
#[derive(Debug, Clone)]
pub struct PendingAuthorization {
    pub code_verifier: String,
    pub created_at: DateTime<Utc>,
}

impl PendingAuthorization {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.created_at + Duration::minutes(AUTH_STATE_TTL_MINUTES) < now
    }
}

/// Store of outstanding authorization attempts keyed by state
#[derive(Debug, Default)]
pub struct PendingAuthStore {
    entries: HashMap<String, PendingAuthorization>,
}

impl PendingAuthStore {
    /// Record a new authorization attempt, evicting the oldest entry when full.
    pub fn insert(&mut self, state: String, code_verifier: String) {
        if self.entries.len() >= MAX_PENDING_AUTHORIZATIONS {
            self.evict_oldest();
        }
        self.entries.insert(
            state,
            PendingAuthorization {
                code_verifier,
                created_at: Utc::now(),
            },
        );
    }

    /// Remove and return the attempt for `state`.
    ///
    /// Single-use: the entry is removed whether or not it is still fresh.
    /// Expired entries return `None`, the same as unknown states.
    pub fn take(&mut self, state: &str) -> Option<PendingAuthorization> {
        let entry = self.entries.remove(state)?;
        if entry.is_expired(Utc::now()) {
            return None;
        }
        Some(entry)
    }

    /// Remove all entries strictly older than the TTL. Returns the count removed.
    pub fn purge_expired(&mut self) -> usize {
        let now = Utc::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.created_at)
            .map(|(state, _)| state.clone());

        if let Some(state) = oldest {
            warn!("pending authorization store full; evicting oldest entry");
            self.entries.remove(&state);
        }
    }
}
