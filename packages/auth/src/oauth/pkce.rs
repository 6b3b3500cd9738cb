// ABOUTME: PKCE (Proof Key for Code Exchange) implementation for OAuth 2.0
// ABOUTME: Generates state/verifier strings and SHA256 challenges per RFC 7636

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::Rng;
use sha2::{Digest, Sha256};

/// RFC 7636 unreserved characters: ALPHA / DIGIT / "-" / "." / "_" / "~"
const UNRESERVED: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-._~";

/// Length of the CSRF state parameter.
const STATE_LENGTH: usize = 32;

/// Length of the code verifier (RFC 7636 allows 43-128; the longest is used).
const VERIFIER_LENGTH: usize = 128;

/// PKCE challenge for an authorization request
#[derive(Debug, Clone)]
pub struct PkceChallenge {
    pub code_verifier: String,
    pub code_challenge: String,
    pub code_challenge_method: String, // Always "S256"
}

/// Generate a PKCE challenge for an authorization request
///
/// Generates a 128-character random code verifier and computes the SHA256
/// challenge according to RFC 7636.
pub fn generate_pkce_challenge() -> PkceChallenge {
    let code_verifier = random_unreserved(VERIFIER_LENGTH);
    let code_challenge = code_challenge(&code_verifier);

    PkceChallenge {
        code_verifier,
        code_challenge,
        code_challenge_method: "S256".to_string(),
    }
}

/// Generate a random state parameter for CSRF protection
pub fn generate_state() -> String {
    random_unreserved(STATE_LENGTH)
}

/// Random string over the RFC 7636 unreserved alphabet
fn random_unreserved(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..UNRESERVED.len());
            UNRESERVED[idx] as char
        })
        .collect()
}

/// SHA256 code challenge from a verifier, base64url-encoded without padding
pub fn code_challenge(verifier: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

/// Verify that a code verifier matches a code challenge
///
/// This is normally done by the authorization server, but is useful for
/// testing and validation.
pub fn verify_pkce_challenge(verifier: &str, challenge: &str) -> bool {
    code_challenge(verifier) == challenge
}
