// ABOUTME: Core constants and environment utilities shared across Flipscan packages
// ABOUTME: Foundational package with no domain logic and no heavy dependencies

pub mod constants;
pub mod env;

// Re-export constants
pub use constants::{APP_NAME, DEFAULT_API_PORT, USER_AGENT};

// Re-export utilities
pub use env::{env_or, optional_env};
