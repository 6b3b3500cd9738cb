use std::env;

/// Read an environment variable, treating unset and empty values the same.
///
/// Whitespace-only values count as empty so a stray `VAR=" "` in a .env file
/// does not masquerade as configuration.
pub fn optional_env(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Err(_) => None,
    }
}

/// Read an environment variable with a fallback default.
pub fn env_or(name: &str, default: &str) -> String {
    optional_env(name).unwrap_or_else(|| default.to_string())
}
