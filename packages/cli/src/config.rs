use std::num::ParseIntError;

use flipscan_core::{env_or, DEFAULT_API_PORT};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid port number: {0}")]
    InvalidPort(#[from] ParseIntError),
    #[error("Port {0} is out of valid range (1-65535)")]
    PortOutOfRange(u16),
}

#[derive(Debug)]
pub struct Config {
    pub port: u16,
    pub cors_origin: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port_str = env_or("PORT", &DEFAULT_API_PORT.to_string());
        let port = port_str.parse::<u16>()?;

        if port == 0 {
            return Err(ConfigError::PortOutOfRange(port));
        }

        let cors_origin = env_or("CORS_ORIGIN", "http://localhost:5173");

        Ok(Config { port, cors_origin })
    }
}
