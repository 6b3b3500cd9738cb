/// Service name used in logs and health responses.
pub const APP_NAME: &str = "flipscan";

/// User-Agent header sent on outbound marketplace calls.
pub const USER_AGENT: &str = concat!("flipscan/", env!("CARGO_PKG_VERSION"));

/// Default port for the API server when PORT is not set.
pub const DEFAULT_API_PORT: u16 = 4800;
