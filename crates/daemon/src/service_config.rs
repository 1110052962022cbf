use std::path::PathBuf;

/// Service-level configuration for the commsec daemon.
#[derive(Debug)]
pub struct Config {
    // http server configuration
    /// Port for the API HTTP server.
    pub api_port: u16,

    // logging
    pub log_level: tracing::Level,
    /// Directory for log files (optional, logs to stdout only if not set)
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_port: 3000,
            log_level: tracing::Level::INFO,
            log_dir: None,
        }
    }
}
