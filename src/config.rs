//! Server configuration

use std::env;

/// Runtime configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct LimitsConfig {
    /// Upper bound for a request body, uploads included.
    pub max_upload_bytes: usize,
}

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MAX_UPLOAD_MB: usize = 50;

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: DEFAULT_PORT,
            },
            limits: LimitsConfig {
                max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Config::default();

        Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: env::var("SERVER_PORT")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.server.port),
            },
            limits: LimitsConfig {
                max_upload_bytes: env::var("MAX_UPLOAD_MB")
                    .ok()
                    .and_then(|v| v.parse::<usize>().ok())
                    .map(|mb| mb * 1024 * 1024)
                    .unwrap_or(defaults.limits.max_upload_bytes),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.limits.max_upload_bytes, 50 * 1024 * 1024);
    }
}
