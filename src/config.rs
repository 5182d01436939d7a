use crate::search::SearchConfig;
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Search index configuration
    #[serde(default)]
    pub search: SearchConfig,
}

impl Config {
    /// Load configuration from the embedded defaults, an optional file and
    /// the environment.
    ///
    /// `path` takes precedence over `CONFIG_PATH`.
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let config_path = path
            .map(str::to_string)
            .or_else(|| std::env::var("CONFIG_PATH").ok())
            .unwrap_or_else(|| "config/default.toml".to_string());

        config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            // Override with config file if it exists
            .add_source(config::File::with_name(&config_path).required(false))
            // Override with environment variables (prefix: STORY_SEARCH__)
            .add_source(
                config::Environment::with_prefix("STORY_SEARCH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8080
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        assert_eq!(default_http_port(), 8080);
        assert_eq!(default_host(), "0.0.0.0");
    }

    #[test]
    fn test_embedded_defaults_parse() {
        let config: Config = config::Config::builder()
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.http_port, 8080);
        assert_eq!(config.search.max_results, 1000);
        assert_eq!(config.search.default_limit, 100);
        assert!(config.search.validate().is_ok());
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config: Config = config::Config::builder()
            .add_source(config::File::from_str(
                "[server]\nhttp_port = 9999\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.http_port, 9999);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.search.writer_heap_size, 50_000_000);
    }
}
