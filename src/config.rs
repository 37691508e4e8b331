use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::store::DEFAULT_IDLE_TTL_SECS;
use crate::ui::Labels;

/// Environment variable naming the configuration file
pub const CONFIG_ENV: &str = "REPEAT_ORDERS_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "repeat_orders.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

// ============================================================================
// Application Configuration
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub cart: CartConfig,
    pub session: SessionConfig,
    pub labels: Labels,
    pub seed: SeedConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartConfig {
    /// Canonical cart page URL; every completed repeat redirects here
    pub cart_url: String,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            cart_url: "/cart".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub cookie_name: String,
    /// Sessions untouched for this many seconds are dropped
    pub idle_ttl_secs: u64,
    /// How often idle sessions are swept
    pub sweep_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "repeat_orders_session".to_string(),
            idle_ttl_secs: DEFAULT_IDLE_TTL_SECS as u64,
            sweep_interval_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// JSON file with products and orders for the in-memory stores
    pub path: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!(path = %path.display(), "No configuration file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Load from the file named by `REPEAT_ORDERS_CONFIG`, or `repeat_orders.toml`
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load(path)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid {
                message: "server.port must be non-zero".to_string(),
            });
        }
        if self.cart.cart_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "cart.cart_url must not be empty".to_string(),
            });
        }
        if self.session.cookie_name.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "session.cookie_name must not be empty".to_string(),
            });
        }
        if self.session.idle_ttl_secs == 0 || self.session.sweep_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                message: "session.idle_ttl_secs and session.sweep_interval_secs must be non-zero"
                    .to_string(),
            });
        }
        Ok(())
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.server.host.clone(), self.server.port)
    }
}
