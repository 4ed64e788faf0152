//! Client configuration.

use serde::{Deserialize, Serialize};

/// Console endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Base URL of the scheduler console, without the `/api/v2` suffix
    pub base_url: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        let base_url = std::env::var("RELMAN_API_URL")
            .unwrap_or_else(|_| "http://localhost:8080".to_string());
        ConsoleConfig::new(&base_url)
    }
}

impl ConsoleConfig {
    /// Create a config from the `RELMAN_API_URL` environment variable.
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Create a config for a specific console instance.
    pub fn new(base_url: &str) -> Self {
        ConsoleConfig {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}
