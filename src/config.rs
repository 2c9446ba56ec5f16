use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Catalog API base URL (default: "http://localhost:8000/api/v1")
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Quiet period in milliseconds between the last filter edit and the
    /// fetch it causes (default: 400)
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Per-catalog page sizes
    #[serde(default)]
    pub catalogs: Catalogs,
}

fn default_base_url() -> String {
    "http://localhost:8000/api/v1".to_string()
}

fn default_debounce_ms() -> u64 {
    400
}

/// Page sizes for the three catalog views
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalogs {
    /// Badge grid fits 3 columns of 7 rows
    #[serde(default = "default_badges_per_page")]
    pub badges_per_page: u32,
    #[serde(default = "default_per_page")]
    pub issuers_per_page: u32,
    #[serde(default = "default_per_page")]
    pub pathways_per_page: u32,
}

fn default_badges_per_page() -> u32 {
    21
}

fn default_per_page() -> u32 {
    20
}

impl Default for Catalogs {
    fn default() -> Self {
        Self {
            badges_per_page: default_badges_per_page(),
            issuers_per_page: default_per_page(),
            pathways_per_page: default_per_page(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            debounce_ms: default_debounce_ms(),
            catalogs: Catalogs::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, environment, and CLI arguments
    pub fn load(
        config_path: Option<&PathBuf>,
        cli_base_url: Option<&str>,
        cli_debounce_ms: Option<u64>,
    ) -> anyhow::Result<Self> {
        // Start with default config
        let mut config = if let Some(path) = config_path {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)?
        } else {
            // Try default config file
            if let Ok(content) = std::fs::read_to_string("pageturner.toml") {
                toml::from_str(&content)?
            } else {
                Config::default()
            }
        };

        // Override with environment variables
        if let Ok(base_url) = std::env::var("PAGETURNER_BASE_URL") {
            config.base_url = base_url;
        }
        if let Ok(debounce) = std::env::var("PAGETURNER_DEBOUNCE_MS") {
            if let Ok(ms) = debounce.parse() {
                config.debounce_ms = ms;
            }
        }

        // Override with CLI arguments
        if let Some(base_url) = cli_base_url {
            config.base_url = base_url.to_string();
        }
        if let Some(ms) = cli_debounce_ms {
            config.debounce_ms = ms;
        }

        Ok(config)
    }
}
