//! Configuration file for the yatube binary
//!
//! Lives at `~/.yatube/config.toml` (override with `YATUBE_CONFIG`).
//! Every section and key is optional; command-line flags and environment
//! variables win over the file, and built-in defaults fill the rest.

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use yatube_server::db::pool::DEFAULT_MAX_CONNECTIONS;
use yatube_server::models::OBJECTS_PER_PAGE;

/// Default bind address for `yatube serve`
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct YatubeConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub database: DatabaseSection,
    #[serde(default)]
    pub site: SiteSection,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    pub bind: Option<SocketAddr>,
    pub cors_permissive: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DatabaseSection {
    pub url: Option<String>,
    pub max_connections: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SiteSection {
    pub posts_per_page: Option<u32>,
}

impl YatubeConfig {
    /// Config file path: `$YATUBE_CONFIG` or `~/.yatube/config.toml`
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("YATUBE_CONFIG") {
            return PathBuf::from(path);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".yatube/config.toml")
    }

    /// Load the default config file; a missing file means all defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file (invalid TOML): {}", path.display()))?;

        tracing::debug!(path = %path.display(), "config file loaded");
        Ok(config)
    }

    /// Database URL: flag/env value first, then the file.
    pub fn database_url(&self, flag: Option<String>) -> Result<String> {
        flag.or_else(|| self.database.url.clone()).context(
            "DATABASE_URL not set. Set via --database-url, DATABASE_URL env, .env, or [database] url in the config file",
        )
    }

    pub fn bind(&self, flag: Option<SocketAddr>) -> SocketAddr {
        flag.or(self.server.bind).unwrap_or_else(|| {
            DEFAULT_BIND
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], 8000)))
        })
    }

    pub fn cors_permissive(&self, flag: bool) -> bool {
        flag || self.server.cors_permissive.unwrap_or(false)
    }

    pub fn max_connections(&self) -> u32 {
        self.database
            .max_connections
            .unwrap_or(DEFAULT_MAX_CONNECTIONS)
    }

    pub fn posts_per_page(&self, flag: Option<u32>) -> u32 {
        flag.or(self.site.posts_per_page).unwrap_or(OBJECTS_PER_PAGE)
    }
}
