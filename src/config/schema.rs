//! Configuration schema definitions

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub console: ConsoleConfig,
}

/// Backend API location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Fixed base address every resource operation is resolved against
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    "http://localhost:5000/api".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

/// Where the durable session slots live
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SessionConfig {
    /// Overrides the default `$HOME/.attendify/session.json`
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl SessionConfig {
    /// Resolve the session file location
    pub fn resolved_path(&self) -> PathBuf {
        if let Some(path) = &self.path {
            return path.clone();
        }
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".attendify").join("session.json")
    }
}

/// Console routing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Login entry point protected views redirect to
    #[serde(default = "default_login_route")]
    pub login_route: String,
}

fn default_login_route() -> String {
    "/login".to_string()
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            login_route: default_login_route(),
        }
    }
}
