use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

fn default_user_agent() -> String {
    concat!("volley/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Client configuration loaded from `~/.config/volley/config.toml` or built
/// in code. Values apply to every transfer the client starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Maximum concurrent connections for batch requests.
    pub connections: usize,
    /// Total transfer timeout in seconds.
    pub timeout_secs: u64,
    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Follow `Location` headers automatically.
    pub follow_location: bool,
    /// Maximum redirect hops before the transfer fails.
    pub max_redirections: u32,
    /// Verify the peer's TLS certificate.
    pub ssl_verify_peer: bool,
    /// `Accept-Encoding` value; the empty string asks libcurl to offer every
    /// encoding it supports and decode transparently. None disables it.
    #[serde(default)]
    pub accept_encoding: Option<String>,
    /// `User-Agent` header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connections: 8,
            timeout_secs: 200,
            connect_timeout_secs: 180,
            follow_location: true,
            max_redirections: 10,
            ssl_verify_peer: true,
            accept_encoding: Some(String::new()),
            user_agent: default_user_agent(),
        }
    }
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Returns a copy with the given overrides applied. The receiver is left
    /// untouched, so per-call overrides never leak into later requests.
    pub fn merge(&self, overrides: &ConfigOverrides) -> ClientConfig {
        let mut merged = self.clone();
        if let Some(v) = overrides.connections {
            merged.connections = v;
        }
        if let Some(v) = overrides.timeout_secs {
            merged.timeout_secs = v;
        }
        if let Some(v) = overrides.connect_timeout_secs {
            merged.connect_timeout_secs = v;
        }
        if let Some(v) = overrides.follow_location {
            merged.follow_location = v;
        }
        if let Some(v) = overrides.max_redirections {
            merged.max_redirections = v;
        }
        if let Some(v) = overrides.ssl_verify_peer {
            merged.ssl_verify_peer = v;
        }
        if let Some(v) = &overrides.accept_encoding {
            merged.accept_encoding = v.clone();
        }
        if let Some(v) = &overrides.user_agent {
            merged.user_agent = v.clone();
        }
        merged
    }
}

/// Per-call configuration overrides; unset fields keep the client's values.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub connections: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub connect_timeout_secs: Option<u64>,
    pub follow_location: Option<bool>,
    pub max_redirections: Option<u32>,
    pub ssl_verify_peer: Option<bool>,
    pub accept_encoding: Option<Option<String>>,
    pub user_agent: Option<String>,
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("volley")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ClientConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = ClientConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: ClientConfig = toml::from_str(&data)?;
    Ok(cfg)
}
