use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use crate::http::framer::DEFAULT_MAX_HEADER_SIZE;

/// Env var naming an optional YAML config file.
pub const CONFIG_PATH_ENV: &str = "MESERVER_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub listen_addr: String,
    /// Header block ceiling in bytes; larger requests get 431
    pub max_header_size: usize,
    /// Per-read deadline. Unset means a stalled peer is waited on forever.
    pub read_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8000".to_string(),
            max_header_size: DEFAULT_MAX_HEADER_SIZE,
            read_timeout_secs: None,
        }
    }
}

/// Per-connection limits, copied into every session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_header_size: usize,
    pub read_timeout: Option<Duration>,
}

impl Default for Limits {
    fn default() -> Self {
        Config::default().limits()
    }
}

impl Config {
    /// Loads the YAML file named by `MESERVER_CONFIG` (if set), then applies
    /// the `LISTEN` and `MAX_HEADER_SIZE` env overrides.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => {
                let raw = std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read config file {path}"))?;
                Self::from_yaml(&raw).with_context(|| format!("invalid config file {path}"))?
            }
            Err(_) => Self::default(),
        };

        cfg.apply_env(|key| std::env::var(key).ok())?;
        Ok(cfg)
    }

    pub fn from_yaml(raw: &str) -> anyhow::Result<Self> {
        // An empty document deserializes to unit, not to a defaulted struct.
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Applies overrides from `lookup`, which maps env var names to values.
    pub fn apply_env<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("LISTEN") {
            self.listen_addr = addr;
        }

        if let Some(size) = lookup("MAX_HEADER_SIZE") {
            self.max_header_size = size
                .trim()
                .parse()
                .with_context(|| format!("MAX_HEADER_SIZE is not a byte count: {size}"))?;
        }

        Ok(())
    }

    pub fn limits(&self) -> Limits {
        Limits {
            max_header_size: self.max_header_size,
            read_timeout: self.read_timeout_secs.map(Duration::from_secs),
        }
    }
}
