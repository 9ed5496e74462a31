// src/config.rs

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path, time::Duration};
use tracing::debug;

/// Local development location of the schema and definitions files; deployments
/// set `IV3_BASE_URL` or `base_url` in the config file.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/iv3/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Prefix every resource filename is appended to.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    /// Load from the YAML file named by `IV3_CONFIG` (if set), then apply
    /// `IV3_BASE_URL` / `IV3_TIMEOUT_SECS` overrides.
    pub fn from_env() -> Result<Self> {
        let mut cfg = match env::var("IV3_CONFIG") {
            Ok(path) => Self::from_file(&path)?,
            Err(_) => Self::default(),
        };
        if let Ok(url) = env::var("IV3_BASE_URL") {
            cfg.base_url = url;
        }
        if let Ok(secs) = env::var("IV3_TIMEOUT_SECS") {
            cfg.request_timeout_secs = secs
                .trim()
                .parse()
                .with_context(|| format!("parsing IV3_TIMEOUT_SECS={:?}", secs))?;
        }
        let cfg = cfg.normalized();
        debug!(base_url = %cfg.base_url, timeout = cfg.request_timeout_secs, "config loaded");
        Ok(cfg)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
        let cfg: Config =
            serde_yaml::from_str(&text).with_context(|| format!("parsing {:?}", path))?;
        Ok(cfg.normalized())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    // filenames are concatenated onto the base, so it has to end in a slash
    fn normalized(mut self) -> Self {
        if !self.base_url.ends_with('/') {
            self.base_url.push('/');
        }
        self
    }
}
