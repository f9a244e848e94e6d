use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use crate::http::path::canonicalize;
use crate::resource::ResourceTable;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "PINHOLE_CONFIG";

pub const DEFAULT_CONFIG_PATH: &str = "/etc/pinhole.yaml";

/// Everything the responder needs, read once at start-up and never changed.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Prefixed to relative resource paths
    pub root: PathBuf,
    /// Diagnostic log; stderr when unset
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    pub visit_log: VisitLogConfig,
    /// The complete environment given to programs
    #[serde(default)]
    pub environment: BTreeMap<String, String>,
    #[serde(default = "default_program_timeout_ms")]
    pub program_timeout_ms: u64,
    #[serde(default = "default_max_request_bytes")]
    pub max_request_bytes: usize,
    /// Accept connections here instead of serving stdin/stdout
    #[serde(default)]
    pub listen_addr: Option<String>,
    pub resources: ResourceTable,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VisitLogConfig {
    pub path: PathBuf,
    /// Must not exist in normal operation; created and removed around
    /// every append
    pub lock: PathBuf,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_backoff_unit_ms")]
    pub backoff_unit_ms: u64,
}

fn default_program_timeout_ms() -> u64 {
    30_000
}

fn default_max_request_bytes() -> usize {
    64 * 1024
}

fn default_max_attempts() -> u32 {
    10
}

fn default_backoff_unit_ms() -> u64 {
    1000
}

impl Config {
    /// Loads the file named by `PINHOLE_CONFIG`, or the default path.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::from_file(Path::new(&path))
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn from_yaml(text: &str) -> anyhow::Result<Self> {
        let config: Config = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        for resource in self.resources.iter() {
            let canonical = canonicalize(&resource.name);
            if canonical != resource.name {
                anyhow::bail!(
                    "resource name {:?} is not canonical (expected {:?})",
                    resource.name,
                    canonical
                );
            }
        }
        Ok(())
    }

    pub fn program_timeout(&self) -> Duration {
        Duration::from_millis(self.program_timeout_ms)
    }
}
