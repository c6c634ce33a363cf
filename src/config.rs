use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level hyprgpu configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HyprgpuConfig {
    pub integrator: IntegratorConfig,
    pub compositor: CompositorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegratorConfig {
    /// Wall-clock budget per external step, in seconds.
    pub step_timeout_secs: u64,
    /// Force a specific privilege escalation tool instead of auto-detection.
    pub escalation: Option<String>,
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self {
            step_timeout_secs: 30,
            escalation: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositorConfig {
    /// Override of the compositor config file path.
    pub config_path: Option<PathBuf>,
}

impl HyprgpuConfig {
    /// Load from `config.toml` in the state dir. A missing file yields
    /// defaults; a malformed file warns on stderr and yields defaults.
    pub fn load(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return Self::default(),
        };
        match toml::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("warning: ignoring malformed {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn step_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.integrator.step_timeout_secs)
    }
}
