//! State directory layout. Everything lives under
//! `~/.config/hyprsupreme/`; the root is injectable so tests run against a
//! tempdir.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

pub const STATE_DIR_NAME: &str = "hyprsupreme";

#[derive(Debug, Clone)]
pub struct Paths {
    state_dir: PathBuf,
    compositor_config: PathBuf,
}

impl Paths {
    /// Resolve against the real user config directory.
    pub fn system() -> Result<Self> {
        let config = dirs::config_dir()
            .ok_or_else(|| Error::State("cannot resolve config directory (no HOME)".to_string()))?;
        Ok(Self {
            state_dir: config.join(STATE_DIR_NAME),
            compositor_config: config.join("hypr").join("hyprland.conf"),
        })
    }

    /// Rooted layout for tests: state dir and compositor config both live
    /// under `root`.
    pub fn rooted(root: &Path) -> Self {
        Self {
            state_dir: root.join(STATE_DIR_NAME),
            compositor_config: root.join("hypr").join("hyprland.conf"),
        }
    }

    pub fn with_compositor_config(mut self, path: PathBuf) -> Self {
        self.compositor_config = path;
        self
    }

    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    pub fn compositor_config(&self) -> &Path {
        &self.compositor_config
    }

    pub fn snapshot_file(&self) -> PathBuf {
        self.state_dir.join("gpu_config.json")
    }

    pub fn presets_dir(&self) -> PathBuf {
        self.state_dir.join("gpu_presets")
    }

    pub fn presets_file(&self) -> PathBuf {
        self.presets_dir().join("presets.json")
    }

    pub fn active_preset_file(&self) -> PathBuf {
        self.presets_dir().join("active_preset")
    }

    pub fn switcher_log(&self) -> PathBuf {
        self.state_dir.join("gpu_switcher.log")
    }

    pub fn presets_log(&self) -> PathBuf {
        self.state_dir.join("gpu_presets.log")
    }

    pub fn benchmarks_dir(&self) -> PathBuf {
        self.state_dir.join("benchmarks")
    }

    pub fn lock_file(&self) -> PathBuf {
        self.state_dir.join("engine.lock")
    }

    pub fn config_file(&self) -> PathBuf {
        self.state_dir.join("config.toml")
    }

    /// Create the state directory tree.
    pub fn ensure(&self) -> Result<()> {
        for dir in [&self.state_dir, &self.presets_dir(), &self.benchmarks_dir()] {
            std::fs::create_dir_all(dir).map_err(|e| Error::io(dir.clone(), e))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_rooted_layout() {
        let tmp = TempDir::new().unwrap();
        let paths = Paths::rooted(tmp.path());
        assert!(paths.presets_file().ends_with("hyprsupreme/gpu_presets/presets.json"));
        assert!(paths.compositor_config().ends_with("hypr/hyprland.conf"));
        assert!(paths.lock_file().ends_with("hyprsupreme/engine.lock"));
    }

    #[test]
    fn test_ensure_creates_tree() {
        let tmp = TempDir::new().unwrap();
        let paths = Paths::rooted(tmp.path());
        paths.ensure().unwrap();
        assert!(paths.presets_dir().is_dir());
        assert!(paths.benchmarks_dir().is_dir());
    }
}
