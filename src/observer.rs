//! Runtime observation: what the system is doing right now, and an
//! append-only record of what this tool did to it.

use crate::error::{Error, Result};
use crate::integrator::CommandRunner;
use crate::probe::{self, SystemSnapshot};
use crate::region::{self, RegionName};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Aggregated view for `status`: hardware plus live mode, renderer, active
/// profile, and active preset.
#[derive(Debug, Clone, serde::Serialize)]
pub struct StatusView {
    pub snapshot: SystemSnapshot,
    pub current_mode: String,
    pub active_renderer: String,
    pub active_profile: Option<String>,
    pub active_preset: Option<String>,
}

/// Build the status view. The compositor config being missing or lacking a
/// managed region just means no active profile/preset.
pub fn status(
    snapshot: SystemSnapshot,
    runner: &dyn CommandRunner,
    compositor_config: &Path,
    active_preset: Option<String>,
) -> StatusView {
    let (active_profile, preset_region) = match std::fs::read_to_string(compositor_config) {
        Ok(content) => (
            region::region_label(&content, RegionName::Switcher, compositor_config)
                .unwrap_or(None),
            region::region_label(&content, RegionName::Preset, compositor_config)
                .unwrap_or(None),
        ),
        Err(_) => (None, None),
    };

    StatusView {
        current_mode: probe::detect_current_mode(runner),
        active_renderer: probe::detect_active_renderer(runner),
        active_profile,
        // the region header is authoritative if the record file is stale
        active_preset: active_preset.or(preset_region),
        snapshot,
    }
}

/// Append-only JSON-lines action log. One object per line; failures to log
/// never fail the operation being logged.
pub struct ActionLog {
    path: PathBuf,
}

impl ActionLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn record(&self, action: &str, detail: serde_json::Value) {
        let entry = serde_json::json!({
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "action": action,
            "detail": detail,
        });
        let _ = self.append(&entry);
    }

    fn append(&self, entry: &serde_json::Value) -> Result<()> {
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| Error::io(&self.path, e))?;
        writeln!(file, "{}", entry).map_err(|e| Error::io(&self.path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrator::testing::ScriptedRunner;
    use crate::region::{RegionHeader, apply_region};
    use tempfile::TempDir;

    fn header(label: &str) -> RegionHeader {
        RegionHeader {
            label: label.to_string(),
            architecture: "Ampere".to_string(),
            system_type: "Mobile".to_string(),
            timestamp: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_status_reads_region_labels() {
        let tmp = TempDir::new().unwrap();
        let conf = tmp.path().join("hyprland.conf");
        std::fs::write(&conf, "monitor=,preferred,auto,1\n").unwrap();
        apply_region(&conf, RegionName::Switcher, &header("performance"), "body").unwrap();
        apply_region(&conf, RegionName::Preset, &header("obs"), "body").unwrap();

        let runner = ScriptedRunner::with_tools(&[]);
        let view = status(SystemSnapshot::empty(true), &runner, &conf, None);
        assert_eq!(view.active_profile.as_deref(), Some("performance"));
        assert_eq!(view.active_preset.as_deref(), Some("obs"));
        assert_eq!(view.current_mode, "unknown");
    }

    #[test]
    fn test_status_missing_config_is_bare() {
        let tmp = TempDir::new().unwrap();
        let runner = ScriptedRunner::with_tools(&[]);
        let view = status(
            SystemSnapshot::empty(false),
            &runner,
            &tmp.path().join("absent.conf"),
            None,
        );
        assert_eq!(view.active_profile, None);
        assert_eq!(view.active_preset, None);
    }

    #[test]
    fn test_active_preset_record_wins_over_region() {
        let tmp = TempDir::new().unwrap();
        let conf = tmp.path().join("hyprland.conf");
        std::fs::write(&conf, "").unwrap();
        apply_region(&conf, RegionName::Preset, &header("obs"), "body").unwrap();

        let runner = ScriptedRunner::with_tools(&[]);
        let view = status(
            SystemSnapshot::empty(true),
            &runner,
            &conf,
            Some("blender".to_string()),
        );
        assert_eq!(view.active_preset.as_deref(), Some("blender"));
    }

    #[test]
    fn test_action_log_appends_json_lines() {
        let tmp = TempDir::new().unwrap();
        let log = ActionLog::new(tmp.path().join("gpu_switcher.log"));
        log.record("switch", serde_json::json!({"profile": "discrete"}));
        log.record("reset", serde_json::json!({}));

        let content = std::fs::read_to_string(tmp.path().join("gpu_switcher.log")).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["action"], "switch");
        assert_eq!(first["detail"]["profile"], "discrete");
        assert!(first["timestamp"].is_string());
    }
}
