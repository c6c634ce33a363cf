//! The per-invocation engine: owns the snapshot, preset store, state paths,
//! and command runner, serialises invocations with a lock file, and drives
//! the probe → plan → integrate → mutate pipeline.

use crate::classify::FormFactor;
use crate::config::HyprgpuConfig;
use crate::error::{Error, Result};
use crate::integrator::{self, CommandRunner, ExecutionReport};
use crate::observer::{self, ActionLog, StatusView};
use crate::paths::Paths;
use crate::preset::PresetStore;
use crate::probe::{self, SystemSnapshot};
use crate::profile::{Profile, ProfilePlan, compute_plan, plan::neutral_steps};
use crate::region::{self, RegionHeader, RegionName};
use crate::sysfs::SysfsRoot;
use nix::fcntl::{Flock, FlockArg};

/// What one switch or apply actually did.
#[derive(Debug)]
pub struct Outcome {
    pub profile: Profile,
    pub preset: Option<String>,
    pub report: ExecutionReport,
    pub region_written: bool,
    /// Warnings surfaced to the user, e.g. a missing compositor config on a
    /// profile switch.
    pub warnings: Vec<String>,
}

pub struct Engine<'a> {
    paths: Paths,
    config: HyprgpuConfig,
    sysfs: SysfsRoot,
    runner: &'a dyn CommandRunner,
    store: PresetStore,
    log: ActionLog,
    _lock: Flock<std::fs::File>,
}

impl<'a> Engine<'a> {
    /// Create the state tree, take the exclusive invocation lock, and open
    /// the preset store. A held lock is `Error::Busy`.
    pub fn open(
        paths: Paths,
        sysfs: SysfsRoot,
        runner: &'a dyn CommandRunner,
        log_file: std::path::PathBuf,
    ) -> Result<Self> {
        paths.ensure()?;
        let config = HyprgpuConfig::load(&paths.config_file());

        let lock_path = paths.lock_file();
        let file = std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .open(&lock_path)
            .map_err(|e| Error::io(&lock_path, e))?;
        let lock = Flock::lock(file, FlockArg::LockExclusiveNonblock)
            .map_err(|_| Error::Busy { path: lock_path })?;

        let store = PresetStore::open(paths.presets_file(), paths.active_preset_file())?;
        let paths = match &config.compositor.config_path {
            Some(p) => paths.with_compositor_config(p.clone()),
            None => paths,
        };

        Ok(Self {
            log: ActionLog::new(log_file),
            paths,
            config,
            sysfs,
            runner,
            store,
            _lock: lock,
        })
    }

    pub fn paths(&self) -> &Paths {
        &self.paths
    }

    pub fn store(&self) -> &PresetStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut PresetStore {
        &mut self.store
    }

    /// Probe the hardware and persist the snapshot.
    pub fn detect(&self) -> Result<SystemSnapshot> {
        let snapshot = probe::probe(&self.sysfs, self.runner)?;
        snapshot.save(&self.paths.snapshot_file())?;
        self.log.record(
            "detect",
            serde_json::json!({ "gpus": snapshot.gpus.len() }),
        );
        Ok(snapshot)
    }

    /// Current snapshot: fresh probe, falling back to the persisted one if
    /// the probe finds no display on a headed system.
    fn snapshot(&self) -> Result<SystemSnapshot> {
        match probe::probe(&self.sysfs, self.runner) {
            Ok(snap) => {
                snap.save(&self.paths.snapshot_file())?;
                Ok(snap)
            }
            Err(Error::NoDisplay) => SystemSnapshot::load(&self.paths.snapshot_file())
                .or(Err(Error::NoDisplay)),
            Err(e) => Err(e),
        }
    }

    pub fn status(&self) -> Result<StatusView> {
        let snapshot = self
            .snapshot()
            .unwrap_or_else(|_| SystemSnapshot::empty(false));
        Ok(observer::status(
            snapshot,
            self.runner,
            self.paths.compositor_config(),
            self.store.active()?,
        ))
    }

    /// Active profile id as recorded in the switcher region header.
    pub fn active_profile(&self) -> Option<String> {
        let content = std::fs::read_to_string(self.paths.compositor_config()).ok()?;
        region::region_label(&content, RegionName::Switcher, self.paths.compositor_config())
            .ok()
            .flatten()
    }

    /// Switch to a profile. Clears any layered preset: the preset region is
    /// removed and the active-preset record deleted.
    pub fn switch_profile(&mut self, profile: Profile, force: bool) -> Result<Outcome> {
        if !force && self.active_profile().as_deref() == Some(profile.id()) {
            return Ok(Outcome {
                profile,
                preset: None,
                report: ExecutionReport::default(),
                region_written: false,
                warnings: vec![format!("profile '{}' already active", profile)],
            });
        }

        let snapshot = self.snapshot()?;
        let plan = compute_plan(&snapshot, profile);
        self.check_switchable(&plan, force)?;

        let report = self.run_plan(&plan);
        let mut warnings = Vec::new();

        // Missing compositor config is a warning for profile switches.
        let region_written = match self.write_switcher_region(&snapshot, &plan) {
            Ok(()) => true,
            Err(Error::MissingConfig { path }) => {
                warnings.push(format!(
                    "compositor config {} not found; switcher region not written",
                    path.display()
                ));
                false
            }
            Err(e) => return Err(e),
        };

        if region_written {
            let _ = region::remove_region(self.paths.compositor_config(), RegionName::Preset)?;
        }
        self.store.clear_active()?;

        self.log.record(
            "switch",
            serde_json::json!({
                "profile": profile.id(),
                "template": plan.template_id,
                "failed_steps": report.failed_count(),
                "skipped_steps": report.skipped_count(),
            }),
        );

        Ok(Outcome {
            profile,
            preset: None,
            report,
            region_written,
            warnings,
        })
    }

    /// Apply a preset: run its declared profile's pipeline first when that
    /// profile is not already active, then layer the merged settings into
    /// the preset region.
    pub fn apply_preset(&mut self, id: &str, force: bool) -> Result<Outcome> {
        let preset = self.store.get(id)?.clone();
        let snapshot = self.snapshot()?;
        let plan = compute_plan(&snapshot, preset.gpu_profile);

        let profile_transition =
            force || self.active_profile().as_deref() != Some(preset.gpu_profile.id());
        let report = if profile_transition {
            self.check_switchable(&plan, force)?;
            let report = self.run_plan(&plan);
            self.write_switcher_region(&snapshot, &plan)?;
            report
        } else {
            ExecutionReport::default()
        };

        let merged = plan.settings.merged(&preset.settings);
        let header = RegionHeader {
            label: preset.id.clone(),
            architecture: architecture_label(&snapshot),
            system_type: system_type_label(&snapshot),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        region::apply_region(
            self.paths.compositor_config(),
            RegionName::Preset,
            &header,
            &merged.render(),
        )?;
        self.store.set_active(&preset.id)?;

        self.log.record(
            "apply",
            serde_json::json!({
                "preset": preset.id,
                "profile": preset.gpu_profile.id(),
                "profile_transition": profile_transition,
                "failed_steps": report.failed_count(),
            }),
        );

        Ok(Outcome {
            profile: preset.gpu_profile,
            preset: Some(preset.id),
            report,
            region_written: true,
            warnings: Vec::new(),
        })
    }

    /// Pick a profile from the hardware: mobile hybrid rigs balance, mobile
    /// iGPU-only machines integrate, desktops with a dGPU go discrete.
    pub fn optimize(&mut self, force: bool) -> Result<(Profile, Outcome)> {
        let snapshot = self.snapshot()?;
        let profile = recommend(&snapshot);
        let outcome = self.switch_profile(profile, force)?;
        Ok((profile, outcome))
    }

    /// Remove both managed regions, issue neutral switcher steps, and drop
    /// the active-preset record.
    pub fn reset(&mut self) -> Result<ExecutionReport> {
        let config = self.paths.compositor_config().to_path_buf();
        region::remove_region(&config, RegionName::Preset)?;
        region::remove_region(&config, RegionName::Switcher)?;

        let escalation = self.escalation();
        let report = integrator::execute_steps(
            self.runner,
            &neutral_steps(),
            &[],
            self.config.step_timeout(),
            escalation.as_deref(),
        );
        self.store.clear_active()?;

        self.log.record(
            "reset",
            serde_json::json!({ "failed_steps": report.failed_count() }),
        );
        Ok(report)
    }

    /// Refuse when no declared switcher tool exists and environment deltas
    /// alone cannot express the profile.
    fn check_switchable(&self, plan: &ProfilePlan, force: bool) -> Result<()> {
        if force {
            return Ok(());
        }
        let any_tool = plan.steps.iter().any(|s| self.runner.have(&s.tool));
        if !any_tool && plan.env.is_empty() {
            return Err(Error::NoSwitcher {
                profile: plan.profile.id().to_string(),
            });
        }
        Ok(())
    }

    fn escalation(&self) -> Option<String> {
        integrator::escalation_tool(self.runner, self.config.integrator.escalation.as_deref())
    }

    fn run_plan(&self, plan: &ProfilePlan) -> ExecutionReport {
        let escalation = self.escalation();
        integrator::execute_steps(
            self.runner,
            &plan.steps,
            &plan.env,
            self.config.step_timeout(),
            escalation.as_deref(),
        )
    }

    fn write_switcher_region(
        &self,
        snapshot: &SystemSnapshot,
        plan: &ProfilePlan,
    ) -> Result<()> {
        let mut body = plan.settings.render();
        if !plan.env.is_empty() {
            body.push('\n');
            for (k, v) in &plan.env {
                body.push_str(&format!("env = {},{}\n", k, v));
            }
        }
        let header = RegionHeader {
            label: plan.profile.id().to_string(),
            architecture: architecture_label(snapshot),
            system_type: system_type_label(snapshot),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        region::apply_region(
            self.paths.compositor_config(),
            RegionName::Switcher,
            &header,
            &body,
        )
    }
}

fn architecture_label(snapshot: &SystemSnapshot) -> String {
    snapshot
        .primary_gpu()
        .map(|g| g.architecture.to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}

fn system_type_label(snapshot: &SystemSnapshot) -> String {
    if snapshot.is_mobile_system {
        "Mobile".to_string()
    } else {
        "Desktop".to_string()
    }
}

/// The `optimize` heuristic.
pub fn recommend(snapshot: &SystemSnapshot) -> Profile {
    let has_discrete = snapshot.discrete_gpu().is_some();
    let has_integrated = snapshot.integrated_gpu().is_some()
        || snapshot.gpus.iter().any(|g| {
            matches!(
                g.form_factor,
                FormFactor::Mobile | FormFactor::MobileApu | FormFactor::DesktopApu
            )
        });

    match (snapshot.is_mobile_system, has_discrete, has_integrated) {
        (true, true, _) => Profile::Balanced,
        (true, false, _) => Profile::Integrated,
        (false, true, _) => Profile::Discrete,
        (false, false, _) => Profile::Integrated,
    }
}
