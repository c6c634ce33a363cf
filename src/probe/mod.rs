//! Hardware probe: enumerate GPUs from the PCI bus and embedded nodes,
//! classify each, and capture the system-wide snapshot downstream components
//! consume read-only.

pub mod embedded;
pub mod mobile;
pub mod pci;

use crate::classify::{self, Architecture, FormFactor, Vendor};
use crate::error::{Error, Result};
use crate::integrator::CommandRunner;
use crate::sysfs::SysfsRoot;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// One detected GPU.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GpuDescriptor {
    pub vendor: Vendor,
    pub raw_description: String,
    pub architecture: Architecture,
    pub form_factor: FormFactor,
    pub index: usize,
}

/// Immutable product of one probe run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemSnapshot {
    pub gpus: Vec<GpuDescriptor>,
    pub is_mobile_system: bool,
    pub current_mode: String,
    pub active_renderer: String,
    pub detected_at: String,
}

impl SystemSnapshot {
    /// Snapshot with no GPUs, used when callers choose to continue past a
    /// NoDisplay probe result.
    pub fn empty(is_mobile_system: bool) -> Self {
        Self {
            gpus: Vec::new(),
            is_mobile_system,
            current_mode: "unknown".to_string(),
            active_renderer: "unknown".to_string(),
            detected_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn primary_gpu(&self) -> Option<&GpuDescriptor> {
        self.gpus.first()
    }

    /// The discrete GPU a discrete-leaning profile should target.
    pub fn discrete_gpu(&self) -> Option<&GpuDescriptor> {
        self.gpus.iter().find(|g| {
            matches!(
                g.form_factor,
                FormFactor::DesktopDiscrete | FormFactor::MobileDiscrete
            )
        })
    }

    pub fn integrated_gpu(&self) -> Option<&GpuDescriptor> {
        self.gpus.iter().find(|g| {
            matches!(
                g.form_factor,
                FormFactor::DesktopIntegrated
                    | FormFactor::MobileIntegrated
                    | FormFactor::DesktopApu
                    | FormFactor::MobileApu
                    | FormFactor::Mobile
            )
        })
    }

    pub fn has_vendor(&self, vendor: Vendor) -> bool {
        self.gpus.iter().any(|g| g.vendor == vendor)
    }

    /// Write the snapshot to `gpu_config.json` style persistence.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| Error::State(format!("failed to serialize snapshot: {}", e)))?;
        std::fs::write(path, json).map_err(|e| Error::io(path, e))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        serde_json::from_str(&json)
            .map_err(|e| Error::State(format!("failed to parse snapshot: {}", e)))
    }
}

/// Enumerate and classify all GPUs.
///
/// Repeated probes on unchanged hardware produce identical snapshots modulo
/// `detected_at`. `NoBus` means no enumeration source answered; `NoDisplay`
/// means a source answered with zero graphics devices.
pub fn probe(sysfs: &SysfsRoot, runner: &dyn CommandRunner) -> Result<SystemSnapshot> {
    let is_mobile = mobile::is_mobile_system(sysfs);

    let pci_descriptions = pci::enumerate(sysfs, runner);
    let embedded_present = embedded::source_present(sysfs);

    if pci_descriptions.is_none() && !embedded_present {
        return Err(Error::NoBus);
    }

    let mut descriptions = pci_descriptions.unwrap_or_default();
    descriptions.extend(embedded::enumerate(sysfs));

    if descriptions.is_empty() {
        return Err(Error::NoDisplay);
    }

    let gpus = descriptions
        .into_iter()
        .enumerate()
        .map(|(index, raw)| {
            let (vendor, architecture, form_factor) = classify::classify(&raw, is_mobile);
            GpuDescriptor {
                vendor,
                raw_description: raw,
                architecture,
                form_factor,
                index,
            }
        })
        .collect();

    Ok(SystemSnapshot {
        gpus,
        is_mobile_system: is_mobile,
        current_mode: detect_current_mode(runner),
        active_renderer: detect_active_renderer(runner),
        detected_at: chrono::Utc::now().to_rfc3339(),
    })
}

/// Ask the external switchers which mode is active.
pub fn detect_current_mode(runner: &dyn CommandRunner) -> String {
    let timeout = Duration::from_secs(10);
    if runner.have("prime-select") {
        if let Ok(out) = runner.run("prime-select", &["query".to_string()], &[], timeout) {
            if out.success() && !out.stdout.trim().is_empty() {
                return out.stdout.trim().to_string();
            }
        }
    }
    if runner.have("optimus-manager") {
        if let Ok(out) = runner.run(
            "optimus-manager",
            &["--print-mode".to_string()],
            &[],
            timeout,
        ) {
            if out.success() {
                // "Current GPU mode : hybrid"
                if let Some(mode) = out.stdout.rsplit(':').next() {
                    let mode = mode.trim();
                    if !mode.is_empty() {
                        return mode.to_string();
                    }
                }
            }
        }
    }
    "unknown".to_string()
}

/// Read the active renderer from the running GL stack.
pub fn detect_active_renderer(runner: &dyn CommandRunner) -> String {
    if runner.have("glxinfo") {
        if let Ok(out) = runner.run(
            "glxinfo",
            &["-B".to_string()],
            &[],
            Duration::from_secs(10),
        ) {
            if out.success() {
                for line in out.stdout.lines() {
                    if let Some(renderer) = line.trim().strip_prefix("OpenGL renderer string:") {
                        return renderer.trim().to_string();
                    }
                }
            }
        }
    }
    "unknown".to_string()
}
