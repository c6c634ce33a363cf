//! Plan computation: snapshot + requested profile in, pure `ProfilePlan`
//! out. The plan is data only; the integrator performs the effects.

use crate::classify::{EffectsTier, Vendor};
use crate::integrator::ExternalStep;
use crate::probe::{GpuDescriptor, SystemSnapshot};
use crate::profile::Profile;
use crate::settings::CompositorSettings;

const INTEL_ICD: &str = "/usr/share/vulkan/icd.d/intel_icd.x86_64.json";
const NVIDIA_ICD: &str = "/usr/share/vulkan/icd.d/nvidia_icd.json";
const RADEON_ICD: &str = "/usr/share/vulkan/icd.d/radeon_icd.x86_64.json";

/// Deterministic action plan for one profile on one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfilePlan {
    pub profile: Profile,
    pub steps: Vec<ExternalStep>,
    pub env: Vec<(String, String)>,
    pub settings: CompositorSettings,
    /// Template id plus variant, e.g. "rich/mobile/high".
    pub template_id: String,
}

impl ProfilePlan {
    /// Distinct external tools this plan would invoke, in declared order.
    pub fn switch_tools(&self) -> Vec<&str> {
        let mut tools: Vec<&str> = Vec::new();
        for step in &self.steps {
            if !tools.contains(&step.tool.as_str()) {
                tools.push(&step.tool);
            }
        }
        tools
    }
}

/// The GPU whose generation drives the settings template for this profile.
fn lead_gpu<'a>(snapshot: &'a SystemSnapshot, profile: Profile) -> Option<&'a GpuDescriptor> {
    match profile {
        Profile::Integrated | Profile::PowerSave => snapshot
            .integrated_gpu()
            .or_else(|| snapshot.primary_gpu()),
        Profile::Discrete | Profile::Performance => snapshot
            .discrete_gpu()
            .or_else(|| snapshot.primary_gpu()),
        Profile::Hybrid | Profile::Balanced => snapshot
            .discrete_gpu()
            .or_else(|| snapshot.primary_gpu()),
    }
}

/// Compute the action plan. Pure function of the snapshot and profile:
/// repeated calls yield identical plans.
pub fn compute_plan(snapshot: &SystemSnapshot, profile: Profile) -> ProfilePlan {
    let lead = lead_gpu(snapshot, profile);
    let tier = lead
        .map(|g| g.architecture.effects_tier())
        .unwrap_or(EffectsTier::Low);
    let mobile = snapshot.is_mobile_system;
    let has_nvidia = snapshot.has_vendor(Vendor::Nvidia);
    let has_amd_discrete = snapshot
        .discrete_gpu()
        .is_some_and(|g| g.vendor == Vendor::Amd);

    let mut steps = Vec::new();
    let mut env: Vec<(String, String)> = Vec::new();
    let push_env = |env: &mut Vec<(String, String)>, k: &str, v: &str| {
        env.push((k.to_string(), v.to_string()));
    };

    match profile {
        Profile::Integrated | Profile::PowerSave => {
            steps.push(ExternalStep::privileged(
                "prime-select",
                &["intel"],
                "route rendering to the iGPU",
            ));
            steps.push(ExternalStep::new(
                "optimus-manager",
                &["--switch", "integrated", "--no-confirm"],
                "switch optimus mode to integrated",
            ));
            push_env(&mut env, "DRI_PRIME", "0");
            push_env(&mut env, "VK_ICD_FILENAMES", INTEL_ICD);
        }
        Profile::Discrete | Profile::Performance => {
            if has_nvidia {
                steps.push(ExternalStep::privileged(
                    "prime-select",
                    &["nvidia"],
                    "route rendering to the NVIDIA dGPU",
                ));
                steps.push(ExternalStep::new(
                    "optimus-manager",
                    &["--switch", "nvidia", "--no-confirm"],
                    "switch optimus mode to nvidia",
                ));
                push_env(&mut env, "__GLX_VENDOR_LIBRARY_NAME", "nvidia");
                push_env(&mut env, "__VK_LAYER_NV_optimus", "NVIDIA_only");
                push_env(&mut env, "VK_ICD_FILENAMES", NVIDIA_ICD);
                push_env(&mut env, "LIBVA_DRIVER_NAME", "nvidia");
                push_env(&mut env, "GBM_BACKEND", "nvidia-drm");
                push_env(&mut env, "WLR_NO_HARDWARE_CURSORS", "1");
            } else {
                push_env(&mut env, "DRI_PRIME", "1");
                push_env(&mut env, "VK_ICD_FILENAMES", RADEON_ICD);
            }
        }
        Profile::Hybrid | Profile::Balanced => {
            steps.push(ExternalStep::privileged(
                "prime-select",
                &["on-demand"],
                "route rendering on demand",
            ));
            steps.push(ExternalStep::new(
                "optimus-manager",
                &["--switch", "hybrid", "--no-confirm"],
                "switch optimus mode to hybrid",
            ));
            push_env(&mut env, "DRI_PRIME", "1");
            if has_nvidia {
                push_env(
                    &mut env,
                    "VK_ICD_FILENAMES",
                    &format!("{}:{}", INTEL_ICD, NVIDIA_ICD),
                );
                push_env(&mut env, "__VK_LAYER_NV_optimus", "NVIDIA_only");
            }
        }
    }

    // Profile-specific platform uplift on top of the routing steps.
    match profile {
        Profile::Performance => {
            if has_nvidia {
                steps.push(ExternalStep::new(
                    "nvidia-settings",
                    &["-a", "[gpu:0]/GPUPowerMizerMode=1"],
                    "prefer maximum performance clocks",
                ));
                steps.push(ExternalStep::privileged(
                    "nvidia-smi",
                    &["-pm", "1"],
                    "enable persistence mode",
                ));
            }
            if has_amd_discrete {
                steps.push(ExternalStep::privileged(
                    "rocm-smi",
                    &["--setperflevel", "high"],
                    "force high DPM level",
                ));
            }
        }
        Profile::PowerSave => {
            steps.push(ExternalStep::privileged(
                "cpupower",
                &["frequency-set", "-g", "powersave"],
                "set CPU governor to powersave",
            ));
            if snapshot.has_vendor(Vendor::Amd) {
                steps.push(ExternalStep::privileged(
                    "rocm-smi",
                    &["--setperflevel", "low"],
                    "force low DPM level",
                ));
            }
        }
        Profile::Balanced => {
            if snapshot.has_vendor(Vendor::Amd) {
                steps.push(ExternalStep::privileged(
                    "rocm-smi",
                    &["--setperflevel", "auto"],
                    "restore automatic DPM",
                ));
            }
        }
        _ => {}
    }

    let template = profile.template();
    let settings = template.settings(tier, mobile);
    let template_id = format!(
        "{}/{}/{}",
        template.id(),
        if mobile { "mobile" } else { "desktop" },
        match tier {
            EffectsTier::High => "high",
            EffectsTier::Mid => "mid",
            EffectsTier::Low => "low",
        }
    );

    ProfilePlan {
        profile,
        steps,
        env,
        settings,
        template_id,
    }
}

/// Steps that move every switcher back to a neutral routing mode, used by
/// `reset`. Best-effort like everything else.
pub fn neutral_steps() -> Vec<ExternalStep> {
    vec![
        ExternalStep::privileged(
            "prime-select",
            &["on-demand"],
            "restore on-demand routing",
        ),
        ExternalStep::new(
            "optimus-manager",
            &["--switch", "hybrid", "--no-confirm"],
            "restore hybrid optimus mode",
        ),
        ExternalStep::privileged(
            "rocm-smi",
            &["--setperflevel", "auto"],
            "restore automatic DPM",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{Architecture, FormFactor};
    use crate::probe::GpuDescriptor;

    fn gpu(
        vendor: Vendor,
        arch: Architecture,
        form: FormFactor,
        index: usize,
        raw: &str,
    ) -> GpuDescriptor {
        GpuDescriptor {
            vendor,
            raw_description: raw.to_string(),
            architecture: arch,
            form_factor: form,
            index,
        }
    }

    fn hybrid_ampere_laptop() -> SystemSnapshot {
        SystemSnapshot {
            gpus: vec![
                gpu(
                    Vendor::Intel,
                    Architecture::XeLp,
                    FormFactor::MobileIntegrated,
                    0,
                    "Intel Iris Xe",
                ),
                gpu(
                    Vendor::Nvidia,
                    Architecture::Ampere,
                    FormFactor::MobileDiscrete,
                    1,
                    "NVIDIA GA106M",
                ),
            ],
            is_mobile_system: true,
            current_mode: "unknown".to_string(),
            active_renderer: "unknown".to_string(),
            detected_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    fn intel_only_laptop() -> SystemSnapshot {
        SystemSnapshot {
            gpus: vec![gpu(
                Vendor::Intel,
                Architecture::XeLp,
                FormFactor::MobileIntegrated,
                0,
                "Intel Iris Xe",
            )],
            is_mobile_system: true,
            current_mode: "unknown".to_string(),
            active_renderer: "unknown".to_string(),
            detected_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_plan_is_deterministic() {
        let snap = hybrid_ampere_laptop();
        for p in crate::profile::ALL_PROFILES {
            assert_eq!(compute_plan(&snap, *p), compute_plan(&snap, *p));
        }
    }

    #[test]
    fn test_prime_ordered_before_optimus() {
        let plan = compute_plan(&hybrid_ampere_laptop(), Profile::Hybrid);
        let tools = plan.switch_tools();
        let prime = tools.iter().position(|t| *t == "prime-select").unwrap();
        let optimus = tools.iter().position(|t| *t == "optimus-manager").unwrap();
        assert!(prime < optimus);
    }

    #[test]
    fn test_discrete_nvidia_env() {
        let plan = compute_plan(&hybrid_ampere_laptop(), Profile::Discrete);
        let env: Vec<&str> = plan.env.iter().map(|(k, _)| k.as_str()).collect();
        assert!(env.contains(&"GBM_BACKEND"));
        assert!(env.contains(&"WLR_NO_HARDWARE_CURSORS"));
        assert!(env.contains(&"__GLX_VENDOR_LIBRARY_NAME"));
        assert!(!env.contains(&"DRI_PRIME"));
    }

    #[test]
    fn test_integrated_sets_dri_prime_zero() {
        let plan = compute_plan(&hybrid_ampere_laptop(), Profile::Integrated);
        assert!(plan
            .env
            .contains(&("DRI_PRIME".to_string(), "0".to_string())));
    }

    #[test]
    fn test_hybrid_sets_dri_prime_one() {
        let plan = compute_plan(&hybrid_ampere_laptop(), Profile::Hybrid);
        assert!(plan
            .env
            .contains(&("DRI_PRIME".to_string(), "1".to_string())));
    }

    #[test]
    fn test_performance_adds_vendor_uplift() {
        let plan = compute_plan(&hybrid_ampere_laptop(), Profile::Performance);
        assert!(plan.steps.iter().any(|s| s.tool == "nvidia-smi"));
        assert!(plan.steps.iter().any(|s| s.tool == "nvidia-settings"));
        assert_eq!(plan.settings.misc.vrr, 2);
    }

    #[test]
    fn test_power_save_adds_governor_step() {
        let plan = compute_plan(&hybrid_ampere_laptop(), Profile::PowerSave);
        assert!(plan.steps.iter().any(|s| s.tool == "cpupower"));
        assert!(!plan.settings.decoration.blur);
        assert!(!plan.settings.animations.enabled);
    }

    #[test]
    fn test_intel_only_integrated_template_is_mobile_minimal() {
        let plan = compute_plan(&intel_only_laptop(), Profile::Integrated);
        assert_eq!(plan.template_id, "minimal/mobile/mid");
        assert!(!plan.settings.decoration.blur);
        assert!(!plan.settings.animations.enabled);
        assert!(plan.settings.misc.vfr);
    }

    #[test]
    fn test_amd_discrete_uses_dri_prime_not_nvidia_env() {
        let mut snap = hybrid_ampere_laptop();
        snap.gpus[1] = gpu(
            Vendor::Amd,
            Architecture::Rdna2,
            FormFactor::MobileDiscrete,
            1,
            "AMD Navi 22",
        );
        let plan = compute_plan(&snap, Profile::Discrete);
        assert!(plan
            .env
            .contains(&("DRI_PRIME".to_string(), "1".to_string())));
        assert!(!plan.env.iter().any(|(k, _)| k == "GBM_BACKEND"));
    }

    #[test]
    fn test_mobile_high_tier_gets_mobile_rich_variant() {
        let mut snap = hybrid_ampere_laptop();
        snap.gpus[1].architecture = Architecture::AdaLovelace;
        let plan = compute_plan(&snap, Profile::Discrete);
        assert_eq!(plan.template_id, "rich/mobile/high");
        assert_eq!(plan.settings.decoration.blur_size, 6);
        assert_eq!(plan.settings.decoration.blur_passes, 2);
    }

    #[test]
    fn test_neutral_steps_cover_all_switchers() {
        let tools: Vec<String> = neutral_steps().into_iter().map(|s| s.tool).collect();
        assert!(tools.contains(&"prime-select".to_string()));
        assert!(tools.contains(&"optimus-manager".to_string()));
    }
}
