//! Profile registry: the closed set of six operating modes, each carrying a
//! GPU selection policy, switcher actions, environment deltas, and a
//! compositor settings template.

pub mod plan;

use crate::classify::EffectsTier;
use crate::error::Error;
use crate::settings::{Animations, CompositorSettings, Decoration, Misc};
use serde::{Deserialize, Serialize};

pub use plan::{ProfilePlan, compute_plan};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Profile {
    Integrated,
    Discrete,
    Hybrid,
    Performance,
    PowerSave,
    Balanced,
}

pub const ALL_PROFILES: &[Profile] = &[
    Profile::Integrated,
    Profile::Discrete,
    Profile::Hybrid,
    Profile::Performance,
    Profile::PowerSave,
    Profile::Balanced,
];

impl Profile {
    pub fn id(&self) -> &'static str {
        match self {
            Profile::Integrated => "integrated",
            Profile::Discrete => "discrete",
            Profile::Hybrid => "hybrid",
            Profile::Performance => "performance",
            Profile::PowerSave => "power-save",
            Profile::Balanced => "balanced",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Profile::Integrated => "iGPU only, minimal effects",
            Profile::Discrete => "dGPU for everything, rich effects",
            Profile::Hybrid => "iGPU desktop with dGPU offload",
            Profile::Performance => "dGPU plus clock/fan uplift",
            Profile::PowerSave => "iGPU with low-power platform tuning",
            Profile::Balanced => "hybrid routing with automatic power management",
        }
    }

    /// Template id backing this profile's compositor settings.
    pub fn template(&self) -> Template {
        match self {
            Profile::Integrated => Template::Minimal,
            Profile::Discrete => Template::Rich,
            Profile::Hybrid => Template::Moderate,
            Profile::Performance => Template::RichMax,
            Profile::PowerSave => Template::Bare,
            Profile::Balanced => Template::Moderate,
        }
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl std::str::FromStr for Profile {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "integrated" => Ok(Profile::Integrated),
            "discrete" => Ok(Profile::Discrete),
            "hybrid" => Ok(Profile::Hybrid),
            "performance" => Ok(Profile::Performance),
            "power-save" | "powersave" => Ok(Profile::PowerSave),
            "balanced" => Ok(Profile::Balanced),
            other => Err(Error::UnknownProfile(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    Minimal,
    Moderate,
    Rich,
    RichMax,
    Bare,
}

impl Template {
    pub fn id(&self) -> &'static str {
        match self {
            Template::Minimal => "minimal",
            Template::Moderate => "moderate",
            Template::Rich => "rich",
            Template::RichMax => "rich-max",
            Template::Bare => "bare",
        }
    }

    /// Render the template for a GPU generation tier and form factor.
    /// The bare template is identical everywhere, so power-save output is a
    /// single canonical rendering on any system.
    pub fn settings(&self, tier: EffectsTier, mobile: bool) -> CompositorSettings {
        match self {
            Template::Bare => CompositorSettings {
                decoration: Decoration {
                    blur: false,
                    blur_size: 1,
                    blur_passes: 1,
                    drop_shadow: false,
                    shadow_range: 1,
                    rounding: 0,
                },
                animations: Animations { enabled: false },
                misc: Misc {
                    vfr: true,
                    vrr: 0,
                    allow_tearing: false,
                    disable_hyprland_logo: true,
                    disable_splash_rendering: true,
                    no_cursor_warps: false,
                },
            },
            Template::Minimal => CompositorSettings {
                decoration: Decoration {
                    blur: false,
                    blur_size: 4,
                    blur_passes: 1,
                    drop_shadow: false,
                    shadow_range: 4,
                    rounding: 4,
                },
                animations: Animations { enabled: !mobile },
                misc: Misc {
                    vfr: true,
                    vrr: 0,
                    allow_tearing: false,
                    disable_hyprland_logo: true,
                    disable_splash_rendering: true,
                    no_cursor_warps: false,
                },
            },
            Template::Moderate => {
                let blur = tier > EffectsTier::Low;
                CompositorSettings {
                    decoration: Decoration {
                        blur,
                        blur_size: if mobile { 2 } else { 4 },
                        blur_passes: if mobile { 1 } else { 2 },
                        drop_shadow: blur,
                        shadow_range: 4,
                        rounding: 8,
                    },
                    animations: Animations { enabled: true },
                    misc: Misc {
                        vfr: true,
                        vrr: 1,
                        allow_tearing: false,
                        disable_hyprland_logo: false,
                        disable_splash_rendering: false,
                        no_cursor_warps: false,
                    },
                }
            }
            Template::Rich | Template::RichMax => {
                let (size, passes) = match (tier, mobile) {
                    (EffectsTier::High, false) => (8, 3),
                    (EffectsTier::High, true) => (6, 2),
                    (EffectsTier::Mid, false) => (6, 2),
                    (EffectsTier::Mid, true) => (4, 2),
                    (EffectsTier::Low, _) => (4, 1),
                };
                CompositorSettings {
                    decoration: Decoration {
                        blur: tier > EffectsTier::Low,
                        blur_size: size,
                        blur_passes: passes,
                        drop_shadow: true,
                        shadow_range: if *self == Template::RichMax { 10 } else { 8 },
                        rounding: 10,
                    },
                    animations: Animations { enabled: true },
                    misc: Misc {
                        vfr: false,
                        vrr: if *self == Template::RichMax { 2 } else { 1 },
                        allow_tearing: false,
                        disable_hyprland_logo: false,
                        disable_splash_rendering: false,
                        no_cursor_warps: false,
                    },
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_ids_round_trip() {
        for p in ALL_PROFILES {
            assert_eq!(p.id().parse::<Profile>().unwrap(), *p);
        }
    }

    #[test]
    fn test_unknown_profile_rejected() {
        assert!(matches!(
            "turbo".parse::<Profile>(),
            Err(Error::UnknownProfile(_))
        ));
    }

    #[test]
    fn test_serde_uses_kebab_case() {
        let json = serde_json::to_string(&Profile::PowerSave).unwrap();
        assert_eq!(json, "\"power-save\"");
        let back: Profile = serde_json::from_str("\"power-save\"").unwrap();
        assert_eq!(back, Profile::PowerSave);
    }

    #[test]
    fn test_bare_template_is_form_factor_invariant() {
        let desktop = Template::Bare.settings(EffectsTier::High, false);
        let mobile = Template::Bare.settings(EffectsTier::Low, true);
        assert_eq!(desktop, mobile);
        assert_eq!(desktop.render(), mobile.render());
    }

    #[test]
    fn test_minimal_mobile_disables_animations() {
        let s = Template::Minimal.settings(EffectsTier::Mid, true);
        assert!(!s.decoration.blur);
        assert!(!s.animations.enabled);
        assert!(s.misc.vfr);
    }

    #[test]
    fn test_rich_scales_with_tier_and_form_factor() {
        let desktop_high = Template::Rich.settings(EffectsTier::High, false);
        let mobile_high = Template::Rich.settings(EffectsTier::High, true);
        let low = Template::Rich.settings(EffectsTier::Low, false);
        assert_eq!(desktop_high.decoration.blur_size, 8);
        assert_eq!(mobile_high.decoration.blur_size, 6);
        assert!(!low.decoration.blur);
    }

    #[test]
    fn test_rich_max_uses_vrr_2() {
        let s = Template::RichMax.settings(EffectsTier::High, false);
        assert_eq!(s.misc.vrr, 2);
        assert_eq!(s.decoration.shadow_range, 10);
    }

    #[test]
    fn test_profile_template_mapping() {
        assert_eq!(Profile::PowerSave.template(), Template::Bare);
        assert_eq!(Profile::Performance.template(), Template::RichMax);
        assert_eq!(Profile::Balanced.template(), Template::Moderate);
    }
}
