//! Typed compositor settings: concrete values for profile templates,
//! `Option` patches for presets, and a per-field merge where presence in the
//! patch wins (a deep merge over the three fixed subtrees).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decoration {
    pub blur: bool,
    pub blur_size: u8,
    pub blur_passes: u8,
    pub drop_shadow: bool,
    pub shadow_range: u8,
    pub rounding: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Animations {
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Misc {
    pub vfr: bool,
    pub vrr: u8,
    pub allow_tearing: bool,
    pub disable_hyprland_logo: bool,
    pub disable_splash_rendering: bool,
    pub no_cursor_warps: bool,
}

/// A full set of compositor settings, as carried by a profile template or
/// produced by merging a preset over one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositorSettings {
    pub decoration: Decoration,
    pub animations: Animations,
    pub misc: Misc,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecorationPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blur: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blur_size: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blur_passes: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drop_shadow: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_range: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rounding: Option<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MiscPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vfr: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vrr: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_tearing: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_hyprland_logo: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_splash_rendering: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_cursor_warps: Option<bool>,
}

/// The three fixed subtrees a preset may override.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsPatch {
    pub decoration: DecorationPatch,
    pub animations: AnimationsPatch,
    pub misc: MiscPatch,
}

impl CompositorSettings {
    /// Merge a preset patch over these settings field-by-field.
    pub fn merged(&self, patch: &SettingsPatch) -> CompositorSettings {
        let d = &patch.decoration;
        let a = &patch.animations;
        let m = &patch.misc;
        CompositorSettings {
            decoration: Decoration {
                blur: d.blur.unwrap_or(self.decoration.blur),
                blur_size: d.blur_size.unwrap_or(self.decoration.blur_size),
                blur_passes: d.blur_passes.unwrap_or(self.decoration.blur_passes),
                drop_shadow: d.drop_shadow.unwrap_or(self.decoration.drop_shadow),
                shadow_range: d.shadow_range.unwrap_or(self.decoration.shadow_range),
                rounding: d.rounding.unwrap_or(self.decoration.rounding),
            },
            animations: Animations {
                enabled: a.enabled.unwrap_or(self.animations.enabled),
            },
            misc: Misc {
                vfr: m.vfr.unwrap_or(self.misc.vfr),
                vrr: m.vrr.unwrap_or(self.misc.vrr),
                allow_tearing: m.allow_tearing.unwrap_or(self.misc.allow_tearing),
                disable_hyprland_logo: m
                    .disable_hyprland_logo
                    .unwrap_or(self.misc.disable_hyprland_logo),
                disable_splash_rendering: m
                    .disable_splash_rendering
                    .unwrap_or(self.misc.disable_splash_rendering),
                no_cursor_warps: m.no_cursor_warps.unwrap_or(self.misc.no_cursor_warps),
            },
        }
    }

    /// Canonical Hyprland keyword rendering. Field order is fixed so the same
    /// settings always produce byte-identical output.
    pub fn render(&self) -> String {
        let d = &self.decoration;
        let a = &self.animations;
        let m = &self.misc;
        let mut out = String::new();
        out.push_str("decoration {\n");
        out.push_str(&format!("    rounding = {}\n", d.rounding));
        out.push_str("    blur {\n");
        out.push_str(&format!("        enabled = {}\n", d.blur));
        out.push_str(&format!("        size = {}\n", d.blur_size));
        out.push_str(&format!("        passes = {}\n", d.blur_passes));
        out.push_str("    }\n");
        out.push_str("    shadow {\n");
        out.push_str(&format!("        enabled = {}\n", d.drop_shadow));
        out.push_str(&format!("        range = {}\n", d.shadow_range));
        out.push_str("    }\n");
        out.push_str("}\n");
        out.push_str("animations {\n");
        out.push_str(&format!("    enabled = {}\n", a.enabled));
        out.push_str("}\n");
        out.push_str("misc {\n");
        out.push_str(&format!("    vfr = {}\n", m.vfr));
        out.push_str(&format!("    vrr = {}\n", m.vrr));
        out.push_str(&format!("    allow_tearing = {}\n", m.allow_tearing));
        out.push_str(&format!("    disable_hyprland_logo = {}\n", m.disable_hyprland_logo));
        out.push_str(&format!(
            "    disable_splash_rendering = {}\n",
            m.disable_splash_rendering
        ));
        out.push_str(&format!("    no_cursor_warps = {}\n", m.no_cursor_warps));
        out.push_str("}");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> CompositorSettings {
        CompositorSettings {
            decoration: Decoration {
                blur: true,
                blur_size: 8,
                blur_passes: 3,
                drop_shadow: true,
                shadow_range: 8,
                rounding: 10,
            },
            animations: Animations { enabled: true },
            misc: Misc {
                vfr: false,
                vrr: 1,
                allow_tearing: false,
                disable_hyprland_logo: false,
                disable_splash_rendering: false,
                no_cursor_warps: false,
            },
        }
    }

    #[test]
    fn test_empty_patch_is_identity() {
        let s = base();
        assert_eq!(s.merged(&SettingsPatch::default()), s);
    }

    #[test]
    fn test_patch_presence_wins_absence_falls_through() {
        let s = base();
        let patch = SettingsPatch {
            decoration: DecorationPatch {
                blur: Some(false),
                rounding: Some(0),
                ..Default::default()
            },
            animations: AnimationsPatch { enabled: Some(false) },
            misc: MiscPatch {
                vrr: Some(2),
                allow_tearing: Some(true),
                ..Default::default()
            },
        };
        let merged = s.merged(&patch);
        assert!(!merged.decoration.blur);
        assert_eq!(merged.decoration.rounding, 0);
        // absent fields fall through to the template
        assert_eq!(merged.decoration.blur_size, 8);
        assert_eq!(merged.decoration.shadow_range, 8);
        assert!(!merged.animations.enabled);
        assert_eq!(merged.misc.vrr, 2);
        assert!(merged.misc.allow_tearing);
        assert!(!merged.misc.vfr);
    }

    #[test]
    fn test_render_is_stable() {
        let s = base();
        assert_eq!(s.render(), s.render());
    }

    #[test]
    fn test_render_shape() {
        let r = base().render();
        assert!(r.starts_with("decoration {\n"));
        assert!(r.contains("        enabled = true\n"));
        assert!(r.contains("    vrr = 1\n"));
        assert!(r.ends_with('}'));
        // one block each
        assert_eq!(r.matches("animations {").count(), 1);
        assert_eq!(r.matches("misc {").count(), 1);
    }

    #[test]
    fn test_patch_json_round_trip_drops_nothing() {
        let patch = SettingsPatch {
            misc: MiscPatch {
                vrr: Some(2),
                ..Default::default()
            },
            ..Default::default()
        };
        let json = serde_json::to_string(&patch).unwrap();
        let back: SettingsPatch = serde_json::from_str(&json).unwrap();
        assert_eq!(back, patch);
        // None fields are omitted entirely
        assert!(!json.contains("blur"));
    }
}
