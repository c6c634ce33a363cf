//! Preset model: named settings layers over a profile's compositor template,
//! with strict whole-document validation.

pub mod store;

use crate::error::{Error, Result};
use crate::profile::Profile;
use crate::settings::SettingsPatch;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use store::PresetStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Gaming,
    Work,
    Creative,
    Compute,
    Power,
    Debug,
    Custom,
}

impl Category {
    pub fn id(&self) -> &'static str {
        match self {
            Category::Gaming => "gaming",
            Category::Work => "work",
            Category::Creative => "creative",
            Category::Compute => "compute",
            Category::Power => "power",
            Category::Debug => "debug",
            Category::Custom => "custom",
        }
    }
}

/// Listing order for categories.
pub const ALL_CATEGORIES: &[Category] = &[
    Category::Gaming,
    Category::Work,
    Category::Creative,
    Category::Compute,
    Category::Power,
    Category::Debug,
    Category::Custom,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Performance,
    Quality,
    Balanced,
    Efficiency,
    Stability,
    Custom,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    #[serde(default)]
    pub settings: SettingsPatch,
    pub gpu_profile: Profile,
    /// Process-name globs this preset targets, informational.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub applications: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_specific: Option<String>,
}

/// The persisted document: general presets and application/device-specific
/// presets, id-keyed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PresetDocument {
    #[serde(default)]
    pub presets: BTreeMap<String, Preset>,
    #[serde(default)]
    pub application_presets: BTreeMap<String, Preset>,
}

pub const BUILTIN_IDS: &[&str] = &[
    "gaming-competitive",
    "gaming-immersive",
    "streaming",
    "productivity",
    "development",
    "content-creation",
    "ai-workload",
    "presentation",
    "battery-extreme",
    "troubleshooting",
    "blender",
    "obs",
    "steam-deck",
];

pub fn is_builtin(id: &str) -> bool {
    BUILTIN_IDS.contains(&id)
}

fn valid_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn check_range(id: &str, path: &str, value: u8, min: u8, max: u8) -> Result<()> {
    if value < min || value > max {
        return Err(Error::InvalidField {
            id: id.to_string(),
            path: path.to_string(),
            reason: format!("{} out of range [{}, {}]", value, min, max),
        });
    }
    Ok(())
}

/// Validate one preset against the admission bounds.
pub fn validate(preset: &Preset) -> Result<()> {
    let id = &preset.id;
    if !valid_id(id) {
        return Err(Error::InvalidField {
            id: id.clone(),
            path: "id".to_string(),
            reason: "must match ^[A-Za-z0-9_-]+$".to_string(),
        });
    }
    let d = &preset.settings.decoration;
    if let Some(v) = d.blur_size {
        check_range(id, "decoration.blur_size", v, 1, 10)?;
    }
    if let Some(v) = d.blur_passes {
        check_range(id, "decoration.blur_passes", v, 1, 4)?;
    }
    if let Some(v) = d.shadow_range {
        check_range(id, "decoration.shadow_range", v, 1, 10)?;
    }
    if let Some(v) = d.rounding {
        check_range(id, "decoration.rounding", v, 0, 20)?;
    }
    if let Some(v) = preset.settings.misc.vrr {
        if v > 2 {
            return Err(Error::InvalidField {
                id: id.clone(),
                path: "misc.vrr".to_string(),
                reason: format!("{} not in {{0, 1, 2}}", v),
            });
        }
    }
    Ok(())
}

/// Validate the whole document: every preset, ids matching their keys, and
/// id uniqueness across both maps. Any failure rejects the document.
pub fn validate_document(doc: &PresetDocument) -> Result<()> {
    for (key, preset) in doc.presets.iter().chain(doc.application_presets.iter()) {
        if key != &preset.id {
            return Err(Error::InvalidField {
                id: preset.id.clone(),
                path: "id".to_string(),
                reason: format!("keyed as '{}' but id is '{}'", key, preset.id),
            });
        }
        validate(preset)?;
    }
    for key in doc.presets.keys() {
        if doc.application_presets.contains_key(key) {
            return Err(Error::InvalidField {
                id: key.clone(),
                path: "id".to_string(),
                reason: "duplicated across presets and application_presets".to_string(),
            });
        }
    }
    Ok(())
}

/// Parse the persisted document. JSON syntax errors are state errors; a
/// preset whose field fails typing (an unknown `gpu_profile`, a mistyped
/// number) is an `InvalidField` naming the offending entry, so admission
/// failures keep their own error kind and exit code.
pub fn parse_document(json: &str) -> Result<PresetDocument> {
    #[derive(Deserialize, Default)]
    #[serde(default)]
    struct RawDocument {
        presets: BTreeMap<String, serde_json::Value>,
        application_presets: BTreeMap<String, serde_json::Value>,
    }

    let raw: RawDocument = serde_json::from_str(json).map_err(|e| Error::State(e.to_string()))?;
    let mut doc = PresetDocument::default();
    for (key, value) in raw.presets {
        let preset = preset_from_value(&key, value)?;
        doc.presets.insert(key, preset);
    }
    for (key, value) in raw.application_presets {
        let preset = preset_from_value(&key, value)?;
        doc.application_presets.insert(key, preset);
    }
    Ok(doc)
}

fn preset_from_value(key: &str, value: serde_json::Value) -> Result<Preset> {
    match serde_json::from_value(value.clone()) {
        Ok(preset) => Ok(preset),
        Err(e) => Err(Error::InvalidField {
            id: key.to_string(),
            path: offending_path(&value),
            reason: e.to_string(),
        }),
    }
}

/// Best-effort attribution for a preset value that failed typing as a whole:
/// re-check each typed field on its own and name the first that fails.
fn offending_path(value: &serde_json::Value) -> String {
    use crate::settings::{AnimationsPatch, DecorationPatch, MiscPatch};

    fn bad<T: serde::de::DeserializeOwned>(v: &serde_json::Value) -> bool {
        serde_json::from_value::<T>(v.clone()).is_err()
    }

    let Some(map) = value.as_object() else {
        return String::new();
    };
    if map.get("gpu_profile").is_some_and(bad::<Profile>) {
        return "gpu_profile".to_string();
    }
    if map.get("category").is_some_and(bad::<Category>) {
        return "category".to_string();
    }
    if map.get("priority").is_some_and(bad::<Priority>) {
        return "priority".to_string();
    }
    if let Some(settings) = map.get("settings") {
        if bad::<SettingsPatch>(settings) {
            if let Some(sub) = settings.as_object() {
                if sub.get("decoration").is_some_and(bad::<DecorationPatch>) {
                    return "settings.decoration".to_string();
                }
                if sub.get("animations").is_some_and(bad::<AnimationsPatch>) {
                    return "settings.animations".to_string();
                }
                if sub.get("misc").is_some_and(bad::<MiscPatch>) {
                    return "settings.misc".to_string();
                }
            }
            return "settings".to_string();
        }
    }
    String::new()
}

fn preset(
    id: &str,
    name: &str,
    description: &str,
    category: Category,
    priority: Priority,
    gpu_profile: Profile,
    settings: SettingsPatch,
) -> Preset {
    Preset {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        category,
        priority,
        settings,
        gpu_profile,
        applications: Vec::new(),
        device_specific: None,
    }
}

/// The built-in set seeded on first run.
pub fn builtin_document() -> PresetDocument {
    use crate::settings::{AnimationsPatch, DecorationPatch, MiscPatch};

    let mut doc = PresetDocument::default();
    let mut add = |p: Preset| {
        doc.presets.insert(p.id.clone(), p);
    };

    add(preset(
        "gaming-competitive",
        "Competitive Gaming",
        "Lowest latency: no effects, tearing allowed",
        Category::Gaming,
        Priority::Performance,
        Profile::Performance,
        SettingsPatch {
            decoration: DecorationPatch {
                blur: Some(false),
                drop_shadow: Some(false),
                rounding: Some(0),
                ..Default::default()
            },
            animations: AnimationsPatch {
                enabled: Some(false),
            },
            misc: MiscPatch {
                vfr: Some(false),
                vrr: Some(2),
                allow_tearing: Some(true),
                ..Default::default()
            },
        },
    ));

    add(preset(
        "gaming-immersive",
        "Immersive Gaming",
        "Full visuals for single-player titles",
        Category::Gaming,
        Priority::Quality,
        Profile::Discrete,
        SettingsPatch {
            decoration: DecorationPatch {
                blur: Some(true),
                blur_size: Some(8),
                blur_passes: Some(3),
                drop_shadow: Some(true),
                ..Default::default()
            },
            animations: AnimationsPatch {
                enabled: Some(true),
            },
            misc: MiscPatch {
                vrr: Some(1),
                ..Default::default()
            },
        },
    ));

    add(preset(
        "streaming",
        "Streaming",
        "Stable frame pacing while encoding",
        Category::Creative,
        Priority::Stability,
        Profile::Performance,
        SettingsPatch {
            decoration: DecorationPatch {
                blur: Some(false),
                ..Default::default()
            },
            animations: AnimationsPatch {
                enabled: Some(true),
            },
            misc: MiscPatch {
                vfr: Some(false),
                vrr: Some(0),
                ..Default::default()
            },
        },
    ));

    add(preset(
        "productivity",
        "Productivity",
        "Quiet, efficient desktop for office work",
        Category::Work,
        Priority::Efficiency,
        Profile::Hybrid,
        SettingsPatch {
            decoration: DecorationPatch {
                blur: Some(false),
                rounding: Some(4),
                ..Default::default()
            },
            animations: AnimationsPatch {
                enabled: Some(true),
            },
            misc: MiscPatch {
                vfr: Some(true),
                ..Default::default()
            },
        },
    ));

    add(preset(
        "development",
        "Development",
        "Minimal distraction for terminals and editors",
        Category::Work,
        Priority::Balanced,
        Profile::Hybrid,
        SettingsPatch {
            decoration: DecorationPatch {
                blur: Some(false),
                drop_shadow: Some(false),
                rounding: Some(4),
                ..Default::default()
            },
            animations: AnimationsPatch {
                enabled: Some(false),
            },
            misc: MiscPatch {
                vfr: Some(true),
                ..Default::default()
            },
        },
    ));

    add(preset(
        "content-creation",
        "Content Creation",
        "Color-accurate, full effects for editing suites",
        Category::Creative,
        Priority::Quality,
        Profile::Discrete,
        SettingsPatch {
            decoration: DecorationPatch {
                blur: Some(true),
                blur_size: Some(6),
                blur_passes: Some(2),
                ..Default::default()
            },
            animations: AnimationsPatch {
                enabled: Some(true),
            },
            misc: MiscPatch {
                vrr: Some(1),
                ..Default::default()
            },
        },
    ));

    add(preset(
        "ai-workload",
        "AI Workload",
        "Keep the dGPU free for compute jobs",
        Category::Compute,
        Priority::Performance,
        Profile::Hybrid,
        SettingsPatch {
            decoration: DecorationPatch {
                blur: Some(false),
                drop_shadow: Some(false),
                ..Default::default()
            },
            animations: AnimationsPatch {
                enabled: Some(false),
            },
            misc: MiscPatch {
                vfr: Some(true),
                ..Default::default()
            },
        },
    ));

    add(preset(
        "presentation",
        "Presentation",
        "No surprises on an external display",
        Category::Work,
        Priority::Stability,
        Profile::Balanced,
        SettingsPatch {
            decoration: DecorationPatch {
                blur: Some(false),
                ..Default::default()
            },
            animations: AnimationsPatch {
                enabled: Some(false),
            },
            misc: MiscPatch {
                vfr: Some(false),
                vrr: Some(0),
                no_cursor_warps: Some(true),
                ..Default::default()
            },
        },
    ));

    add(preset(
        "battery-extreme",
        "Extreme Battery",
        "Every effect off, squeeze the last watt",
        Category::Power,
        Priority::Efficiency,
        Profile::PowerSave,
        SettingsPatch {
            decoration: DecorationPatch {
                blur: Some(false),
                drop_shadow: Some(false),
                rounding: Some(0),
                ..Default::default()
            },
            animations: AnimationsPatch {
                enabled: Some(false),
            },
            misc: MiscPatch {
                vfr: Some(true),
                vrr: Some(0),
                disable_hyprland_logo: Some(true),
                disable_splash_rendering: Some(true),
                ..Default::default()
            },
        },
    ));

    add(preset(
        "troubleshooting",
        "Troubleshooting",
        "Bare compositor to isolate rendering issues",
        Category::Debug,
        Priority::Stability,
        Profile::Integrated,
        SettingsPatch {
            decoration: DecorationPatch {
                blur: Some(false),
                drop_shadow: Some(false),
                rounding: Some(0),
                ..Default::default()
            },
            animations: AnimationsPatch {
                enabled: Some(false),
            },
            misc: MiscPatch {
                vfr: Some(true),
                vrr: Some(0),
                allow_tearing: Some(false),
                ..Default::default()
            },
        },
    ));

    let mut add_app = |p: Preset| {
        doc.application_presets.insert(p.id.clone(), p);
    };

    let mut blender = preset(
        "blender",
        "Blender",
        "Viewport responsiveness over eye candy",
        Category::Creative,
        Priority::Performance,
        Profile::Performance,
        SettingsPatch {
            animations: AnimationsPatch {
                enabled: Some(false),
            },
            misc: MiscPatch {
                vrr: Some(1),
                allow_tearing: Some(true),
                ..Default::default()
            },
            ..Default::default()
        },
    );
    blender.applications = vec!["blender".to_string()];
    add_app(blender);

    let mut obs = preset(
        "obs",
        "OBS Studio",
        "Fixed frame pacing while capturing",
        Category::Creative,
        Priority::Stability,
        Profile::Performance,
        SettingsPatch {
            decoration: DecorationPatch {
                blur: Some(false),
                ..Default::default()
            },
            misc: MiscPatch {
                vfr: Some(false),
                vrr: Some(0),
                ..Default::default()
            },
            ..Default::default()
        },
    );
    obs.applications = vec!["obs".to_string()];
    add_app(obs);

    let mut steam_deck = preset(
        "steam-deck",
        "Steam Deck",
        "Handheld AMD APU tuning",
        Category::Gaming,
        Priority::Balanced,
        Profile::Integrated,
        SettingsPatch {
            decoration: DecorationPatch {
                blur: Some(false),
                rounding: Some(8),
                ..Default::default()
            },
            animations: AnimationsPatch {
                enabled: Some(true),
            },
            misc: MiscPatch {
                vfr: Some(true),
                vrr: Some(1),
                ..Default::default()
            },
        },
    );
    steam_deck.device_specific = Some("steam-deck".to_string());
    add_app(steam_deck);

    doc
}
