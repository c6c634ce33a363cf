//! Keyword-table classification of raw GPU description strings.
//!
//! Rules are checked in priority order (newest generation first). All
//! matching is lowercase substring based; unknown strings fall through to
//! typed `Unknown` variants rather than string sentinels.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vendor {
    Intel,
    Amd,
    Nvidia,
    ArmMali,
    QualcommAdreno,
    PowerVr,
    Unknown,
}

impl std::fmt::Display for Vendor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Vendor::Intel => write!(f, "Intel"),
            Vendor::Amd => write!(f, "AMD"),
            Vendor::Nvidia => write!(f, "NVIDIA"),
            Vendor::ArmMali => write!(f, "ARM Mali"),
            Vendor::QualcommAdreno => write!(f, "Qualcomm Adreno"),
            Vendor::PowerVr => write!(f, "PowerVR"),
            Vendor::Unknown => write!(f, "Unknown"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Architecture {
    // NVIDIA
    AdaLovelace,
    Ampere,
    Turing,
    TuringGtx,
    Pascal,
    Maxwell,
    NvidiaLegacy,
    // AMD
    Rdna3,
    Rdna2,
    Rdna1,
    Vega,
    Gcn,
    // Intel
    XeHpg,
    XeLp,
    GenGraphics,
    IntelLegacy,
    // Mobile-only families
    MaliValhall,
    MaliBifrost,
    AdrenoModern,
    AdrenoLegacy,
    PowerVrRogue,
    Unknown,
}

impl std::fmt::Display for Architecture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Architecture::AdaLovelace => "Ada Lovelace",
            Architecture::Ampere => "Ampere",
            Architecture::Turing => "Turing",
            Architecture::TuringGtx => "Turing (GTX)",
            Architecture::Pascal => "Pascal",
            Architecture::Maxwell => "Maxwell",
            Architecture::NvidiaLegacy => "NVIDIA Legacy",
            Architecture::Rdna3 => "RDNA 3",
            Architecture::Rdna2 => "RDNA 2",
            Architecture::Rdna1 => "RDNA 1",
            Architecture::Vega => "Vega",
            Architecture::Gcn => "GCN",
            Architecture::XeHpg => "Xe-HPG",
            Architecture::XeLp => "Xe-LP",
            Architecture::GenGraphics => "Gen Graphics",
            Architecture::IntelLegacy => "Intel Legacy",
            Architecture::MaliValhall => "Mali Valhall",
            Architecture::MaliBifrost => "Mali Bifrost",
            Architecture::AdrenoModern => "Adreno",
            Architecture::AdrenoLegacy => "Adreno Legacy",
            Architecture::PowerVrRogue => "PowerVR Rogue",
            Architecture::Unknown => "Unknown",
        };
        write!(f, "{}", name)
    }
}

/// Visual-effect budget a generation can comfortably sustain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EffectsTier {
    Low,
    Mid,
    High,
}

impl Architecture {
    pub fn effects_tier(&self) -> EffectsTier {
        match self {
            Architecture::AdaLovelace
            | Architecture::Ampere
            | Architecture::Rdna3
            | Architecture::Rdna2
            | Architecture::XeHpg => EffectsTier::High,
            Architecture::Turing
            | Architecture::TuringGtx
            | Architecture::Pascal
            | Architecture::Rdna1
            | Architecture::Vega
            | Architecture::XeLp
            | Architecture::MaliValhall
            | Architecture::AdrenoModern => EffectsTier::Mid,
            _ => EffectsTier::Low,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormFactor {
    DesktopDiscrete,
    DesktopIntegrated,
    DesktopApu,
    MobileDiscrete,
    MobileIntegrated,
    MobileApu,
    Mobile,
}

impl FormFactor {
    pub fn is_mobile(&self) -> bool {
        matches!(
            self,
            FormFactor::MobileDiscrete
                | FormFactor::MobileIntegrated
                | FormFactor::MobileApu
                | FormFactor::Mobile
        )
    }
}

impl std::fmt::Display for FormFactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FormFactor::DesktopDiscrete => "desktop discrete",
            FormFactor::DesktopIntegrated => "desktop integrated",
            FormFactor::DesktopApu => "desktop APU",
            FormFactor::MobileDiscrete => "mobile discrete",
            FormFactor::MobileIntegrated => "mobile integrated",
            FormFactor::MobileApu => "mobile APU",
            FormFactor::Mobile => "mobile",
        };
        write!(f, "{}", name)
    }
}

/// One classification rule: any keyword hit assigns the architecture.
struct Rule {
    keywords: &'static [&'static str],
    arch: Architecture,
}

const NVIDIA_RULES: &[Rule] = &[
    Rule {
        keywords: &["rtx 40", "rtx40", "ad10", "ada lovelace"],
        arch: Architecture::AdaLovelace,
    },
    Rule {
        keywords: &["rtx 30", "rtx30", "ga10", "ampere"],
        arch: Architecture::Ampere,
    },
    Rule {
        keywords: &["rtx 20", "rtx20", "tu10", "quadro rtx"],
        arch: Architecture::Turing,
    },
    Rule {
        keywords: &["gtx 16", "gtx16", "tu11"],
        arch: Architecture::TuringGtx,
    },
    Rule {
        keywords: &["gtx 10", "gtx10", "gp10", "pascal"],
        arch: Architecture::Pascal,
    },
    Rule {
        keywords: &["gtx 9", "gtx9", "gm20", "maxwell"],
        arch: Architecture::Maxwell,
    },
];

const AMD_RULES: &[Rule] = &[
    Rule {
        // iGPU names carry no "RX": match the 7x0M parts explicitly so the
        // pre-GCN "Radeon 7500" era stays on the legacy path.
        keywords: &["rx 7", "rx7", "navi 3", "navi3", "rdna3", "radeon 780m", "radeon 760m", "radeon 740m"],
        arch: Architecture::Rdna3,
    },
    Rule {
        keywords: &["rx 6", "rx6", "navi 2", "navi2", "rdna2"],
        arch: Architecture::Rdna2,
    },
    Rule {
        keywords: &["rx 5", "rx5", "navi 1", "navi 10", "navi 14", "rdna"],
        arch: Architecture::Rdna1,
    },
    Rule {
        keywords: &["vega", "raven", "picasso", "renoir", "cezanne", "barcelo"],
        arch: Architecture::Vega,
    },
    Rule {
        keywords: &["polaris", "rx 4", "rx 580", "rx 570", "hawaii", "tonga", "fiji"],
        arch: Architecture::Gcn,
    },
];

const INTEL_RULES: &[Rule] = &[
    Rule {
        keywords: &["arc a", "arc b", "dg2", "battlemage", "alchemist"],
        arch: Architecture::XeHpg,
    },
    Rule {
        keywords: &["iris xe", "xe graphics", "tiger lake", "alder lake", "raptor lake", "meteor lake"],
        arch: Architecture::XeLp,
    },
    Rule {
        keywords: &["uhd graphics", "hd graphics", "iris plus", "iris pro"],
        arch: Architecture::GenGraphics,
    },
];

const MALI_RULES: &[Rule] = &[
    Rule {
        keywords: &["mali-g7", "mali-g6", "mali-g5", "valhall"],
        arch: Architecture::MaliValhall,
    },
    Rule {
        keywords: &["mali", "bifrost"],
        arch: Architecture::MaliBifrost,
    },
];

const ADRENO_RULES: &[Rule] = &[
    Rule {
        keywords: &["adreno 7", "adreno 6"],
        arch: Architecture::AdrenoModern,
    },
    Rule {
        keywords: &["adreno", "kgsl"],
        arch: Architecture::AdrenoLegacy,
    },
];

const MOBILE_KEYWORDS: &[&str] = &["mobile", "laptop", "max-q", "notebook"];

fn match_rules(desc: &str, rules: &[Rule], fallback: Architecture) -> Architecture {
    for rule in rules {
        if rule.keywords.iter().any(|k| desc.contains(k)) {
            return rule.arch;
        }
    }
    fallback
}

/// Token-wise vendor checks. The AMD check deliberately requires `amd` as a
/// standalone token (or `amd/ati`) so boards with `AMDT` strings stay off the
/// AMD path.
pub fn detect_vendor(raw: &str) -> Vendor {
    let desc = raw.to_lowercase();
    let has_token = |t: &str| {
        desc.split(|c: char| !c.is_ascii_alphanumeric())
            .any(|w| w == t)
    };

    if has_token("nvidia") || has_token("geforce") || has_token("quadro") {
        Vendor::Nvidia
    } else if has_token("amd") || has_token("ati") || has_token("radeon") {
        Vendor::Amd
    } else if has_token("intel") || desc.contains("iris") || desc.contains("uhd graphics") {
        Vendor::Intel
    } else if has_token("mali") {
        Vendor::ArmMali
    } else if has_token("adreno") || has_token("kgsl") || has_token("qualcomm") {
        Vendor::QualcommAdreno
    } else if has_token("powervr") || has_token("imagination") {
        Vendor::PowerVr
    } else {
        Vendor::Unknown
    }
}

/// Architecture from the raw description. Pure function of the string.
pub fn detect_architecture(vendor: Vendor, raw: &str) -> Architecture {
    let desc = raw.to_lowercase();
    match vendor {
        Vendor::Nvidia => match_rules(&desc, NVIDIA_RULES, Architecture::NvidiaLegacy),
        Vendor::Amd => match_rules(&desc, AMD_RULES, Architecture::Gcn),
        Vendor::Intel => match_rules(&desc, INTEL_RULES, Architecture::IntelLegacy),
        Vendor::ArmMali => match_rules(&desc, MALI_RULES, Architecture::MaliBifrost),
        Vendor::QualcommAdreno => match_rules(&desc, ADRENO_RULES, Architecture::AdrenoLegacy),
        Vendor::PowerVr => Architecture::PowerVrRogue,
        Vendor::Unknown => Architecture::Unknown,
    }
}

/// Whether the description itself looks like a mobile part.
fn description_is_mobile(desc: &str) -> bool {
    if MOBILE_KEYWORDS.iter().any(|k| desc.contains(k)) {
        return true;
    }
    // Trailing M-suffix model numbers: "AD107M", "3060M", "RX 6800M".
    desc.split(|c: char| !c.is_ascii_alphanumeric()).any(|w| {
        w.len() >= 2
            && w.ends_with('m')
            && w[..w.len() - 1].chars().rev().take(2).all(|c| c.is_ascii_digit())
    })
}

fn vendor_is_integrated(vendor: Vendor, desc: &str) -> bool {
    match vendor {
        Vendor::Intel => !desc.contains("arc "),
        Vendor::ArmMali | Vendor::QualcommAdreno | Vendor::PowerVr => true,
        _ => false,
    }
}

fn is_apu(vendor: Vendor, desc: &str) -> bool {
    vendor == Vendor::Amd
        && ["raven", "picasso", "renoir", "cezanne", "barcelo", "phoenix", "apu"]
            .iter()
            .any(|k| desc.contains(k))
}

/// Derive form factor from the description plus the system-wide mobile flag.
/// Ambiguous strings defer to `system_is_mobile`; fully unknown strings get
/// the safest default, `DesktopDiscrete`.
pub fn detect_form_factor(vendor: Vendor, raw: &str, system_is_mobile: bool) -> FormFactor {
    let desc = raw.to_lowercase();

    if vendor == Vendor::Unknown {
        return FormFactor::DesktopDiscrete;
    }

    // Mobile-only vendors have no desktop variants.
    if matches!(
        vendor,
        Vendor::ArmMali | Vendor::QualcommAdreno | Vendor::PowerVr
    ) {
        return FormFactor::Mobile;
    }

    let mobile = description_is_mobile(&desc) || system_is_mobile;
    let apu = is_apu(vendor, &desc);
    let integrated = vendor_is_integrated(vendor, &desc);

    match (mobile, apu, integrated) {
        (true, true, _) => FormFactor::MobileApu,
        (true, _, true) => FormFactor::MobileIntegrated,
        (true, _, _) => FormFactor::MobileDiscrete,
        (false, true, _) => FormFactor::DesktopApu,
        (false, _, true) => FormFactor::DesktopIntegrated,
        (false, _, _) => FormFactor::DesktopDiscrete,
    }
}

/// Full classification of one raw description string.
pub fn classify(raw: &str, system_is_mobile: bool) -> (Vendor, Architecture, FormFactor) {
    let vendor = detect_vendor(raw);
    let arch = detect_architecture(vendor, raw);
    let form = detect_form_factor(vendor, raw, system_is_mobile);
    (vendor, arch, form)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nvidia_ada_by_model() {
        let (v, a, _) = classify("NVIDIA Corporation AD107 [GeForce RTX 4060]", false);
        assert_eq!(v, Vendor::Nvidia);
        assert_eq!(a, Architecture::AdaLovelace);
    }

    #[test]
    fn test_nvidia_ampere() {
        let (_, a, _) = classify("NVIDIA Corporation GA104 [GeForce RTX 3070]", false);
        assert_eq!(a, Architecture::Ampere);
    }

    #[test]
    fn test_nvidia_turing_gtx_vs_rtx() {
        let (_, gtx, _) = classify("NVIDIA Corporation TU116 [GeForce GTX 1660]", false);
        assert_eq!(gtx, Architecture::TuringGtx);
        let (_, rtx, _) = classify("NVIDIA Corporation TU106 [GeForce RTX 2070]", false);
        assert_eq!(rtx, Architecture::Turing);
    }

    #[test]
    fn test_nvidia_legacy_fallback() {
        let (_, a, _) = classify("NVIDIA Corporation G92 [GeForce 9800 GT]", false);
        assert_eq!(a, Architecture::NvidiaLegacy);
    }

    #[test]
    fn test_amd_rdna3() {
        let (v, a, _) = classify("Advanced Micro Devices [AMD/ATI] Navi 31 [Radeon RX 7900 XTX]", false);
        assert_eq!(v, Vendor::Amd);
        assert_eq!(a, Architecture::Rdna3);
    }

    #[test]
    fn test_amd_rdna3_igpu_by_model() {
        let (_, a, _) = classify("AMD Phoenix1 [Radeon 780M]", true);
        assert_eq!(a, Architecture::Rdna3);
    }

    #[test]
    fn test_amd_legacy_radeon_7500_not_rdna3() {
        let (v, a, _) = classify("ATI Technologies Inc Radeon 7500", false);
        assert_eq!(v, Vendor::Amd);
        assert_eq!(a, Architecture::Gcn);
    }

    #[test]
    fn test_amd_rdna2() {
        let (_, a, _) = classify("AMD/ATI Navi 22 [Radeon RX 6700 XT]", false);
        assert_eq!(a, Architecture::Rdna2);
    }

    #[test]
    fn test_amd_renoir_is_vega_apu() {
        let (_, a, f) = classify("AMD Renoir internal GPU", true);
        assert_eq!(a, Architecture::Vega);
        assert_eq!(f, FormFactor::MobileApu);
    }

    #[test]
    fn test_amdt_string_is_not_amd() {
        // Intel boards sometimes carry "AMDT" substrings in firmware strings.
        assert_eq!(detect_vendor("AMDT controller rev 2"), Vendor::Unknown);
    }

    #[test]
    fn test_intel_arc_is_xe_hpg_discrete() {
        let (v, a, f) = classify("Intel Corporation DG2 [Arc A770]", false);
        assert_eq!(v, Vendor::Intel);
        assert_eq!(a, Architecture::XeHpg);
        assert_eq!(f, FormFactor::DesktopDiscrete);
    }

    #[test]
    fn test_intel_xe_lp_mobile_integrated() {
        let (_, a, f) = classify("Intel Corporation Tiger Lake-LP Iris Xe Graphics", true);
        assert_eq!(a, Architecture::XeLp);
        assert_eq!(f, FormFactor::MobileIntegrated);
    }

    #[test]
    fn test_intel_uhd_gen_graphics() {
        let (_, a, _) = classify("Intel Corporation UHD Graphics 630", false);
        assert_eq!(a, Architecture::GenGraphics);
    }

    #[test]
    fn test_mali_is_mobile_only() {
        let (v, a, f) = classify("ARM Mali-G78 MP14", false);
        assert_eq!(v, Vendor::ArmMali);
        assert_eq!(a, Architecture::MaliValhall);
        assert_eq!(f, FormFactor::Mobile);
    }

    #[test]
    fn test_adreno_from_kgsl_node() {
        let (v, a, f) = classify("qualcomm kgsl-3d0 adreno 640", false);
        assert_eq!(v, Vendor::QualcommAdreno);
        assert_eq!(a, Architecture::AdrenoModern);
        assert_eq!(f, FormFactor::Mobile);
    }

    #[test]
    fn test_unknown_defaults() {
        let (v, a, f) = classify("Matrox MGA G200eW", false);
        assert_eq!(v, Vendor::Unknown);
        assert_eq!(a, Architecture::Unknown);
        assert_eq!(f, FormFactor::DesktopDiscrete);
    }

    #[test]
    fn test_max_q_marks_mobile() {
        let (_, _, f) = classify("NVIDIA Corporation TU106 [GeForce RTX 2070 Max-Q]", false);
        assert_eq!(f, FormFactor::MobileDiscrete);
    }

    #[test]
    fn test_m_suffix_marks_mobile() {
        let (_, a, f) = classify("NVIDIA Corporation AD107M [GeForce RTX 4060 Mobile]", false);
        assert_eq!(a, Architecture::AdaLovelace);
        assert_eq!(f, FormFactor::MobileDiscrete);
    }

    #[test]
    fn test_system_flag_resolves_ambiguity() {
        let desktopish = "NVIDIA Corporation GA104 [GeForce RTX 3070]";
        let (_, _, on_desktop) = classify(desktopish, false);
        let (_, _, on_laptop) = classify(desktopish, true);
        assert_eq!(on_desktop, FormFactor::DesktopDiscrete);
        assert_eq!(on_laptop, FormFactor::MobileDiscrete);
    }

    #[test]
    fn test_effects_tier_ordering() {
        assert!(Architecture::AdaLovelace.effects_tier() > Architecture::Pascal.effects_tier());
        assert!(Architecture::Pascal.effects_tier() > Architecture::Unknown.effects_tier());
        assert_eq!(Architecture::Rdna2.effects_tier(), EffectsTier::High);
        assert_eq!(Architecture::MaliBifrost.effects_tier(), EffectsTier::Low);
    }

    #[test]
    fn test_determinism() {
        let raw = "NVIDIA Corporation GA106M [GeForce RTX 3060 Mobile / Max-Q]";
        assert_eq!(classify(raw, true), classify(raw, true));
    }
}
