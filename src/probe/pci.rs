use crate::integrator::CommandRunner;
use crate::sysfs::SysfsRoot;
use std::time::Duration;

const PCI_DEVICES: &str = "sys/bus/pci/devices";

const DISPLAY_CLASSES: &[&str] = &[
    "VGA compatible controller",
    "3D controller",
    "Display controller",
];

/// Outcome of PCI enumeration. `None` means no enumeration source exists at
/// all; `Some(vec)` means a source answered, possibly with zero GPUs.
pub fn enumerate(
    sysfs: &SysfsRoot,
    runner: &dyn CommandRunner,
) -> Option<Vec<String>> {
    if runner.have("lspci") {
        if let Some(descriptions) = enumerate_lspci(runner) {
            return Some(descriptions);
        }
    }
    if sysfs.exists(PCI_DEVICES) {
        return Some(enumerate_sysfs(sysfs));
    }
    None
}

fn enumerate_lspci(runner: &dyn CommandRunner) -> Option<Vec<String>> {
    let out = runner
        .run("lspci", &[], &[], Duration::from_secs(10))
        .ok()?;
    if !out.success() {
        return None;
    }
    Some(parse_lspci(&out.stdout))
}

/// Parse an `lspci` listing into raw GPU descriptions, preserving bus order.
/// NVIDIA (and other) audio functions are excluded.
pub fn parse_lspci(listing: &str) -> Vec<String> {
    listing
        .lines()
        .filter_map(|line| {
            // "01:00.0 VGA compatible controller: NVIDIA Corporation ..."
            let rest = line.splitn(2, ' ').nth(1)?;
            let (class, description) = rest.split_once(": ")?;
            if !DISPLAY_CLASSES.iter().any(|c| class.starts_with(c)) {
                return None;
            }
            if class.contains("Audio") || description.contains("Audio") {
                return None;
            }
            Some(description.trim().to_string())
        })
        .collect()
}

/// Fallback enumeration straight from sysfs: PCI class 0x03xxxx devices,
/// described by their vendor/device ids. Sorted addresses match bus order.
fn enumerate_sysfs(sysfs: &SysfsRoot) -> Vec<String> {
    let entries = match sysfs.list_dir(PCI_DEVICES) {
        Ok(e) => e,
        Err(_) => return Vec::new(),
    };

    let mut descriptions = Vec::new();
    for addr in entries {
        let base = format!("{}/{}", PCI_DEVICES, addr);
        let class = sysfs
            .read_optional(format!("{}/class", base))
            .unwrap_or(None)
            .unwrap_or_default();
        if !class.starts_with("0x03") {
            continue;
        }
        let vendor = sysfs
            .read_optional(format!("{}/vendor", base))
            .unwrap_or(None)
            .unwrap_or_default();
        let device = sysfs
            .read_optional(format!("{}/device", base))
            .unwrap_or(None)
            .unwrap_or_default();
        let driver = sysfs.driver_name(format!("{}/driver", base));
        descriptions.push(describe_ids(&vendor, &device, driver.as_deref()));
    }
    descriptions
}

fn describe_ids(vendor: &str, device: &str, driver: Option<&str>) -> String {
    let vendor_name = match vendor {
        "0x8086" => "Intel Corporation",
        "0x1002" => "Advanced Micro Devices [AMD/ATI]",
        "0x10de" => "NVIDIA Corporation",
        other => other,
    };
    match driver {
        Some(driver) => format!("{} Device {} ({})", vendor_name, device, driver),
        None => format!("{} Device {}", vendor_name, device),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const HYBRID_LISTING: &str = "\
00:02.0 VGA compatible controller: Intel Corporation Raptor Lake-P [Iris Xe Graphics] (rev 04)
00:1f.3 Audio device: Intel Corporation Raptor Lake-P/U/H cAVS (rev 01)
01:00.0 VGA compatible controller: NVIDIA Corporation AD107M [GeForce RTX 4060 Max-Q / Mobile] (rev a1)
01:00.1 Audio device: NVIDIA Corporation Device 22be (rev a1)
02:00.0 Ethernet controller: Realtek Semiconductor Co., Ltd. RTL8111 (rev 15)
";

    #[test]
    fn test_parse_lspci_filters_display_classes() {
        let gpus = parse_lspci(HYBRID_LISTING);
        assert_eq!(gpus.len(), 2);
        assert!(gpus[0].contains("Iris Xe"));
        assert!(gpus[1].contains("RTX 4060"));
    }

    #[test]
    fn test_parse_lspci_excludes_nvidia_audio() {
        let gpus = parse_lspci(HYBRID_LISTING);
        assert!(gpus.iter().all(|d| !d.contains("Audio")));
        assert!(gpus.iter().all(|d| !d.contains("22be")));
    }

    #[test]
    fn test_parse_lspci_preserves_bus_order() {
        let gpus = parse_lspci(HYBRID_LISTING);
        assert!(gpus[0].contains("Intel"));
        assert!(gpus[1].contains("NVIDIA"));
    }

    #[test]
    fn test_parse_lspci_3d_controller() {
        let listing = "01:00.0 3D controller: NVIDIA Corporation GP107M [GeForce GTX 1050 Mobile]\n";
        let gpus = parse_lspci(listing);
        assert_eq!(gpus.len(), 1);
    }

    #[test]
    fn test_sysfs_fallback_classifies_by_class() {
        let tmp = TempDir::new().unwrap();
        for (addr, class, vendor, device) in [
            ("0000:00:02.0", "0x030000", "0x8086", "0xa7a0"),
            ("0000:01:00.0", "0x030200", "0x10de", "0x28e0"),
            ("0000:01:00.1", "0x040300", "0x10de", "0x22be"),
        ] {
            let base = tmp.path().join(PCI_DEVICES).join(addr);
            fs::create_dir_all(&base).unwrap();
            fs::write(base.join("class"), format!("{}\n", class)).unwrap();
            fs::write(base.join("vendor"), format!("{}\n", vendor)).unwrap();
            fs::write(base.join("device"), format!("{}\n", device)).unwrap();
        }

        let gpus = enumerate_sysfs(&SysfsRoot::new(tmp.path()));
        assert_eq!(gpus.len(), 2);
        assert!(gpus[0].contains("Intel Corporation"));
        assert!(gpus[1].contains("NVIDIA Corporation"));
    }

    #[test]
    fn test_sysfs_fallback_reports_bound_driver() {
        let tmp = TempDir::new().unwrap();
        let base = tmp.path().join(PCI_DEVICES).join("0000:01:00.0");
        fs::create_dir_all(&base).unwrap();
        fs::write(base.join("class"), "0x030000\n").unwrap();
        fs::write(base.join("vendor"), "0x10de\n").unwrap();
        fs::write(base.join("device"), "0x28e0\n").unwrap();
        fs::write(base.join("driver"), "nvidia\n").unwrap();

        let gpus = enumerate_sysfs(&SysfsRoot::new(tmp.path()));
        assert_eq!(gpus, vec!["NVIDIA Corporation Device 0x28e0 (nvidia)"]);
    }

    #[test]
    fn test_sysfs_fallback_empty_bus() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join(PCI_DEVICES)).unwrap();
        let gpus = enumerate_sysfs(&SysfsRoot::new(tmp.path()));
        assert!(gpus.is_empty());
    }
}
