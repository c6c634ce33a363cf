use crate::sysfs::SysfsRoot;

/// Well-known sysfs/debugfs nodes for embedded GPUs on ARM platforms.
const MALI_NODE: &str = "sys/class/misc/mali0/device";
const KGSL_NODE: &str = "sys/class/kgsl/kgsl-3d0";
const PVR_NODE: &str = "sys/devices/platform/pvrsrvkm";

/// Whether any embedded enumeration source exists on this system.
pub fn source_present(sysfs: &SysfsRoot) -> bool {
    sysfs.exists(MALI_NODE) || sysfs.exists(KGSL_NODE) || sysfs.exists(PVR_NODE)
}

/// Enumerate embedded GPUs. Descriptions come from the node's model file
/// where one exists, else a generic vendor string.
pub fn enumerate(sysfs: &SysfsRoot) -> Vec<String> {
    let mut descriptions = Vec::new();

    if sysfs.exists(MALI_NODE) {
        let model = sysfs
            .read_optional(format!("{}/gpuinfo", MALI_NODE))
            .unwrap_or(None)
            .unwrap_or_else(|| "ARM Mali GPU".to_string());
        descriptions.push(model);
    }

    if sysfs.exists(KGSL_NODE) {
        let model = sysfs
            .read_optional(format!("{}/gpu_model", KGSL_NODE))
            .unwrap_or(None)
            .map(|m| format!("Qualcomm Adreno {}", m))
            .unwrap_or_else(|| "Qualcomm Adreno (kgsl)".to_string());
        descriptions.push(model);
    }

    if sysfs.exists(PVR_NODE) {
        descriptions.push("Imagination PowerVR".to_string());
    }

    descriptions
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_no_embedded_nodes() {
        let tmp = TempDir::new().unwrap();
        let sysfs = SysfsRoot::new(tmp.path());
        assert!(!source_present(&sysfs));
        assert!(enumerate(&sysfs).is_empty());
    }

    #[test]
    fn test_mali_node_with_model() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join(MALI_NODE)).unwrap();
        fs::write(
            tmp.path().join(MALI_NODE).join("gpuinfo"),
            "Mali-G78 MP14 r1p1\n",
        )
        .unwrap();
        let sysfs = SysfsRoot::new(tmp.path());
        assert!(source_present(&sysfs));
        assert_eq!(enumerate(&sysfs), vec!["Mali-G78 MP14 r1p1"]);
    }

    #[test]
    fn test_adreno_node_without_model() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join(KGSL_NODE)).unwrap();
        let sysfs = SysfsRoot::new(tmp.path());
        assert_eq!(enumerate(&sysfs), vec!["Qualcomm Adreno (kgsl)"]);
    }
}
