use crate::sysfs::SysfsRoot;

/// DMI chassis types that indicate a portable platform.
/// 8 Portable, 9 Laptop, 10 Notebook, 11 Hand Held, 14 Sub Notebook,
/// 30 Tablet, 31 Convertible, 32 Detachable.
const MOBILE_CHASSIS_TYPES: &[u32] = &[8, 9, 10, 11, 14, 30, 31, 32];

const VM_MARKERS: &[&str] = &["qemu", "kvm", "vmware", "virtualbox", "bochs", "hyper-v"];

/// Infer whether this is a mobile system: battery presence, chassis type or
/// lid switch, negated when DMI strings identify a virtual machine.
pub fn is_mobile_system(sysfs: &SysfsRoot) -> bool {
    if is_virtual_machine(sysfs) {
        return false;
    }
    has_battery(sysfs) || has_mobile_chassis(sysfs) || has_lid_switch(sysfs)
}

fn has_battery(sysfs: &SysfsRoot) -> bool {
    let entries = match sysfs.list_dir("sys/class/power_supply") {
        Ok(e) => e,
        Err(_) => return false,
    };
    entries.iter().any(|name| {
        name.starts_with("BAT")
            && sysfs
                .read_optional(format!("sys/class/power_supply/{}/type", name))
                .unwrap_or(None)
                .as_deref()
                != Some("Mains")
    })
}

fn has_mobile_chassis(sysfs: &SysfsRoot) -> bool {
    sysfs
        .read_optional("sys/class/dmi/id/chassis_type")
        .unwrap_or(None)
        .and_then(|v| v.parse::<u32>().ok())
        .is_some_and(|t| MOBILE_CHASSIS_TYPES.contains(&t))
}

fn has_lid_switch(sysfs: &SysfsRoot) -> bool {
    sysfs.exists("proc/acpi/button/lid")
}

fn is_virtual_machine(sysfs: &SysfsRoot) -> bool {
    for file in &["sys/class/dmi/id/product_name", "sys/class/dmi/id/sys_vendor"] {
        if let Some(value) = sysfs.read_optional(file).unwrap_or(None) {
            let value = value.to_lowercase();
            if VM_MARKERS.iter().any(|m| value.contains(m)) {
                return true;
            }
        }
    }
    false
}
