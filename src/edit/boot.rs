//! Boot and encryption settings

use super::device::prune_unused;
use crate::api::config::{Boot, BootDevice, ConfigModel, Encryption, EncryptionMethod};

/// Replace the boot settings
///
/// A device that was only in the document because it was the explicit boot
/// device is removed along with the old setting.
fn set_boot(config: &ConfigModel, boot: Boot) -> ConfigModel {
    let mut config = config.clone();

    let previous = config
        .boot
        .as_ref()
        .and_then(|b| b.device.as_ref())
        .filter(|d| !d.default)
        .and_then(|d| d.name.clone());
    if let Some(name) = previous {
        prune_unused(&mut config, &name);
    }

    config.boot = Some(boot);
    config
}

pub fn set_boot_device(config: &ConfigModel, name: &str) -> Option<ConfigModel> {
    Some(set_boot(
        config,
        Boot {
            configure: true,
            device: Some(BootDevice {
                default: false,
                name: Some(name.to_string()),
            }),
        },
    ))
}

pub fn set_default_boot_device(config: &ConfigModel) -> Option<ConfigModel> {
    Some(set_boot(
        config,
        Boot {
            configure: true,
            device: Some(BootDevice {
                default: true,
                name: None,
            }),
        },
    ))
}

pub fn disable_boot(config: &ConfigModel) -> Option<ConfigModel> {
    Some(set_boot(
        config,
        Boot {
            configure: false,
            device: None,
        },
    ))
}

pub fn set_encryption(config: &ConfigModel, method: EncryptionMethod, password: &str) -> Option<ConfigModel> {
    let mut config = config.clone();
    config.encryption = Some(Encryption {
        method,
        password: Some(password.to_string()),
    });
    Some(config)
}

/// Drop the encryption settings, password included
pub fn disable_encryption(config: &ConfigModel) -> Option<ConfigModel> {
    let mut config = config.clone();
    config.encryption = None;
    Some(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::config::{Drive, Filesystem, FilesystemType, Partition, VolumeGroup};
    use serde_json::json;

    fn explicit(name: &str) -> Option<Boot> {
        Some(Boot {
            configure: true,
            device: Some(BootDevice {
                default: false,
                name: Some(name.to_string()),
            }),
        })
    }

    #[test]
    fn encryption_toggle() {
        let config = ConfigModel::default();
        let enabled = set_encryption(&config, EncryptionMethod::Luks2, "1234").unwrap();
        assert_eq!(
            serde_json::to_value(&enabled).unwrap()["encryption"],
            json!({ "method": "luks2", "password": "1234" })
        );

        let disabled = disable_encryption(&enabled).unwrap();
        assert_eq!(serde_json::to_value(&disabled).unwrap()["encryption"], json!(null));
    }

    #[test]
    fn unused_explicit_boot_drive_is_removed() {
        let config = ConfigModel {
            boot: explicit("/dev/vdb"),
            drives: vec![Drive::new("/dev/vdb")],
            ..Default::default()
        };

        let updated = set_default_boot_device(&config).unwrap();
        assert!(updated.drives.is_empty());
        assert_eq!(updated.boot.as_ref().and_then(|b| b.device.as_ref()).map(|d| d.default), Some(true));
    }

    #[test]
    fn used_boot_drive_stays() {
        let mut vdb = Drive::new("/dev/vdb");
        vdb.partitions.push(Partition {
            mount_path: Some("/".to_string()),
            filesystem: Some(Filesystem::of_type(FilesystemType::Btrfs)),
            ..Default::default()
        });
        let config = ConfigModel {
            boot: explicit("/dev/vdb"),
            drives: vec![vdb, Drive::new("/dev/vdc")],
            volume_groups: vec![VolumeGroup {
                vg_name: "system".to_string(),
                target_devices: vec!["/dev/vdc".to_string()],
                ..Default::default()
            }],
            ..Default::default()
        };

        let updated = disable_boot(&config).unwrap();
        assert_eq!(updated.drives.len(), 2);
        assert!(!updated.boot.as_ref().unwrap().configure);

        let moved = set_boot_device(&explicit_config("/dev/vdc", &updated), "/dev/vda").unwrap();
        assert_eq!(moved.drives.len(), 2, "target device is kept");
    }

    fn explicit_config(name: &str, config: &ConfigModel) -> ConfigModel {
        ConfigModel {
            boot: explicit(name),
            ..config.clone()
        }
    }
}
