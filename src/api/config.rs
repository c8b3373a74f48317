//! The storage configuration document
//!
//! This is the shape the backend accepts and returns: the user's desired
//! layout of drives, MD RAIDs and volume groups plus the global encryption
//! and boot settings. Every edit produces a new document that is submitted
//! whole.

use crate::api::system::System;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::utils::error::StorageError;

/// Root of the configuration document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boot: Option<Boot>,
    /// `None` serializes as `null`, which is how the backend is told to
    /// disable encryption.
    #[serde(default)]
    pub encryption: Option<Encryption>,
    #[serde(default)]
    pub drives: Vec<Drive>,
    #[serde(default)]
    pub md_raids: Vec<MdRaid>,
    #[serde(default)]
    pub volume_groups: Vec<VolumeGroup>,
}

/// Collections holding partitionable devices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Collection {
    Drives,
    MdRaids,
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Drives => write!(f, "drives"),
            Self::MdRaids => write!(f, "mdRaids"),
        }
    }
}

impl FromStr for Collection {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "drives" => Ok(Self::Drives),
            "mdRaids" => Ok(Self::MdRaids),
            other => Err(StorageError::InvalidRoute(format!(
                "unknown collection '{}'",
                other
            ))),
        }
    }
}

/// A drive or an MD RAID entry. Both share the same shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Drive {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mount_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filesystem: Option<Filesystem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_policy: Option<SpacePolicy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ptable_type: Option<PtableType>,
    #[serde(default)]
    pub partitions: Vec<Partition>,
}

pub type MdRaid = Drive;

impl Drive {
    /// New entry as created by the "add device" operations.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            space_policy: Some(SpacePolicy::Delete),
            ..Default::default()
        }
    }

    /// Whether the whole device is formatted instead of partitioned.
    pub fn has_filesystem(&self) -> bool {
        self.filesystem.is_some()
    }

    /// Stop formatting the device as a whole
    pub fn clear_filesystem(&mut self) {
        self.filesystem = None;
        self.mount_path = None;
    }

    pub fn find_partition(&self, mount_path: &str) -> Option<&Partition> {
        self.partitions
            .iter()
            .find(|p| p.mount_path.as_deref() == Some(mount_path))
    }

    /// Custom space actions, rebuilt from the per-partition flags.
    pub fn actions(&self) -> Vec<SpacePolicyAction> {
        self.partitions
            .iter()
            .filter_map(|p| {
                let name = p.name.as_ref()?;
                let value = if p.delete {
                    SpaceActionValue::Delete
                } else if p.resize_if_needed {
                    SpaceActionValue::ResizeIfNeeded
                } else {
                    return None;
                };
                Some(SpacePolicyAction {
                    device_name: name.clone(),
                    value,
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpacePolicy {
    #[default]
    Delete,
    Resize,
    Keep,
    Custom,
}

impl fmt::Display for SpacePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delete => write!(f, "delete"),
            Self::Resize => write!(f, "resize"),
            Self::Keep => write!(f, "keep"),
            Self::Custom => write!(f, "custom"),
        }
    }
}

impl FromStr for SpacePolicy {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "delete" => Ok(Self::Delete),
            "resize" => Ok(Self::Resize),
            "keep" => Ok(Self::Keep),
            "custom" => Ok(Self::Custom),
            other => Err(StorageError::ValidationError(format!(
                "unknown space policy '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PtableType {
    Gpt,
    Msdos,
    Dasd,
}

/// What to do with an existing partition under the custom policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SpaceActionValue {
    Delete,
    ResizeIfNeeded,
    Keep,
}

impl FromStr for SpaceActionValue {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "delete" => Ok(Self::Delete),
            "resizeIfNeeded" | "resize" => Ok(Self::ResizeIfNeeded),
            "keep" => Ok(Self::Keep),
            other => Err(StorageError::ValidationError(format!(
                "unknown space action '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpacePolicyAction {
    pub device_name: String,
    pub value: SpaceActionValue,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Partition {
    /// Name of an existing partition. Absent for partitions to be created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mount_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filesystem: Option<Filesystem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub delete: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub delete_if_needed: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub resize_if_needed: bool,
}

impl Partition {
    pub fn is_new(&self) -> bool {
        self.name.is_none()
    }

    /// Carries a mount path or a filesystem, i.e. takes part in the layout.
    pub fn is_used(&self) -> bool {
        self.filesystem.is_some() || self.mount_path.is_some()
    }

    pub fn has_space_action(&self) -> bool {
        self.delete || self.delete_if_needed || self.resize_if_needed
    }

    /// Entry that only exists to hold a custom space action.
    pub fn is_action_only(&self) -> bool {
        !self.is_new() && !self.is_used()
    }

    pub fn clear_space_actions(&mut self) {
        self.delete = false;
        self.delete_if_needed = false;
        self.resize_if_needed = false;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeGroup {
    pub vg_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extent_size: Option<i64>,
    #[serde(default)]
    pub target_devices: Vec<String>,
    #[serde(default)]
    pub logical_volumes: Vec<LogicalVolume>,
}

impl VolumeGroup {
    /// Device path the volume group will get once created.
    pub fn device_name(&self) -> String {
        format!("/dev/{}", self.vg_name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogicalVolume {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lv_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mount_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filesystem: Option<Filesystem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stripes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stripe_size: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filesystem {
    #[serde(default, skip_serializing_if = "is_false")]
    pub reuse: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub default: bool,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub fs_type: Option<FilesystemType>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub snapshots: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Filesystem {
    pub fn of_type(fs_type: FilesystemType) -> Self {
        Self {
            fs_type: Some(fs_type),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilesystemType {
    Bcachefs,
    Btrfs,
    Exfat,
    Ext2,
    Ext3,
    Ext4,
    F2fs,
    Jfs,
    Nfs,
    Nilfs2,
    Ntfs,
    Reiserfs,
    Swap,
    Tmpfs,
    Vfat,
    Xfs,
}

impl FilesystemType {
    /// Identifier used on the wire and by the system snapshot.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Bcachefs => "bcachefs",
            Self::Btrfs => "btrfs",
            Self::Exfat => "exfat",
            Self::Ext2 => "ext2",
            Self::Ext3 => "ext3",
            Self::Ext4 => "ext4",
            Self::F2fs => "f2fs",
            Self::Jfs => "jfs",
            Self::Nfs => "nfs",
            Self::Nilfs2 => "nilfs2",
            Self::Ntfs => "ntfs",
            Self::Reiserfs => "reiserfs",
            Self::Swap => "swap",
            Self::Tmpfs => "tmpfs",
            Self::Vfat => "vfat",
            Self::Xfs => "xfs",
        }
    }
}

/// Size limits in bytes. A missing or negative `max` means unlimited.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Size {
    #[serde(default, skip_serializing_if = "is_false")]
    pub default: bool,
    pub min: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
}

impl Size {
    pub fn is_unlimited(&self) -> bool {
        self.max.map_or(true, |max| max < 0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EncryptionMethod {
    Luks1,
    Luks2,
    PervasiveLuks2,
    TpmFde,
    ProtectedSwap,
    SecureSwap,
    RandomSwap,
}

impl EncryptionMethod {
    pub fn requires_password(&self) -> bool {
        matches!(
            self,
            Self::Luks1 | Self::Luks2 | Self::PervasiveLuks2 | Self::TpmFde
        )
    }
}

impl fmt::Display for EncryptionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Luks1 => write!(f, "LUKS1"),
            Self::Luks2 => write!(f, "LUKS2"),
            Self::PervasiveLuks2 => write!(f, "Pervasive LUKS2"),
            Self::TpmFde => write!(f, "TPM-based Full Disk Encryption"),
            Self::ProtectedSwap => write!(f, "Protected swap"),
            Self::SecureSwap => write!(f, "Secure swap"),
            Self::RandomSwap => write!(f, "Random swap"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Encryption {
    pub method: EncryptionMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Boot {
    #[serde(default)]
    pub configure: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<BootDevice>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootDevice {
    #[serde(default)]
    pub default: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// A broken document rule, reported as a value instead of an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    DuplicatedDevice(String),
    FilesystemAndPartitions(String),
    ActionsWithoutCustomPolicy(String),
    EncryptionWithoutPassword,
    UnknownPartition { device: String, partition: String },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicatedDevice(name) => write!(f, "{} is configured more than once", name),
            Self::FilesystemAndPartitions(name) => {
                write!(f, "{} cannot be formatted and partitioned at once", name)
            }
            Self::ActionsWithoutCustomPolicy(name) => write!(
                f,
                "{} has per-partition space actions but its space policy is not custom",
                name
            ),
            Self::EncryptionWithoutPassword => {
                write!(f, "The encryption method requires a password")
            }
            Self::UnknownPartition { device, partition } => {
                write!(f, "{} does not contain the partition {}", device, partition)
            }
        }
    }
}

impl ConfigModel {
    /// Load a document from its JSON representation
    pub fn from_json(content: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn collection(&self, collection: Collection) -> &[Drive] {
        match collection {
            Collection::Drives => &self.drives,
            Collection::MdRaids => &self.md_raids,
        }
    }

    pub fn collection_mut(&mut self, collection: Collection) -> &mut Vec<Drive> {
        match collection {
            Collection::Drives => &mut self.drives,
            Collection::MdRaids => &mut self.md_raids,
        }
    }

    pub fn find_device(&self, collection: Collection, name: &str) -> Option<&Drive> {
        self.collection(collection).iter().find(|d| d.name == name)
    }

    pub fn find_device_mut(&mut self, collection: Collection, name: &str) -> Option<&mut Drive> {
        self.collection_mut(collection)
            .iter_mut()
            .find(|d| d.name == name)
    }

    pub fn find_drive(&self, name: &str) -> Option<&Drive> {
        self.find_device(Collection::Drives, name)
    }

    /// Look a partitionable device up in either collection
    pub fn find_partitionable(&self, name: &str) -> Option<(Collection, &Drive)> {
        self.find_drive(name)
            .map(|d| (Collection::Drives, d))
            .or_else(|| {
                self.find_device(Collection::MdRaids, name)
                    .map(|d| (Collection::MdRaids, d))
            })
    }

    pub fn find_volume_group(&self, vg_name: &str) -> Option<&VolumeGroup> {
        self.volume_groups.iter().find(|v| v.vg_name == vg_name)
    }

    pub fn find_volume_group_mut(&mut self, vg_name: &str) -> Option<&mut VolumeGroup> {
        self.volume_groups.iter_mut().find(|v| v.vg_name == vg_name)
    }

    /// Whether any volume group takes its physical volumes from `name`.
    pub fn is_target_device(&self, name: &str) -> bool {
        self.volume_groups
            .iter()
            .any(|v| v.target_devices.iter().any(|t| t == name))
    }

    /// Mount paths assigned anywhere in the document, in declaration order.
    pub fn used_mount_paths(&self) -> Vec<String> {
        let devices = self.drives.iter().chain(self.md_raids.iter());
        let mut paths: Vec<String> = devices
            .flat_map(|d| {
                d.mount_path
                    .iter()
                    .chain(d.partitions.iter().filter_map(|p| p.mount_path.as_ref()))
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .collect();

        paths.extend(
            self.volume_groups
                .iter()
                .flat_map(|v| v.logical_volumes.iter())
                .filter_map(|lv| lv.mount_path.clone()),
        );
        paths
    }

    /// Check the document rules.
    ///
    /// The system snapshot is optional: without it, partitions referring to
    /// existing devices cannot be verified.
    pub fn validate(&self, system: Option<&System>) -> Vec<Violation> {
        let mut violations = Vec::new();
        let mut seen = HashSet::new();

        let names = self
            .drives
            .iter()
            .chain(self.md_raids.iter())
            .map(|d| d.name.clone())
            .chain(self.volume_groups.iter().map(|v| v.device_name()));
        for name in names {
            if !seen.insert(name.clone()) {
                violations.push(Violation::DuplicatedDevice(name));
            }
        }

        for device in self.drives.iter().chain(self.md_raids.iter()) {
            if device.has_filesystem() && !device.partitions.is_empty() {
                violations.push(Violation::FilesystemAndPartitions(device.name.clone()));
            }

            if device.space_policy != Some(SpacePolicy::Custom) && !device.actions().is_empty() {
                violations.push(Violation::ActionsWithoutCustomPolicy(device.name.clone()));
            }

            let Some(system_device) = system.and_then(|s| s.find_device_by_name(&device.name))
            else {
                continue;
            };
            for name in device.partitions.iter().filter_map(|p| p.name.as_ref()) {
                if system_device.find_partition(name).is_none() {
                    violations.push(Violation::UnknownPartition {
                        device: device.name.clone(),
                        partition: name.clone(),
                    });
                }
            }
        }

        if let Some(encryption) = &self.encryption {
            let empty = encryption.password.as_deref().map_or(true, str::is_empty);
            if encryption.method.requires_password() && empty {
                violations.push(Violation::EncryptionWithoutPassword);
            }
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_drive_defaults_to_delete_policy() {
        let drive = Drive::new("/dev/vda");
        let value = serde_json::to_value(&drive).unwrap();
        assert_eq!(
            value,
            json!({ "name": "/dev/vda", "spacePolicy": "delete", "partitions": [] })
        );
    }

    #[test]
    fn disabled_encryption_serializes_as_null() {
        let config = ConfigModel::default();
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["encryption"], serde_json::Value::Null);
    }

    #[test]
    fn parses_backend_document() {
        let config = ConfigModel::from_json(
            r#"{
                "boot": { "configure": true, "device": { "default": true } },
                "encryption": { "method": "tpmFde", "password": "secret" },
                "drives": [{
                    "name": "/dev/vda",
                    "spacePolicy": "custom",
                    "partitions": [
                        { "name": "/dev/vda1", "delete": true },
                        { "mountPath": "/", "filesystem": { "type": "btrfs", "snapshots": true },
                          "size": { "default": true, "min": 1024, "max": -1 } }
                    ]
                }],
                "volumeGroups": [{ "vgName": "system", "targetDevices": ["/dev/vda"] }]
            }"#,
        )
        .unwrap();

        assert_eq!(config.encryption.as_ref().unwrap().method, EncryptionMethod::TpmFde);
        assert!(config.md_raids.is_empty());
        let drive = &config.drives[0];
        assert_eq!(drive.space_policy, Some(SpacePolicy::Custom));
        assert!(drive.partitions[1].size.as_ref().unwrap().is_unlimited());
        assert!(config.is_target_device("/dev/vda"));
        assert_eq!(
            drive.actions(),
            vec![SpacePolicyAction {
                device_name: "/dev/vda1".to_string(),
                value: SpaceActionValue::Delete,
            }]
        );
    }

    #[test]
    fn validate_reports_duplicates_and_exclusivity() {
        let mut formatted = Drive::new("/dev/vda");
        formatted.filesystem = Some(Filesystem::of_type(FilesystemType::Xfs));
        formatted.partitions.push(Partition {
            mount_path: Some("/home".to_string()),
            ..Default::default()
        });

        let config = ConfigModel {
            drives: vec![formatted, Drive::new("/dev/vda")],
            ..Default::default()
        };

        let violations = config.validate(None);
        assert!(violations.contains(&Violation::DuplicatedDevice("/dev/vda".to_string())));
        assert!(violations.contains(&Violation::FilesystemAndPartitions("/dev/vda".to_string())));
    }

    #[test]
    fn validate_rejects_actions_outside_custom_policy() {
        let mut drive = Drive::new("/dev/vda");
        drive.partitions.push(Partition {
            name: Some("/dev/vda1".to_string()),
            resize_if_needed: true,
            ..Default::default()
        });
        let config = ConfigModel {
            drives: vec![drive],
            ..Default::default()
        };

        assert_eq!(
            config.validate(None),
            vec![Violation::ActionsWithoutCustomPolicy("/dev/vda".to_string())]
        );
    }

    #[test]
    fn validate_requires_password_for_tpm() {
        let config = ConfigModel {
            encryption: Some(Encryption {
                method: EncryptionMethod::TpmFde,
                password: Some(String::new()),
            }),
            ..Default::default()
        };
        assert_eq!(
            config.validate(None),
            vec![Violation::EncryptionWithoutPassword]
        );
    }

    #[test]
    fn used_mount_paths_keeps_duplicates() {
        let mut vda = Drive::new("/dev/vda");
        vda.partitions = vec![
            Partition {
                mount_path: Some("/".to_string()),
                ..Default::default()
            },
            Partition {
                mount_path: Some("/".to_string()),
                ..Default::default()
            },
        ];
        let config = ConfigModel {
            drives: vec![vda],
            volume_groups: vec![VolumeGroup {
                vg_name: "system".to_string(),
                logical_volumes: vec![LogicalVolume {
                    mount_path: Some("/home".to_string()),
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        };

        assert_eq!(config.used_mount_paths(), vec!["/", "/", "/home"]);
    }
}
