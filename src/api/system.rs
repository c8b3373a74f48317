//! Snapshot of the probed system
//!
//! Everything here is reported by the backend and replaced wholesale on
//! every fetch. Nothing in the crate mutates a snapshot in place.

use crate::api::config::EncryptionMethod;
use serde::{Deserialize, Serialize};

/// Information about a probed block device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub sid: u32,
    /// Kernel name (e.g., /dev/sda)
    pub name: String,
    /// Free-form description from the probe (e.g., "Linux RAID")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub class: DeviceClass,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drive: Option<DriveInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block: Option<Block>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition_table: Option<PartitionTable>,
    #[serde(default)]
    pub partitions: Vec<Device>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filesystem: Option<FilesystemInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub md: Option<MdInfo>,
    #[serde(default)]
    pub logical_volumes: Vec<Device>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeviceClass {
    Drive,
    MdRaid,
    Partition,
    VolumeGroup,
    LogicalVolume,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveInfo {
    #[serde(rename = "type")]
    pub drive_type: DriveType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bus: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriveType {
    Disk,
    Raid,
    Multipath,
    Dasd,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    #[serde(default)]
    pub start: u64,
    /// Size in bytes, `-1` when unknown
    pub size: i64,
    #[serde(default)]
    pub encrypted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shrinking: Option<Shrinking>,
    /// Installed operating systems found on the device
    #[serde(default)]
    pub systems: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Shrinking {
    /// Bytes that can be reclaimed
    Supported(i64),
    /// Reasons the device cannot be shrunk
    Unsupported(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionTable {
    #[serde(rename = "type")]
    pub table_type: PartitionTableType,
    #[serde(default)]
    pub unused_slots: Vec<UnusedSlot>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartitionTableType {
    Gpt,
    Msdos,
    Dasd,
}

impl PartitionTableType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Gpt => "GPT",
            Self::Msdos => "MS-DOS",
            Self::Dasd => "DASD",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnusedSlot {
    pub start: u64,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilesystemInfo {
    #[serde(default)]
    pub sid: u32,
    #[serde(rename = "type")]
    pub fs_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mount_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MdInfo {
    /// RAID level as reported by mdadm (e.g., raid0, raid1)
    pub level: String,
    #[serde(default)]
    pub devices: Vec<u32>,
}

impl Device {
    /// Size in bytes, if known
    pub fn size(&self) -> Option<i64> {
        self.block.as_ref().map(|b| b.size).filter(|s| *s >= 0)
    }

    pub fn systems(&self) -> &[String] {
        self.block.as_ref().map_or(&[], |b| b.systems.as_slice())
    }

    pub fn is_drive(&self) -> bool {
        self.class == DeviceClass::Drive
    }

    pub fn is_md_raid(&self) -> bool {
        self.class == DeviceClass::MdRaid
    }

    /// Look up a direct partition by kernel name
    pub fn find_partition(&self, name: &str) -> Option<&Device> {
        self.partitions.iter().find(|p| p.name == name)
    }

    /// Walk the device and all its descendants
    pub fn descendants(&self) -> Vec<&Device> {
        let mut found = vec![self];
        for child in self.partitions.iter().chain(self.logical_volumes.iter()) {
            found.extend(child.descendants());
        }
        found
    }
}

/// Filesystem defaults the product proposes for a mount path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeTemplate {
    pub mount_path: String,
    pub fs_type: String,
    #[serde(default)]
    pub snapshots: bool,
    #[serde(default)]
    pub min_size: Option<i64>,
    #[serde(default)]
    pub max_size: Option<i64>,
}

/// Reason the backend cannot realize the current configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Storage technologies the backend can activate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    #[serde(default)]
    pub zfcp: bool,
    #[serde(default)]
    pub dasd: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatJob {
    pub id: String,
    #[serde(default)]
    pub running: bool,
    #[serde(default)]
    pub devices: Vec<FormatProgress>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatProgress {
    pub channel: String,
    pub total_cylinders: u64,
    pub formatted_cylinders: u64,
    #[serde(default)]
    pub done: bool,
}

impl FormatJob {
    pub fn is_finished(&self) -> bool {
        !self.running || self.devices.iter().all(|d| d.done)
    }
}

/// The probed system as reported by the backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct System {
    #[serde(default)]
    pub devices: Vec<Device>,
    #[serde(default)]
    pub available_drives: Vec<u32>,
    #[serde(default)]
    pub candidate_drives: Vec<u32>,
    #[serde(default)]
    pub available_md_raids: Vec<u32>,
    #[serde(default)]
    pub candidate_md_raids: Vec<u32>,
    #[serde(default)]
    pub encryption_methods: Vec<EncryptionMethod>,
    #[serde(default)]
    pub volume_templates: Vec<VolumeTemplate>,
}

impl System {
    pub fn from_json(content: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    fn all_devices(&self) -> impl Iterator<Item = &Device> {
        self.devices.iter().flat_map(|d| d.descendants())
    }

    pub fn find_device(&self, sid: u32) -> Option<&Device> {
        self.all_devices().find(|d| d.sid == sid)
    }

    pub fn find_device_by_name(&self, name: &str) -> Option<&Device> {
        self.all_devices().find(|d| d.name == name)
    }

    /// Resolve sids, silently skipping the ones that vanished.
    pub fn find_devices(&self, sids: &[u32]) -> Vec<&Device> {
        sids.iter().filter_map(|sid| self.find_device(*sid)).collect()
    }

    /// Drives and RAIDs that can be used for installing.
    pub fn available_devices(&self) -> Vec<&Device> {
        let sids: Vec<u32> = self
            .available_drives
            .iter()
            .chain(self.available_md_raids.iter())
            .copied()
            .collect();
        self.find_devices(&sids)
    }

    /// Drives and RAIDs suggested as installation targets.
    pub fn candidate_devices(&self) -> Vec<&Device> {
        let sids: Vec<u32> = self
            .candidate_drives
            .iter()
            .chain(self.candidate_md_raids.iter())
            .copied()
            .collect();
        self.find_devices(&sids)
    }

    pub fn volume_template(&self, mount_path: &str) -> Option<&VolumeTemplate> {
        self.volume_templates
            .iter()
            .find(|v| v.mount_path == mount_path)
    }

    pub fn supports_tpm(&self) -> bool {
        self.encryption_methods.contains(&EncryptionMethod::TpmFde)
    }

    /// Snapshot of a small virtual machine, used by `generate-config` and tests
    ///
    /// * `/dev/vda` (20 GiB, GPT): vda1 (BIOS boot), vda2 (ext4 "data"),
    ///   vda3 (NTFS, Windows)
    /// * `/dev/vdb` (10 GiB, empty)
    /// * `/dev/md0` (RAID1 over two extra disks, 5 GiB)
    pub fn sample() -> Self {
        const GIB: i64 = 1024 * 1024 * 1024;

        let partition = |sid: u32, name: &str, start: u64, size: i64, fs: Option<(&str, &str)>| {
            Device {
                sid,
                name: name.to_string(),
                description: None,
                class: DeviceClass::Partition,
                drive: None,
                block: Some(Block {
                    start,
                    size,
                    ..Default::default()
                }),
                partition_table: None,
                partitions: vec![],
                filesystem: fs.map(|(fs_type, label)| FilesystemInfo {
                    sid: sid + 100,
                    fs_type: fs_type.to_string(),
                    mount_path: None,
                    label: Some(label.to_string()).filter(|l| !l.is_empty()),
                }),
                md: None,
                logical_volumes: vec![],
            }
        };

        let disk = |sid: u32, name: &str, size: i64, partitions: Vec<Device>, systems: Vec<String>| {
            let partition_table = (!partitions.is_empty()).then(|| PartitionTable {
                table_type: PartitionTableType::Gpt,
                unused_slots: vec![],
            });
            Device {
                sid,
                name: name.to_string(),
                description: None,
                class: DeviceClass::Drive,
                drive: Some(DriveInfo {
                    drive_type: DriveType::Disk,
                    vendor: Some("Virtio".to_string()),
                    model: None,
                    transport: None,
                    bus: None,
                }),
                block: Some(Block {
                    size,
                    systems,
                    ..Default::default()
                }),
                partition_table,
                partitions,
                filesystem: None,
                md: None,
                logical_volumes: vec![],
            }
        };

        let vda = disk(
            10,
            "/dev/vda",
            20 * GIB,
            vec![
                partition(11, "/dev/vda1", 2048, 8 * 1024 * 1024, None),
                partition(12, "/dev/vda2", 18432, 9 * GIB, Some(("ext4", "data"))),
                partition(13, "/dev/vda3", 18894848, 10 * GIB, Some(("ntfs", ""))),
            ],
            vec!["Windows 10".to_string()],
        );
        let vdb = disk(20, "/dev/vdb", 10 * GIB, vec![], vec![]);

        let md0 = Device {
            sid: 30,
            name: "/dev/md0".to_string(),
            description: Some("Software RAID".to_string()),
            class: DeviceClass::MdRaid,
            drive: None,
            block: Some(Block {
                size: 5 * GIB,
                ..Default::default()
            }),
            partition_table: None,
            partitions: vec![],
            filesystem: None,
            md: Some(MdInfo {
                level: "raid1".to_string(),
                devices: vec![31, 32],
            }),
            logical_volumes: vec![],
        };

        Self {
            devices: vec![vda, vdb, md0],
            available_drives: vec![10, 20],
            candidate_drives: vec![10, 20],
            available_md_raids: vec![30],
            candidate_md_raids: vec![],
            encryption_methods: vec![EncryptionMethod::Luks2, EncryptionMethod::Luks1],
            volume_templates: vec![
                VolumeTemplate {
                    mount_path: "/".to_string(),
                    fs_type: "btrfs".to_string(),
                    snapshots: true,
                    min_size: Some(5 * GIB),
                    max_size: None,
                },
                VolumeTemplate {
                    mount_path: "swap".to_string(),
                    fs_type: "swap".to_string(),
                    snapshots: false,
                    min_size: Some(GIB),
                    max_size: Some(2 * GIB),
                },
                VolumeTemplate {
                    mount_path: "/home".to_string(),
                    fs_type: "xfs".to_string(),
                    snapshots: false,
                    min_size: Some(5 * GIB),
                    max_size: None,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"{
        "devices": [{
            "sid": 59,
            "name": "/dev/sda",
            "class": "drive",
            "drive": { "type": "disk", "model": "QEMU HARDDISK" },
            "block": { "size": 1073741824, "systems": ["openSUSE Leap 15.6"] },
            "partitionTable": { "type": "gpt", "unusedSlots": [] },
            "partitions": [
                { "sid": 60, "name": "/dev/sda1", "class": "partition",
                  "block": { "start": 2048, "size": 536870912 },
                  "filesystem": { "sid": 61, "type": "ext4", "label": "data" } }
            ]
        }],
        "availableDrives": [59, 99],
        "candidateDrives": [59],
        "encryptionMethods": ["luks2", "tpmFde"]
    }"#;

    #[test]
    fn finds_nested_devices() {
        let system = System::from_json(SNAPSHOT).unwrap();
        assert_eq!(system.find_device(60).unwrap().name, "/dev/sda1");
        assert_eq!(system.find_device_by_name("/dev/sda").unwrap().sid, 59);
        assert!(system.find_device_by_name("/dev/sdb").is_none());
    }

    #[test]
    fn skips_vanished_sids() {
        let system = System::from_json(SNAPSHOT).unwrap();
        let available = system.available_devices();
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].name, "/dev/sda");
        assert!(system.supports_tpm());
    }

    #[test]
    fn sample_lists_available_devices() {
        let system = System::sample();
        let names: Vec<&str> = system.available_devices().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["/dev/vda", "/dev/vdb", "/dev/md0"]);
        assert_eq!(system.find_device_by_name("/dev/vda2").unwrap().sid, 12);
        assert!(!system.supports_tpm());
    }

    #[test]
    fn unknown_size_is_none() {
        let device = Device {
            sid: 1,
            name: "/dev/vdz".to_string(),
            description: None,
            class: DeviceClass::Drive,
            drive: None,
            block: Some(Block {
                size: -1,
                ..Default::default()
            }),
            partition_table: None,
            partitions: vec![],
            filesystem: None,
            md: None,
            logical_volumes: vec![],
        };
        assert_eq!(device.size(), None);
        assert!(device.systems().is_empty());
    }
}
