//! User-facing text for probed devices
//!
//! Menus, tables and dialogs all label devices through these helpers so the
//! wording stays identical everywhere.

use crate::api::config::Filesystem;
use crate::api::system::{Device, DeviceClass, DriveType};
use crate::describe::size::format_size;
use crate::utils::text::{capitalize, format_list, formatted_path};

/// Longest base name shown before truncating with an ellipsis
pub const TRUNCATE_MAX_LENGTH: usize = 17;

/// Text for the boot option when partitions for booting are not configured
pub const BOOT_DISABLED_TEXT: &str =
    "No partitions will be automatically configured for booting. Use with caution.";

/// Display names for filesystem identifiers
const FILESYSTEM_NAMES: &[(&str, &str)] = &[
    ("bcachefs", "Bcachefs"),
    ("bitlocker", "BitLocker"),
    ("btrfs", "Btrfs"),
    ("exfat", "ExFAT"),
    ("ext2", "Ext2"),
    ("ext3", "Ext3"),
    ("ext4", "Ext4"),
    ("f2fs", "F2FS"),
    ("jfs", "JFS"),
    ("nfs", "NFS"),
    ("nilfs2", "NILFS2"),
    ("ntfs", "NTFS"),
    ("reiserfs", "ReiserFS"),
    ("swap", "Swap"),
    ("tmpfs", "Tmpfs"),
    ("vfat", "FAT"),
    ("xfs", "XFS"),
];

/// Last path component, optionally shortened to fit narrow columns.
///
/// Truncation keeps both ends of the name: `nvme0n1p1234567890` becomes
/// `nvme0n1p…34567890`.
pub fn base_name(name: &str, truncate: bool) -> String {
    let base = name.rsplit('/').next().unwrap_or(name);
    let chars: Vec<char> = base.chars().collect();

    if !truncate || chars.len() <= TRUNCATE_MAX_LENGTH {
        return base.to_string();
    }

    let head = (TRUNCATE_MAX_LENGTH - 1).div_ceil(2);
    let tail = chars.len() - (TRUNCATE_MAX_LENGTH - 1) / 2;
    let mut short: String = chars[..head].iter().collect();
    short.push('…');
    short.extend(&chars[tail..]);
    short
}

/// `name, size` label. The size part is left out when unknown.
pub fn name_size_label(name: &str, size: Option<i64>, short: bool) -> String {
    let name = if short {
        base_name(name, true)
    } else {
        name.to_string()
    };

    match size.and_then(format_size) {
        Some(size) => format!("{}, {}", name, size),
        None => name,
    }
}

/// Canonical label of a probed device, e.g. `/dev/sda, 1 KiB`
pub fn device_label(device: &Device, short: bool) -> String {
    name_size_label(&device.name, device.size(), short)
}

/// Display name of a filesystem identifier, capitalized when unknown.
pub fn filesystem_label(fs_type: &str) -> String {
    FILESYSTEM_NAMES
        .iter()
        .find(|(id, _)| *id == fs_type)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| capitalize(fs_type))
}

/// Text for a configured filesystem, `None` when the type is not set yet
pub fn filesystem_type(filesystem: &Filesystem) -> Option<String> {
    let fs_type = filesystem.fs_type?;
    if filesystem.snapshots {
        return Some("Btrfs with snapshots".to_string());
    }
    Some(filesystem_label(fs_type.id()))
}

/// Short noun phrase for the kind of device
pub fn type_description(device: &Device) -> String {
    match device.class {
        DeviceClass::MdRaid => match &device.md {
            Some(md) => format!("Software {}", md.level.to_uppercase()),
            None => "Software RAID".to_string(),
        },
        DeviceClass::Partition => "Partition".to_string(),
        DeviceClass::VolumeGroup => "LVM volume group".to_string(),
        DeviceClass::LogicalVolume => "LVM logical volume".to_string(),
        DeviceClass::Drive => {
            let kind = match device.drive.as_ref().map(|d| d.drive_type) {
                Some(DriveType::Multipath) => return "Multipath".to_string(),
                Some(DriveType::Dasd) => return "DASD".to_string(),
                Some(DriveType::Raid) => "BIOS RAID",
                Some(DriveType::Disk) | None => "disk",
            };

            match &device.partition_table {
                Some(table) => format!("{} {}", table.table_type.label(), kind),
                None => capitalize(kind),
            }
        }
    }
}

/// What the device currently holds
pub fn content_description(device: &Device) -> String {
    let systems = device.systems();
    if !systems.is_empty() {
        return format_list(systems);
    }

    if let Some(table) = &device.partition_table {
        return match device.partitions.len() {
            0 => format!("Empty {} partition table", table.table_type.label()),
            1 => format!("Partitioned with {} (1 partition)", table.table_type.label()),
            n => format!("Partitioned with {} ({} partitions)", table.table_type.label(), n),
        };
    }

    if let Some(fs) = &device.filesystem {
        return format!("{} file system", filesystem_label(&fs.fs_type));
    }

    match &device.description {
        Some(description) if !description.is_empty() => description.clone(),
        _ => "No content found".to_string(),
    }
}

/// Labels of the device filesystem and of its partitions
pub fn filesystem_labels(device: &Device) -> Vec<String> {
    std::iter::once(device)
        .chain(device.partitions.iter())
        .filter_map(|d| d.filesystem.as_ref()?.label.clone())
        .filter(|label| !label.is_empty())
        .collect()
}

/// Text explaining where the partitions for booting will be set up
pub fn boot_label(is_default: bool, device: Option<&Device>) -> String {
    let root = formatted_path("/");

    match (is_default, device) {
        (true, None) => format!(
            "Partitions to boot will be set up if needed at the installation disk, \
             based on the location of the {} file system.",
            root
        ),
        (true, Some(device)) => format!(
            "Partitions to boot will be set up if needed at the installation disk. \
             Currently {}, based on the location of the {} file system.",
            device_label(device, false),
            root
        ),
        (false, Some(device)) => format!(
            "Partitions to boot will be set up if needed at {}.",
            device_label(device, false)
        ),
        (false, None) => {
            "Partitions to boot will be set up if needed at the selected device.".to_string()
        }
    }
}
