//! Partition entries and space policies

use super::find_partitionable_mut;
use crate::api::config::{ConfigModel, Partition, SpaceActionValue, SpacePolicy, SpacePolicyAction};
use crate::api::system::System;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static MOUNT_PATH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^swap$|^/$|^(/[^/\s]+)+$").expect("mount path pattern is valid"));

static LABEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w\-.]*$").expect("label pattern is valid"));

/// Message for an invalid mount path, `None` when it is acceptable
pub fn mount_path_error(mount_path: &str, used: &[&str]) -> Option<String> {
    if mount_path.is_empty() {
        return Some("Enter a mount point".to_string());
    }
    if !MOUNT_PATH_RE.is_match(mount_path) {
        return Some("Select or enter a valid mount point".to_string());
    }
    if used.contains(&mount_path) {
        return Some("Select or enter a mount point that is not already assigned to another device".to_string());
    }
    None
}

/// Message for an invalid filesystem label, `None` when it is acceptable
pub fn label_error(label: &str) -> Option<String> {
    if LABEL_RE.is_match(label) {
        None
    } else {
        Some("Labels may only contain letters, numbers, dashes, underscores and dots".to_string())
    }
}

/// Add a partition to the device
///
/// An entry for the same existing partition is replaced, so reusing a
/// partition that only had a space action keeps a single entry. A device
/// formatted as a whole stops being formatted.
pub fn add_partition(config: &ConfigModel, device: &str, partition: Partition) -> Option<ConfigModel> {
    let mut config = config.clone();
    let drive = find_partitionable_mut(&mut config, device)?;
    drive.clear_filesystem();

    let existing = partition.name.as_ref().and_then(|name| {
        drive
            .partitions
            .iter()
            .position(|p| p.name.as_ref() == Some(name))
    });
    match existing {
        Some(index) => drive.partitions[index] = partition,
        None => drive.partitions.push(partition),
    }
    Some(config)
}

/// Replace the partition currently mounted at `mount_path`
pub fn edit_partition(
    config: &ConfigModel,
    device: &str,
    mount_path: &str,
    partition: Partition,
) -> Option<ConfigModel> {
    let mut config = config.clone();
    let drive = find_partitionable_mut(&mut config, device)?;
    let slot = drive
        .partitions
        .iter_mut()
        .find(|p| p.mount_path.as_deref() == Some(mount_path))?;
    *slot = partition;
    drive.clear_filesystem();
    Some(config)
}

pub fn delete_partition(config: &ConfigModel, device: &str, mount_path: &str) -> Option<ConfigModel> {
    let mut config = config.clone();
    let drive = find_partitionable_mut(&mut config, device)?;
    let before = drive.partitions.len();
    drive
        .partitions
        .retain(|p| p.mount_path.as_deref() != Some(mount_path));

    (drive.partitions.len() != before).then_some(config)
}

/// Change the space policy of a device
///
/// `custom` resets the actions of every existing partition and applies
/// `actions`. Actions are keyed by partition device name, so later mount
/// path changes keep them. Actions naming anything but a probed partition
/// of this device are dropped, and so is every action for a device that is
/// missing from the snapshot or formatted as a whole. Any other policy
/// clears all actions and the entries that only existed to hold one.
pub fn set_space_policy(
    config: &ConfigModel,
    device: &str,
    policy: SpacePolicy,
    actions: &[SpacePolicyAction],
    system: &System,
) -> Option<ConfigModel> {
    let mut config = config.clone();
    let drive = find_partitionable_mut(&mut config, device)?;
    drive.space_policy = Some(policy);

    if policy != SpacePolicy::Custom {
        drive.partitions.retain(|p| !p.is_action_only());
        drive.partitions.iter_mut().for_each(Partition::clear_space_actions);
        return Some(config);
    }

    for partition in drive.partitions.iter_mut().filter(|p| !p.is_new()) {
        partition.clear_space_actions();
        partition.size = None;
    }

    // Formatting wipes the whole device, so there is nothing to act on
    let formatted = drive.has_filesystem();
    let probed = system.find_device_by_name(device).filter(|_| !formatted);
    for action in actions {
        if probed.and_then(|d| d.find_partition(&action.device_name)).is_none() {
            debug!(
                "Dropping space action for {}: not a partition of {}",
                action.device_name, device
            );
            continue;
        }

        let delete = action.value == SpaceActionValue::Delete;
        let resize = action.value == SpaceActionValue::ResizeIfNeeded;
        let existing = drive
            .partitions
            .iter()
            .position(|p| p.name.as_deref() == Some(action.device_name.as_str()));
        match existing {
            Some(index) => {
                let partition = &mut drive.partitions[index];
                partition.delete = delete;
                partition.resize_if_needed = resize;
            }
            None if delete || resize => drive.partitions.push(Partition {
                name: Some(action.device_name.clone()),
                delete,
                resize_if_needed: resize,
                ..Default::default()
            }),
            None => {}
        }
    }

    // Entries left without an action or a use carry no information
    drive
        .partitions
        .retain(|p| !p.is_action_only() || p.has_space_action());
    Some(config)
}
