//! LVM volume groups and logical volumes

use super::find_partitionable_mut;
use crate::api::config::{ConfigModel, LogicalVolume, VolumeGroup};
use tracing::debug;

/// Message for an unusable volume group name
///
/// `current` is the name of the group being edited, which may keep its name.
pub fn vg_name_error(config: &ConfigModel, vg_name: &str, current: Option<&str>) -> Option<String> {
    if vg_name.is_empty() {
        return Some("Enter a name for the volume group.".to_string());
    }
    if config.find_volume_group(vg_name).is_some() && current != Some(vg_name) {
        return Some(format!(
            "Volume group '{}' already exists. Enter a different name.",
            vg_name
        ));
    }
    None
}

/// Logical volume name for a mount path: `/` is `root`, `/var/lib` is `var_lib`
pub fn lv_name_for(mount_path: &str) -> String {
    match mount_path {
        "/" => "root".to_string(),
        path => path.trim_start_matches('/').replace('/', "_"),
    }
}

/// Take the mount points to be created on `device` out of it
fn take_mount_points(config: &mut ConfigModel, device: &str) -> Vec<LogicalVolume> {
    let Some(drive) = find_partitionable_mut(config, device) else {
        return Vec::new();
    };

    let mut volumes = Vec::new();
    if drive.filesystem.is_some() && drive.mount_path.is_some() {
        let mount_path = drive.mount_path.take();
        volumes.push(LogicalVolume {
            lv_name: mount_path.as_deref().map(lv_name_for),
            mount_path,
            filesystem: drive.filesystem.take(),
            ..Default::default()
        });
    }

    let (moved, kept): (Vec<_>, Vec<_>) = drive
        .partitions
        .drain(..)
        .partition(|p| p.is_new() && p.mount_path.is_some());
    drive.partitions = kept;

    volumes.extend(moved.into_iter().map(|p| LogicalVolume {
        lv_name: p.mount_path.as_deref().map(lv_name_for),
        mount_path: p.mount_path,
        filesystem: p.filesystem,
        size: p.size,
        ..Default::default()
    }));
    volumes
}

/// Add a volume group
///
/// With `move_mount_points`, the partitions to be created on the target
/// devices become logical volumes of the new group.
pub fn add_volume_group(
    config: &ConfigModel,
    volume_group: VolumeGroup,
    move_mount_points: bool,
) -> Option<ConfigModel> {
    if vg_name_error(config, &volume_group.vg_name, None).is_some() {
        return None;
    }

    let mut config = config.clone();
    let mut volume_group = volume_group;
    if move_mount_points {
        for target in volume_group.target_devices.clone() {
            let moved = take_mount_points(&mut config, &target);
            debug!("Moving {} mount points from {} to {}", moved.len(), target, volume_group.vg_name);
            volume_group.logical_volumes.extend(moved);
        }
    }
    config.volume_groups.push(volume_group);
    Some(config)
}

/// Create a group called `vg_name` over `targets` holding their mount points
pub fn convert_to_volume_group(config: &ConfigModel, vg_name: &str, targets: &[&str]) -> Option<ConfigModel> {
    add_volume_group(
        config,
        VolumeGroup {
            vg_name: vg_name.to_string(),
            target_devices: targets.iter().map(|t| t.to_string()).collect(),
            ..Default::default()
        },
        true,
    )
}

/// Rename a group or change its target devices. Logical volumes are kept.
pub fn edit_volume_group(config: &ConfigModel, vg_name: &str, data: VolumeGroup) -> Option<ConfigModel> {
    if vg_name_error(config, &data.vg_name, Some(vg_name)).is_some() {
        return None;
    }

    let mut config = config.clone();
    let volume_group = config.find_volume_group_mut(vg_name)?;
    volume_group.vg_name = data.vg_name;
    volume_group.target_devices = data.target_devices;
    if data.extent_size.is_some() {
        volume_group.extent_size = data.extent_size;
    }
    Some(config)
}

pub fn delete_volume_group(config: &ConfigModel, vg_name: &str) -> Option<ConfigModel> {
    config.find_volume_group(vg_name)?;

    let mut config = config.clone();
    config.volume_groups.retain(|v| v.vg_name != vg_name);
    Some(config)
}

pub fn add_logical_volume(config: &ConfigModel, vg_name: &str, volume: LogicalVolume) -> Option<ConfigModel> {
    let mut config = config.clone();
    let volume_group = config.find_volume_group_mut(vg_name)?;
    volume_group.logical_volumes.push(volume);
    Some(config)
}

/// Replace the logical volume mounted at `mount_path`
pub fn edit_logical_volume(
    config: &ConfigModel,
    vg_name: &str,
    mount_path: &str,
    volume: LogicalVolume,
) -> Option<ConfigModel> {
    let mut config = config.clone();
    let slot = config
        .find_volume_group_mut(vg_name)?
        .logical_volumes
        .iter_mut()
        .find(|lv| lv.mount_path.as_deref() == Some(mount_path))?;
    *slot = volume;
    Some(config)
}

pub fn delete_logical_volume(config: &ConfigModel, vg_name: &str, mount_path: &str) -> Option<ConfigModel> {
    let mut config = config.clone();
    let volume_group = config.find_volume_group_mut(vg_name)?;
    let before = volume_group.logical_volumes.len();
    volume_group
        .logical_volumes
        .retain(|lv| lv.mount_path.as_deref() != Some(mount_path));

    (volume_group.logical_volumes.len() != before).then_some(config)
}
