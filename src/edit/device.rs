//! Adding, removing and formatting whole devices

use super::{find_partitionable_mut, is_used_device};
use crate::api::config::{Collection, ConfigModel, Drive, Filesystem, SpacePolicy};

fn add_to(config: &ConfigModel, list: Collection, name: &str) -> Option<ConfigModel> {
    if config.find_partitionable(name).is_some() {
        return None;
    }

    let mut config = config.clone();
    config.collection_mut(list).push(Drive::new(name));
    Some(config)
}

fn remove_from(config: &ConfigModel, list: Collection, name: &str) -> Option<ConfigModel> {
    config.find_device(list, name)?;

    let mut config = config.clone();
    config.collection_mut(list).retain(|d| d.name != name);
    Some(config)
}

/// Append a drive with the `delete` space policy and no partitions.
/// Nothing happens if the device is already configured.
pub fn add_drive(config: &ConfigModel, name: &str) -> Option<ConfigModel> {
    add_to(config, Collection::Drives, name)
}

pub fn remove_drive(config: &ConfigModel, name: &str) -> Option<ConfigModel> {
    remove_from(config, Collection::Drives, name)
}

pub fn add_md_raid(config: &ConfigModel, name: &str) -> Option<ConfigModel> {
    add_to(config, Collection::MdRaids, name)
}

pub fn remove_md_raid(config: &ConfigModel, name: &str) -> Option<ConfigModel> {
    remove_from(config, Collection::MdRaids, name)
}

/// Move the partitions to be created from `name` to `new_name`
///
/// The old entry stays when it still reuses partitions or is the explicit
/// boot device; its new partitions go either way. When `new_name` is not
/// configured yet, it is added to `target` with the same space policy
/// (except `custom`, whose actions only make sense for the old device).
/// A target formatted as a whole drops its filesystem to take partitions.
pub fn switch_device(
    config: &ConfigModel,
    name: &str,
    new_name: &str,
    target: Collection,
) -> Option<ConfigModel> {
    if name == new_name {
        return None;
    }

    let (list, old) = config.find_partitionable(name)?;
    let (new_partitions, existing): (Vec<_>, Vec<_>) =
        old.partitions.iter().cloned().partition(|p| p.is_new());

    let explicit_boot = config.boot.as_ref().is_some_and(|b| {
        b.device
            .as_ref()
            .is_some_and(|d| !d.default && d.name.as_deref() == Some(name))
    });
    let keep_old = explicit_boot || existing.iter().any(|p| p.is_used());
    let space_policy = old.space_policy.filter(|p| *p != SpacePolicy::Custom);

    let mut config = config.clone();
    if keep_old {
        if let Some(old) = config.find_device_mut(list, name) {
            old.partitions = existing;
        }
    } else {
        config.collection_mut(list).retain(|d| d.name != name);
    }

    match find_partitionable_mut(&mut config, new_name) {
        Some(device) => {
            if !new_partitions.is_empty() {
                device.clear_filesystem();
            }
            device.partitions.extend(new_partitions);
        }
        None => config.collection_mut(target).push(Drive {
            name: new_name.to_string(),
            space_policy,
            partitions: new_partitions,
            ..Default::default()
        }),
    }

    Some(config)
}

/// Format the whole device, dropping any partition configuration.
pub fn set_filesystem(
    config: &ConfigModel,
    name: &str,
    filesystem: Filesystem,
    mount_path: Option<&str>,
) -> Option<ConfigModel> {
    let mut config = config.clone();
    let device = find_partitionable_mut(&mut config, name)?;
    device.filesystem = Some(filesystem);
    device.mount_path = mount_path.map(str::to_string);
    device.partitions.clear();
    Some(config)
}

/// Stop formatting the whole device. Partitions are left as they are.
pub fn delete_filesystem(config: &ConfigModel, name: &str) -> Option<ConfigModel> {
    let mut config = config.clone();
    let device = find_partitionable_mut(&mut config, name)?;
    device.clear_filesystem();
    Some(config)
}

/// Remove the entry if nothing references it anymore
pub(crate) fn prune_unused(config: &mut ConfigModel, name: &str) {
    let Some((list, device)) = config.find_partitionable(name) else {
        return;
    };
    if is_used_device(device) || config.is_target_device(name) {
        return;
    }
    config.collection_mut(list).retain(|d| d.name != name);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::config::{Boot, BootDevice, FilesystemType, Partition};
    use serde_json::json;

    fn with_root(name: &str) -> Drive {
        let mut drive = Drive::new(name);
        drive.partitions.push(Partition {
            mount_path: Some("/".to_string()),
            filesystem: Some(Filesystem::of_type(FilesystemType::Btrfs)),
            ..Default::default()
        });
        drive
    }

    #[test]
    fn add_drive_appends_delete_policy_entry() {
        let config = ConfigModel::default();
        let updated = add_drive(&config, "/dev/vda").unwrap();
        assert_eq!(
            serde_json::to_value(&updated.drives).unwrap(),
            json!([{ "name": "/dev/vda", "spacePolicy": "delete", "partitions": [] }])
        );
        assert!(add_drive(&updated, "/dev/vda").is_none());
        assert!(config.drives.is_empty());
    }

    #[test]
    fn removing_missing_device_is_a_no_op() {
        let config = ConfigModel::default();
        assert!(remove_drive(&config, "/dev/vda").is_none());
        assert!(remove_md_raid(&config, "/dev/md0").is_none());
    }

    #[test]
    fn delete_filesystem_keeps_partitions() {
        let mut drive = with_root("/dev/vda");
        drive.filesystem = Some(Filesystem::of_type(FilesystemType::Xfs));
        drive.mount_path = Some("/srv".to_string());
        let config = ConfigModel {
            drives: vec![drive],
            ..Default::default()
        };

        let updated = delete_filesystem(&config, "/dev/vda").unwrap();
        let drive = &updated.drives[0];
        assert!(drive.filesystem.is_none());
        assert!(drive.mount_path.is_none());
        assert_eq!(drive.partitions.len(), 1);
        assert!(delete_filesystem(&config, "/dev/vdz").is_none());
    }

    #[test]
    fn set_filesystem_replaces_partitions() {
        let config = ConfigModel {
            md_raids: vec![with_root("/dev/md0")],
            ..Default::default()
        };
        let updated = set_filesystem(
            &config,
            "/dev/md0",
            Filesystem::of_type(FilesystemType::Xfs),
            Some("/home"),
        )
        .unwrap();
        let raid = &updated.md_raids[0];
        assert!(raid.partitions.is_empty());
        assert_eq!(raid.mount_path.as_deref(), Some("/home"));
        assert!(updated.validate(None).is_empty());
    }

    #[test]
    fn switch_moves_new_partitions() {
        let mut vda = with_root("/dev/vda");
        vda.space_policy = Some(SpacePolicy::Resize);
        let config = ConfigModel {
            drives: vec![vda],
            ..Default::default()
        };

        let updated = switch_device(&config, "/dev/vda", "/dev/vdb", Collection::Drives).unwrap();
        assert_eq!(updated.drives.len(), 1);
        let vdb = &updated.drives[0];
        assert_eq!(vdb.name, "/dev/vdb");
        assert_eq!(vdb.space_policy, Some(SpacePolicy::Resize));
        assert!(vdb.find_partition("/").is_some());
    }

    #[test]
    fn switch_onto_formatted_device_drops_its_filesystem() {
        let mut vdb = Drive::new("/dev/vdb");
        vdb.filesystem = Some(Filesystem::of_type(FilesystemType::Xfs));
        vdb.mount_path = Some("/srv".to_string());
        let config = ConfigModel {
            drives: vec![with_root("/dev/vda"), vdb],
            ..Default::default()
        };

        let updated = switch_device(&config, "/dev/vda", "/dev/vdb", Collection::Drives).unwrap();
        let vdb = &updated.drives[0];
        assert_eq!(vdb.name, "/dev/vdb");
        assert_eq!(vdb.filesystem, None);
        assert_eq!(vdb.mount_path, None);
        assert!(vdb.find_partition("/").is_some());
        assert!(updated.validate(None).is_empty());
    }

    #[test]
    fn switch_without_new_partitions_keeps_target_format() {
        let mut vdb = Drive::new("/dev/vdb");
        vdb.filesystem = Some(Filesystem::of_type(FilesystemType::Xfs));
        let config = ConfigModel {
            drives: vec![Drive::new("/dev/vda"), vdb.clone()],
            ..Default::default()
        };

        let updated = switch_device(&config, "/dev/vda", "/dev/vdb", Collection::Drives).unwrap();
        assert_eq!(updated.drives, vec![vdb]);
    }

    #[test]
    fn switch_keeps_explicit_boot_device() {
        let config = ConfigModel {
            boot: Some(Boot {
                configure: true,
                device: Some(BootDevice {
                    default: false,
                    name: Some("/dev/vda".to_string()),
                }),
            }),
            drives: vec![with_root("/dev/vda"), Drive::new("/dev/vdb")],
            ..Default::default()
        };

        let updated = switch_device(&config, "/dev/vda", "/dev/vdb", Collection::Drives).unwrap();
        assert_eq!(updated.drives.len(), 2);
        assert!(updated.drives[0].partitions.is_empty());
        assert!(updated.drives[1].find_partition("/").is_some());
        assert!(switch_device(&config, "/dev/vda", "/dev/vda", Collection::Drives).is_none());
    }
}
