//! Derived view of the configuration document
//!
//! [`Model::build`] combines the raw document with the system snapshot and
//! computes every fact the menus ask for. It borrows both inputs and is cheap
//! to rebuild, so callers build a fresh model after each fetch or edit instead
//! of holding on to one.

pub mod partitionable;
pub mod volume_group;

pub use partitionable::{Partition, Partitionable};
pub use volume_group::VolumeGroup;

use crate::api::config::{Collection, ConfigModel};
use crate::api::system::{Device, System};

/// Boot settings as seen by the menus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boot<'a> {
    pub configure: bool,
    pub is_default: bool,
    /// Device named by the document; may be absent even when `is_default`
    pub device_name: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct Model<'a> {
    pub config: &'a ConfigModel,
    pub system: &'a System,
    pub boot: Boot<'a>,
    pub drives: Vec<Partitionable<'a>>,
    pub md_raids: Vec<Partitionable<'a>>,
    pub volume_groups: Vec<VolumeGroup<'a>>,
}

impl<'a> Model<'a> {
    pub fn build(config: &'a ConfigModel, system: &'a System) -> Self {
        let boot = match &config.boot {
            Some(boot) => Boot {
                configure: boot.configure,
                is_default: boot.device.as_ref().is_some_and(|d| d.default),
                device_name: boot.device.as_ref().and_then(|d| d.name.as_deref()),
            },
            None => Boot {
                configure: false,
                is_default: false,
                device_name: None,
            },
        };

        let build_list = move |list: Collection| -> Vec<Partitionable<'a>> {
            config
                .collection(list)
                .iter()
                .enumerate()
                .map(|(index, drive)| Partitionable::build(list, index, drive, config, system))
                .collect()
        };

        Self {
            config,
            system,
            boot,
            drives: build_list(Collection::Drives),
            md_raids: build_list(Collection::MdRaids),
            volume_groups: config
                .volume_groups
                .iter()
                .enumerate()
                .map(|(index, vg)| VolumeGroup::build(index, vg, config))
                .collect(),
        }
    }

    /// Drives followed by MD RAIDs
    pub fn partitionables(&self) -> impl Iterator<Item = &Partitionable<'a>> {
        self.drives.iter().chain(self.md_raids.iter())
    }

    pub fn find_partitionable(&self, name: &str) -> Option<&Partitionable<'a>> {
        self.partitionables().find(|d| d.name() == name)
    }

    pub fn collection(&self, list: Collection) -> &[Partitionable<'a>] {
        match list {
            Collection::Drives => &self.drives,
            Collection::MdRaids => &self.md_raids,
        }
    }

    /// Device hosting the partitions for booting, when the document names one
    pub fn boot_device(&self) -> Option<&Partitionable<'a>> {
        let name = self.boot.device_name?;
        self.find_partitionable(name)
    }

    /// Mount paths of every device and volume group, duplicates preserved
    pub fn get_mount_paths(&self) -> Vec<&'a str> {
        self.partitionables()
            .flat_map(|d| d.get_mount_paths())
            .chain(self.volume_groups.iter().flat_map(|v| v.get_mount_paths()))
            .collect()
    }

    /// Paths proposed by the product that no device uses yet
    pub fn unused_mount_paths(&self) -> Vec<&'a str> {
        let used = self.get_mount_paths();
        self.system
            .volume_templates
            .iter()
            .map(|t| t.mount_path.as_str())
            .filter(|path| !used.contains(path))
            .collect()
    }

    /// Available drives and RAIDs that are not in the document yet
    pub fn unused_devices(&self) -> Vec<&'a Device> {
        self.system
            .available_devices()
            .into_iter()
            .filter(|d| self.config.find_partitionable(&d.name).is_none())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::config::{
        BootDevice, Drive, Filesystem, FilesystemType, LogicalVolume, Partition as ConfigPartition,
        SpacePolicy, VolumeGroup as ConfigVolumeGroup,
    };

    fn partition(mount_path: &str) -> ConfigPartition {
        ConfigPartition {
            mount_path: Some(mount_path.to_string()),
            filesystem: Some(Filesystem::of_type(FilesystemType::Btrfs)),
            ..Default::default()
        }
    }

    fn reused(name: &str, mount_path: &str) -> ConfigPartition {
        ConfigPartition {
            name: Some(name.to_string()),
            ..partition(mount_path)
        }
    }

    fn action_only(name: &str) -> ConfigPartition {
        ConfigPartition {
            name: Some(name.to_string()),
            delete: true,
            ..Default::default()
        }
    }

    fn default_boot() -> Option<crate::api::config::Boot> {
        Some(crate::api::config::Boot {
            configure: true,
            device: Some(BootDevice {
                default: true,
                name: None,
            }),
        })
    }

    #[test]
    fn classifies_new_and_reused_partitions() {
        let system = System::sample();
        let mut vda = Drive::new("/dev/vda");
        vda.partitions = vec![partition("/"), reused("/dev/vda2", "/home"), action_only("/dev/vda3")];
        let config = ConfigModel {
            drives: vec![vda],
            ..Default::default()
        };

        let model = Model::build(&config, &system);
        let drive = &model.drives[0];
        let flags: Vec<(bool, bool)> = drive.partitions.iter().map(|p| (p.is_new, p.is_reused)).collect();
        assert_eq!(flags, vec![(true, false), (false, true), (false, true)]);
        assert!(drive.partitions[2].is_used_by_space_policy);
        assert!(!drive.partitions[2].is_used);
        assert!(drive.is_adding_partitions);
        assert!(drive.is_reusing_partitions);
        assert!(drive.is_used);
    }

    #[test]
    fn stale_partition_names_count_as_new() {
        let system = System::sample();
        let mut vda = Drive::new("/dev/vda");
        vda.partitions = vec![reused("/dev/vda9", "/srv"), action_only("/dev/vda8")];
        let config = ConfigModel {
            drives: vec![vda],
            ..Default::default()
        };

        let model = Model::build(&config, &system);
        let drive = &model.drives[0];
        let flags: Vec<(bool, bool)> = drive.partitions.iter().map(|p| (p.is_new, p.is_reused)).collect();
        assert_eq!(flags, vec![(true, false), (true, false)]);
        assert!(drive.is_adding_partitions);
        assert!(!drive.is_reusing_partitions);
        assert!(drive.get_configured_existing_partitions().is_empty());
    }

    #[test]
    fn unused_stale_entry_leaves_device_unused() {
        let system = System::sample();
        let mut vdb = Drive::new("/dev/vdb");
        vdb.partitions = vec![action_only("/dev/vdb7")];
        let config = ConfigModel {
            drives: vec![vdb],
            ..Default::default()
        };

        let model = Model::build(&config, &system);
        assert!(model.drives[0].partitions[0].is_new);
        assert!(!model.drives[0].is_used);
    }

    #[test]
    fn mount_paths_keep_order_and_duplicates() {
        let system = System::sample();
        let mut vda = Drive::new("/dev/vda");
        vda.partitions = vec![partition("/"), partition("swap"), partition("/")];
        let config = ConfigModel {
            drives: vec![vda],
            ..Default::default()
        };

        let model = Model::build(&config, &system);
        assert_eq!(model.drives[0].get_mount_paths(), vec!["/", "swap", "/"]);
        assert_eq!(model.get_mount_paths(), vec!["/", "swap", "/"]);
        assert_eq!(model.unused_mount_paths(), vec!["/home"]);
        assert!(model.drives[0].get_partition("swap").is_some());
        assert!(model.drives[0].get_partition("/var").is_none());
    }

    #[test]
    fn detached_device_reports_nothing() {
        let system = System::sample();
        let mut gone = Drive::new("/dev/sdz");
        gone.partitions = vec![partition("/")];
        let config = ConfigModel {
            boot: default_boot(),
            drives: vec![gone],
            volume_groups: vec![ConfigVolumeGroup {
                vg_name: "system".to_string(),
                target_devices: vec!["/dev/sdz".to_string()],
                ..Default::default()
            }],
            ..Default::default()
        };

        let model = Model::build(&config, &system);
        let drive = &model.drives[0];
        assert!(drive.is_detached());
        assert!(!drive.is_used);
        assert!(!drive.is_boot);
        assert!(!drive.is_target_device);
        assert!(drive.partitions.is_empty());
        assert!(drive.get_mount_paths().is_empty());
        assert!(drive.get_partition("/").is_none());
        assert!(drive.get_volume_groups().is_empty());
    }

    #[test]
    fn default_boot_follows_root() {
        let system = System::sample();
        let mut vda = Drive::new("/dev/vda");
        vda.partitions = vec![partition("/")];
        let vdb = Drive::new("/dev/vdb");
        let config = ConfigModel {
            boot: default_boot(),
            drives: vec![vda, vdb],
            ..Default::default()
        };

        let model = Model::build(&config, &system);
        assert!(model.drives[0].is_boot);
        assert!(!model.drives[0].is_explicit_boot);
        assert!(!model.drives[1].is_boot);
        assert!(!model.drives[1].is_used);
        assert!(model.boot.is_default);
    }

    #[test]
    fn root_through_volume_group_makes_target_boot() {
        let system = System::sample();
        let config = ConfigModel {
            boot: default_boot(),
            drives: vec![Drive::new("/dev/vdb")],
            volume_groups: vec![ConfigVolumeGroup {
                vg_name: "system".to_string(),
                target_devices: vec!["/dev/vdb".to_string(), "/dev/sdz".to_string()],
                logical_volumes: vec![LogicalVolume {
                    lv_name: Some("root".to_string()),
                    mount_path: Some("/".to_string()),
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        };

        let model = Model::build(&config, &system);
        let vdb = &model.drives[0];
        assert!(vdb.is_boot);
        assert!(vdb.is_target_device);
        assert!(vdb.is_used);
        assert_eq!(vdb.get_volume_groups().len(), 1);
        assert_eq!(model.volume_groups[0].get_target_devices().len(), 1);
        assert_eq!(model.volume_groups[0].target_names(), vec!["/dev/vdb"]);
        assert_eq!(model.volume_groups[0].get_mount_paths(), vec!["/"]);
    }

    #[test]
    fn explicit_boot_marks_device_used() {
        let system = System::sample();
        let config = ConfigModel {
            boot: Some(crate::api::config::Boot {
                configure: true,
                device: Some(BootDevice {
                    default: false,
                    name: Some("/dev/vdb".to_string()),
                }),
            }),
            drives: vec![Drive::new("/dev/vdb")],
            ..Default::default()
        };

        let model = Model::build(&config, &system);
        assert!(model.drives[0].is_explicit_boot);
        assert!(model.drives[0].is_used);
        assert_eq!(model.boot_device().map(|d| d.name()), Some("/dev/vdb"));
    }

    #[test]
    fn configured_existing_partitions_depend_on_policy() {
        let system = System::sample();
        let mut vda = Drive::new("/dev/vda");
        vda.space_policy = Some(SpacePolicy::Custom);
        vda.partitions = vec![reused("/dev/vda2", "/home"), action_only("/dev/vda3")];
        let mut config = ConfigModel {
            drives: vec![vda],
            ..Default::default()
        };

        let model = Model::build(&config, &system);
        assert_eq!(model.drives[0].get_configured_existing_partitions().len(), 2);

        config.drives[0].space_policy = Some(SpacePolicy::Keep);
        let model = Model::build(&config, &system);
        let existing = model.drives[0].get_configured_existing_partitions();
        assert_eq!(existing.len(), 1);
        assert_eq!(existing[0].name(), Some("/dev/vda2"));
    }

    #[test]
    fn unused_devices_shrink_as_drives_are_added() {
        let system = System::sample();
        let mut config = ConfigModel::default();
        assert_eq!(Model::build(&config, &system).unused_devices().len(), 3);

        config.drives.push(Drive::new("/dev/vda"));
        config.md_raids.push(Drive::new("/dev/md0"));
        let unused: Vec<&str> = Model::build(&config, &system)
            .unused_devices()
            .iter()
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(unused, vec!["/dev/vdb"]);
    }
}
