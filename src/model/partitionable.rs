//! Facades over drives and MD RAIDs

use crate::api::config::{
    self, Collection, ConfigModel, Filesystem, Size, SpacePolicy,
};
use crate::api::system::{Device, System};

/// A configured partition combined with what the probe knows about it
#[derive(Debug, Clone)]
pub struct Partition<'a> {
    pub config: &'a config::Partition,
    /// Probed partition, when the entry refers to an existing one
    pub device: Option<&'a Device>,
    /// No partition with this name in the snapshot, including entries whose
    /// name went stale
    pub is_new: bool,
    pub is_used: bool,
    pub is_reused: bool,
    pub is_used_by_space_policy: bool,
}

impl<'a> Partition<'a> {
    pub(crate) fn build(config: &'a config::Partition, disk: Option<&'a Device>) -> Self {
        let device = config
            .name
            .as_deref()
            .and_then(|name| disk.and_then(|d| d.find_partition(name)));

        Self {
            config,
            device,
            is_new: device.is_none(),
            is_used: config.is_used(),
            is_reused: device.is_some(),
            is_used_by_space_policy: config.has_space_action(),
        }
    }

    pub fn name(&self) -> Option<&'a str> {
        self.config.name.as_deref()
    }

    pub fn mount_path(&self) -> Option<&'a str> {
        self.config.mount_path.as_deref()
    }

    pub fn filesystem(&self) -> Option<&'a Filesystem> {
        self.config.filesystem.as_ref()
    }

    pub fn size(&self) -> Option<&'a Size> {
        self.config.size.as_ref()
    }

    /// Reused and taking part in the layout
    pub fn is_reused_and_used(&self) -> bool {
        self.is_reused && self.is_used
    }
}

/// Read-enriched view of a drive or MD RAID entry
///
/// A device whose name is not in the system snapshot is *detached*: it keeps
/// its raw entry but every derived fact reports it as unused.
#[derive(Debug, Clone)]
pub struct Partitionable<'a> {
    pub list: Collection,
    pub list_index: usize,
    pub config: &'a config::Drive,
    pub device: Option<&'a Device>,
    pub partitions: Vec<Partition<'a>>,
    pub is_used: bool,
    pub is_boot: bool,
    pub is_explicit_boot: bool,
    pub is_target_device: bool,
    pub is_adding_partitions: bool,
    pub is_reusing_partitions: bool,
    volume_groups: Vec<&'a config::VolumeGroup>,
}

impl<'a> Partitionable<'a> {
    pub(crate) fn build(
        list: Collection,
        list_index: usize,
        config: &'a config::Drive,
        model: &'a ConfigModel,
        system: &'a System,
    ) -> Self {
        let Some(device) = system.find_device_by_name(&config.name) else {
            return Self {
                list,
                list_index,
                config,
                device: None,
                partitions: Vec::new(),
                is_used: false,
                is_boot: false,
                is_explicit_boot: false,
                is_target_device: false,
                is_adding_partitions: false,
                is_reusing_partitions: false,
                volume_groups: Vec::new(),
            };
        };

        let partitions: Vec<Partition<'a>> = config
            .partitions
            .iter()
            .map(|p| Partition::build(p, Some(device)))
            .collect();

        let volume_groups: Vec<&'a config::VolumeGroup> = model
            .volume_groups
            .iter()
            .filter(|v| v.target_devices.iter().any(|t| *t == config.name))
            .collect();

        let is_target_device = model.is_target_device(&config.name);
        let is_adding_partitions = partitions
            .iter()
            .any(|p| p.is_new && p.mount_path().is_some());
        let is_reusing_partitions = partitions.iter().any(Partition::is_reused_and_used);

        let (is_boot, is_default_boot) = boot_flags(config, model);
        let is_explicit_boot = is_boot && !is_default_boot;

        let is_used = config.has_filesystem()
            || config.mount_path.is_some()
            || partitions.iter().any(|p| p.config.is_new() || p.is_used)
            || is_target_device
            || is_explicit_boot;

        Self {
            list,
            list_index,
            config,
            device: Some(device),
            partitions,
            is_used,
            is_boot,
            is_explicit_boot,
            is_target_device,
            is_adding_partitions,
            is_reusing_partitions,
            volume_groups,
        }
    }

    pub fn name(&self) -> &'a str {
        &self.config.name
    }

    pub fn is_detached(&self) -> bool {
        self.device.is_none()
    }

    pub fn space_policy(&self) -> Option<SpacePolicy> {
        self.config.space_policy
    }

    pub fn filesystem(&self) -> Option<&'a Filesystem> {
        self.config.filesystem.as_ref()
    }

    pub fn has_filesystem(&self) -> bool {
        self.config.has_filesystem()
    }

    /// Partition configured for `mount_path`, if any
    pub fn get_partition(&self, mount_path: &str) -> Option<&Partition<'a>> {
        self.partitions
            .iter()
            .find(|p| p.mount_path() == Some(mount_path))
    }

    /// Mount paths of the whole device and its partitions, in declaration order
    pub fn get_mount_paths(&self) -> Vec<&'a str> {
        if self.is_detached() {
            return Vec::new();
        }

        self.config
            .mount_path
            .as_deref()
            .into_iter()
            .chain(self.partitions.iter().filter_map(|p| p.mount_path()))
            .collect()
    }

    pub fn get_volume_groups(&self) -> &[&'a config::VolumeGroup] {
        &self.volume_groups
    }

    /// Existing partitions the configuration says something about
    pub fn get_configured_existing_partitions(&self) -> Vec<&Partition<'a>> {
        if self.space_policy() == Some(SpacePolicy::Custom) {
            return self
                .partitions
                .iter()
                .filter(|p| !p.is_new && (p.is_used || p.is_used_by_space_policy))
                .collect();
        }

        self.partitions
            .iter()
            .filter(|p| p.is_reused_and_used())
            .collect()
    }

    /// Whether the probe found existing partitions on the device
    pub fn has_existing_partitions(&self) -> bool {
        self.device.is_some_and(|d| !d.partitions.is_empty())
    }
}

/// `(is_boot, is_default)` for a device
fn boot_flags(drive: &config::Drive, model: &ConfigModel) -> (bool, bool) {
    let Some(boot) = model.boot.as_ref().filter(|b| b.configure) else {
        return (false, false);
    };
    let Some(device) = boot.device.as_ref() else {
        return (false, false);
    };

    let is_boot = match device.name.as_deref() {
        Some(name) => name == drive.name,
        None => device.default && hosts_root(drive, model),
    };
    (is_boot, device.default)
}

/// Whether "/" lives on the device, directly or through a volume group it feeds
fn hosts_root(drive: &config::Drive, model: &ConfigModel) -> bool {
    let direct = drive.mount_path.as_deref() == Some("/") || drive.find_partition("/").is_some();

    direct
        || model
            .volume_groups
            .iter()
            .filter(|v| v.target_devices.iter().any(|t| *t == drive.name))
            .flat_map(|v| v.logical_volumes.iter())
            .any(|lv| lv.mount_path.as_deref() == Some("/"))
}
