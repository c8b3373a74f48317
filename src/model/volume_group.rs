//! Facade over LVM volume group entries

use crate::api::config::{self, ConfigModel, LogicalVolume};

#[derive(Debug, Clone)]
pub struct VolumeGroup<'a> {
    pub list_index: usize,
    pub config: &'a config::VolumeGroup,
    targets: Vec<&'a config::Drive>,
}

impl<'a> VolumeGroup<'a> {
    pub(crate) fn build(list_index: usize, config: &'a config::VolumeGroup, model: &'a ConfigModel) -> Self {
        let targets = config
            .target_devices
            .iter()
            .filter_map(|name| model.find_partitionable(name).map(|(_, d)| d))
            .collect();

        Self {
            list_index,
            config,
            targets,
        }
    }

    pub fn vg_name(&self) -> &'a str {
        &self.config.vg_name
    }

    pub fn logical_volumes(&self) -> &'a [LogicalVolume] {
        &self.config.logical_volumes
    }

    pub fn get_mount_paths(&self) -> Vec<&'a str> {
        self.config
            .logical_volumes
            .iter()
            .filter_map(|lv| lv.mount_path.as_deref())
            .collect()
    }

    /// Configured drives and RAIDs providing physical volumes.
    /// Names missing from the document are skipped.
    pub fn get_target_devices(&self) -> &[&'a config::Drive] {
        &self.targets
    }

    pub fn target_names(&self) -> Vec<&'a str> {
        self.targets.iter().map(|d| d.name.as_str()).collect()
    }
}
