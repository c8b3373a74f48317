//! Edit orchestration
//!
//! A hook reads the current document from the backend, applies one pure edit
//! from [`crate::edit`] and submits the result whole. Stale references and
//! edits that change nothing are skipped without talking to the backend again.

use crate::api::config::{
    Collection, ConfigModel, EncryptionMethod, Filesystem, LogicalVolume, Partition, SpacePolicy,
    SpacePolicyAction, VolumeGroup,
};
use crate::backend::StorageBackend;
use crate::edit;
use crate::utils::error::Result;
use tracing::{debug, info};

/// What a hook did with the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A new document was submitted
    Applied,
    /// The target was not found or the edit changed nothing
    Skipped,
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

pub struct Hooks<'a, B: StorageBackend> {
    backend: &'a B,
}

impl<'a, B: StorageBackend> Hooks<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    /// Apply `edit` to the current document and submit the result
    pub fn apply<F>(&self, action: &str, edit: F) -> Result<Outcome>
    where
        F: FnOnce(&ConfigModel) -> Option<ConfigModel>,
    {
        let current = self.backend.fetch_config()?;
        match edit(&current) {
            Some(updated) if updated != current => {
                info!("{}", action);
                self.backend.submit_config(&updated)?;
                Ok(Outcome::Applied)
            }
            Some(_) => {
                debug!("{}: nothing changed", action);
                Ok(Outcome::Skipped)
            }
            None => {
                debug!("{}: target not found, skipping", action);
                Ok(Outcome::Skipped)
            }
        }
    }

    pub fn add_drive(&self, name: &str) -> Result<Outcome> {
        self.apply(&format!("Adding drive {}", name), |c| edit::add_drive(c, name))
    }

    pub fn remove_drive(&self, name: &str) -> Result<Outcome> {
        self.apply(&format!("Removing drive {}", name), |c| edit::remove_drive(c, name))
    }

    pub fn add_md_raid(&self, name: &str) -> Result<Outcome> {
        self.apply(&format!("Adding RAID {}", name), |c| edit::add_md_raid(c, name))
    }

    pub fn remove_md_raid(&self, name: &str) -> Result<Outcome> {
        self.apply(&format!("Removing RAID {}", name), |c| edit::remove_md_raid(c, name))
    }

    pub fn switch_device(&self, name: &str, new_name: &str, target: Collection) -> Result<Outcome> {
        self.apply(&format!("Switching {} to {}", name, new_name), |c| {
            edit::switch_device(c, name, new_name, target)
        })
    }

    pub fn set_filesystem(&self, name: &str, filesystem: Filesystem, mount_path: Option<&str>) -> Result<Outcome> {
        self.apply(&format!("Formatting {}", name), |c| {
            edit::set_filesystem(c, name, filesystem, mount_path)
        })
    }

    pub fn delete_filesystem(&self, name: &str) -> Result<Outcome> {
        self.apply(&format!("Removing filesystem of {}", name), |c| {
            edit::delete_filesystem(c, name)
        })
    }

    pub fn add_partition(&self, device: &str, partition: Partition) -> Result<Outcome> {
        self.apply(&format!("Adding partition to {}", device), |c| {
            edit::add_partition(c, device, partition)
        })
    }

    pub fn edit_partition(&self, device: &str, mount_path: &str, partition: Partition) -> Result<Outcome> {
        self.apply(&format!("Editing {} on {}", mount_path, device), |c| {
            edit::edit_partition(c, device, mount_path, partition)
        })
    }

    pub fn delete_partition(&self, device: &str, mount_path: &str) -> Result<Outcome> {
        self.apply(&format!("Deleting {} from {}", mount_path, device), |c| {
            edit::delete_partition(c, device, mount_path)
        })
    }

    /// Needs the system snapshot to drop actions for foreign devices
    pub fn set_space_policy(
        &self,
        device: &str,
        policy: SpacePolicy,
        actions: &[SpacePolicyAction],
    ) -> Result<Outcome> {
        let system = self.backend.fetch_system()?;
        self.apply(&format!("Setting space policy of {} to {}", device, policy), |c| {
            edit::set_space_policy(c, device, policy, actions, &system)
        })
    }

    pub fn set_encryption(&self, method: EncryptionMethod, password: &str) -> Result<Outcome> {
        self.apply(&format!("Enabling {} encryption", method), |c| {
            edit::set_encryption(c, method, password)
        })
    }

    pub fn disable_encryption(&self) -> Result<Outcome> {
        self.apply("Disabling encryption", edit::disable_encryption)
    }

    pub fn set_boot_device(&self, name: &str) -> Result<Outcome> {
        self.apply(&format!("Booting from {}", name), |c| edit::set_boot_device(c, name))
    }

    pub fn set_default_boot_device(&self) -> Result<Outcome> {
        self.apply("Booting from the installation disk", edit::set_default_boot_device)
    }

    pub fn disable_boot(&self) -> Result<Outcome> {
        self.apply("Disabling boot configuration", edit::disable_boot)
    }

    pub fn add_volume_group(&self, volume_group: VolumeGroup, move_mount_points: bool) -> Result<Outcome> {
        self.apply(&format!("Adding volume group {}", volume_group.vg_name), |c| {
            edit::add_volume_group(c, volume_group, move_mount_points)
        })
    }

    pub fn convert_to_volume_group(&self, vg_name: &str, targets: &[&str]) -> Result<Outcome> {
        self.apply(&format!("Converting {} to volume group {}", targets.join(", "), vg_name), |c| {
            edit::convert_to_volume_group(c, vg_name, targets)
        })
    }

    pub fn edit_volume_group(&self, vg_name: &str, data: VolumeGroup) -> Result<Outcome> {
        self.apply(&format!("Editing volume group {}", vg_name), |c| {
            edit::edit_volume_group(c, vg_name, data)
        })
    }

    pub fn delete_volume_group(&self, vg_name: &str) -> Result<Outcome> {
        self.apply(&format!("Deleting volume group {}", vg_name), |c| {
            edit::delete_volume_group(c, vg_name)
        })
    }

    pub fn add_logical_volume(&self, vg_name: &str, volume: LogicalVolume) -> Result<Outcome> {
        self.apply(&format!("Adding logical volume to {}", vg_name), |c| {
            edit::add_logical_volume(c, vg_name, volume)
        })
    }

    pub fn edit_logical_volume(&self, vg_name: &str, mount_path: &str, volume: LogicalVolume) -> Result<Outcome> {
        self.apply(&format!("Editing {} in {}", mount_path, vg_name), |c| {
            edit::edit_logical_volume(c, vg_name, mount_path, volume)
        })
    }

    pub fn delete_logical_volume(&self, vg_name: &str, mount_path: &str) -> Result<Outcome> {
        self.apply(&format!("Deleting {} from {}", mount_path, vg_name), |c| {
            edit::delete_logical_volume(c, vg_name, mount_path)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::config::{Drive, SpaceActionValue};
    use crate::api::system::System;
    use crate::backend::MemoryBackend;

    fn backend_with(drives: Vec<Drive>) -> MemoryBackend {
        MemoryBackend::new(System::sample()).with_config(ConfigModel {
            drives,
            ..Default::default()
        })
    }

    #[test]
    fn submits_whole_document_once() {
        let backend = backend_with(Vec::new());
        let hooks = Hooks::new(&backend);

        assert_eq!(hooks.add_drive("/dev/vda").unwrap(), Outcome::Applied);
        let submissions = backend.submissions();
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].drives, vec![Drive::new("/dev/vda")]);
    }

    #[test]
    fn stale_target_is_skipped_without_submitting() {
        let backend = backend_with(Vec::new());
        let hooks = Hooks::new(&backend);

        assert_eq!(hooks.delete_filesystem("/dev/vda").unwrap(), Outcome::Skipped);
        assert_eq!(hooks.delete_volume_group("system").unwrap(), Outcome::Skipped);
        assert!(backend.submissions().is_empty());
    }

    #[test]
    fn unchanged_document_is_not_submitted() {
        let backend = backend_with(vec![Drive::new("/dev/vda")]);
        let hooks = Hooks::new(&backend);

        assert_eq!(
            hooks.set_space_policy("/dev/vda", SpacePolicy::Delete, &[]).unwrap(),
            Outcome::Skipped
        );
        assert!(backend.submissions().is_empty());
    }

    #[test]
    fn space_policy_uses_the_probed_partitions() {
        let backend = backend_with(vec![Drive::new("/dev/vda")]);
        let hooks = Hooks::new(&backend);

        let actions = [
            SpacePolicyAction {
                device_name: "/dev/vda3".to_string(),
                value: SpaceActionValue::Delete,
            },
            SpacePolicyAction {
                device_name: "/dev/vdb".to_string(),
                value: SpaceActionValue::Delete,
            },
        ];
        hooks
            .set_space_policy("/dev/vda", SpacePolicy::Custom, &actions)
            .unwrap();

        let config = backend.fetch_config().unwrap();
        assert_eq!(config.drives[0].actions(), vec![actions[0].clone()]);
    }

    #[test]
    fn backend_failure_is_returned() {
        let backend = backend_with(Vec::new());
        backend.fail_next("connection refused");
        assert!(Hooks::new(&backend).add_drive("/dev/vda").is_err());
    }
}
