//! Pure edits of the configuration document
//!
//! Every edit borrows the current document and returns a rewritten copy.
//! `None` means the addressed device, partition or volume group is not in the
//! document (usually a stale reference after a reprobe). Callers treat that
//! as "nothing happened".

pub mod boot;
pub mod device;
pub mod partition;
pub mod volume_group;

pub use boot::{disable_boot, disable_encryption, set_boot_device, set_default_boot_device, set_encryption};
pub use device::{
    add_drive, add_md_raid, delete_filesystem, remove_drive, remove_md_raid, set_filesystem,
    switch_device,
};
pub use partition::{add_partition, delete_partition, edit_partition, set_space_policy};
pub use volume_group::{
    add_logical_volume, add_volume_group, convert_to_volume_group, delete_logical_volume,
    delete_volume_group, edit_logical_volume, edit_volume_group,
};

use crate::api::config::{ConfigModel, Drive};

/// Drive or MD RAID entry called `name`, in whichever collection holds it
pub(crate) fn find_partitionable_mut<'c>(config: &'c mut ConfigModel, name: &str) -> Option<&'c mut Drive> {
    let (list, _) = config.find_partitionable(name)?;
    config.find_device_mut(list, name)
}

/// Whether the entry still contributes something besides being listed
pub(crate) fn is_used_device(drive: &Drive) -> bool {
    drive.has_filesystem()
        || drive.mount_path.is_some()
        || drive.partitions.iter().any(|p| p.is_new() || p.is_used())
}
