//! Types exchanged with the storage backend

pub mod config;
pub mod system;

pub use config::{
    Boot, BootDevice, Collection, ConfigModel, Drive, Encryption, EncryptionMethod, Filesystem,
    FilesystemType, LogicalVolume, MdRaid, Partition, Size, SpaceActionValue, SpacePolicy,
    SpacePolicyAction, Violation, VolumeGroup,
};
pub use system::{Capabilities, Device, DeviceClass, FormatJob, Issue, System};
