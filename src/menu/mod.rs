//! Menus and dialogs as explicit state machines
//!
//! Each menu starts closed, holds its in-progress selection while open and
//! either discards it (cancel) or emits it once (confirm). Emitted values are
//! turned into edits by the caller through [`crate::hooks::Hooks`].

pub mod add_device;
pub mod boot;
pub mod device_selector;
pub mod dialog;
pub mod encryption;
pub mod space_policy;

pub use add_device::{AddDeviceAction, AddDeviceItem, AddDeviceMenu};
pub use boot::{BootChoice, BootDialog, BootMode, BootSelection};
pub use device_selector::{DeviceSelection, DeviceSelector, SwitchTarget};
pub use dialog::{Choice, Dialog, Selection};
pub use encryption::{EncryptionChoice, EncryptionDialog, EncryptionSettings};
pub use space_policy::{SpacePolicyChoice, SpacePolicyMenu};

/// Menus of the storage page currently built. Dropped on every reload.
#[derive(Debug, Clone, Default)]
pub struct Menus {
    pub device_selector: Option<DeviceSelector>,
    pub add_device: Option<AddDeviceMenu>,
    pub space_policy: Option<SpacePolicyMenu>,
    pub encryption: Option<EncryptionDialog>,
    pub boot: Option<BootDialog>,
}

impl Menus {
    pub fn any_open(&self) -> bool {
        self.device_selector.as_ref().is_some_and(|m| m.dialog().is_open())
            || self.add_device.as_ref().is_some_and(|m| m.drilldown().is_open())
            || self.space_policy.as_ref().is_some_and(|m| m.is_open())
            || self.encryption.as_ref().is_some_and(|m| m.dialog().is_open())
            || self.boot.as_ref().is_some_and(|m| m.dialog().is_open())
    }
}
