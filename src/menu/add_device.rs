//! "Configure a device" drilldown menu

use super::device_selector::{collection_for, DeviceSelection};
use super::dialog::Dialog;
use crate::api::config::Collection;
use crate::api::system::Capabilities;
use crate::model::Model;
use crate::routes;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddDeviceItem {
    UseDisk,
    AddVolumeGroup,
    ConnectIscsi,
    ActivateZfcp,
    ManageDasd,
}

impl AddDeviceItem {
    pub fn label(&self) -> &'static str {
        match self {
            Self::UseDisk => "Use additional disk",
            Self::AddVolumeGroup => "Add LVM volume group",
            Self::ConnectIscsi => "Connect to iSCSI targets",
            Self::ActivateZfcp => "Activate zFCP disks",
            Self::ManageDasd => "Manage DASD devices",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::UseDisk => "Extends the installation using a disk",
            Self::AddVolumeGroup => "Extend the installation using LVM",
            Self::ConnectIscsi => "Make disks exported over the network available",
            Self::ActivateZfcp => "Make zFCP disks available for installing",
            Self::ManageDasd => "Activate and format DASD devices",
        }
    }

    fn route(&self) -> Option<&'static str> {
        match self {
            Self::UseDisk => None,
            Self::AddVolumeGroup => Some(routes::ADD_VOLUME_GROUP),
            Self::ConnectIscsi => Some(routes::ISCSI),
            Self::ActivateZfcp => Some(routes::ZFCP),
            Self::ManageDasd => Some(routes::DASD),
        }
    }
}

/// What choosing an entry asks the caller to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddDeviceAction {
    AddDevice { name: String, list: Collection },
    Navigate(&'static str),
}

#[derive(Debug, Clone)]
pub struct AddDeviceMenu {
    items: Vec<AddDeviceItem>,
    unused: Vec<(String, Collection)>,
    drilldown: Dialog<DeviceSelection>,
}

impl AddDeviceMenu {
    /// Entries for the current model. Technology entries depend on what
    /// the system supports.
    pub fn build(model: &Model<'_>, capabilities: Capabilities) -> Self {
        let unused: Vec<(String, Collection)> = model
            .unused_devices()
            .into_iter()
            .map(|d| (d.name.clone(), collection_for(d)))
            .collect();

        let mut items = Vec::new();
        if !unused.is_empty() {
            items.push(AddDeviceItem::UseDisk);
        }
        items.push(AddDeviceItem::AddVolumeGroup);
        items.push(AddDeviceItem::ConnectIscsi);
        if capabilities.zfcp {
            items.push(AddDeviceItem::ActivateZfcp);
        }
        if capabilities.dasd {
            items.push(AddDeviceItem::ManageDasd);
        }

        Self {
            items,
            unused,
            drilldown: Dialog::new(),
        }
    }

    pub fn items(&self) -> &[AddDeviceItem] {
        &self.items
    }

    pub fn is_visible(&self, item: AddDeviceItem) -> bool {
        self.items.contains(&item)
    }

    /// Disks offered by the "use additional disk" drilldown
    pub fn unused_devices(&self) -> impl Iterator<Item = &str> {
        self.unused.iter().map(|(name, _)| name.as_str())
    }

    pub fn drilldown(&self) -> &Dialog<DeviceSelection> {
        &self.drilldown
    }

    /// Choose a top level entry. The disk entry drills in instead of
    /// returning an action.
    pub fn activate(&mut self, item: AddDeviceItem) -> Option<AddDeviceAction> {
        if !self.is_visible(item) {
            return None;
        }

        match item.route() {
            Some(route) => Some(AddDeviceAction::Navigate(route)),
            None => {
                let candidates = self.unused.iter().map(|(name, _)| name.clone()).collect();
                self.drilldown.open(DeviceSelection::single(candidates, None));
                None
            }
        }
    }

    pub fn select(&mut self, name: &str) -> bool {
        self.drilldown
            .selection_mut()
            .is_some_and(|selection| selection.select(name))
    }

    /// Leave the drilldown without adding anything
    pub fn back(&mut self) {
        self.drilldown.cancel();
    }

    pub fn confirm(&mut self) -> Option<AddDeviceAction> {
        let name = self.drilldown.confirm()?.into_iter().next()?;
        let list = self
            .unused
            .iter()
            .find(|(n, _)| *n == name)
            .map_or(Collection::Drives, |(_, list)| *list);
        Some(AddDeviceAction::AddDevice { name, list })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::config::{ConfigModel, Drive};
    use crate::api::system::System;

    #[test]
    fn technology_entries_follow_capabilities() {
        let system = System::sample();
        let config = ConfigModel::default();
        let model = Model::build(&config, &system);

        let menu = AddDeviceMenu::build(&model, Capabilities::default());
        assert_eq!(
            menu.items(),
            &[
                AddDeviceItem::UseDisk,
                AddDeviceItem::AddVolumeGroup,
                AddDeviceItem::ConnectIscsi
            ]
        );

        let menu = AddDeviceMenu::build(&model, Capabilities { zfcp: false, dasd: true });
        assert!(menu.is_visible(AddDeviceItem::ManageDasd));
        assert!(!menu.is_visible(AddDeviceItem::ActivateZfcp));
    }

    #[test]
    fn drilldown_adds_the_chosen_disk() {
        let system = System::sample();
        let config = ConfigModel {
            drives: vec![Drive::new("/dev/vda")],
            ..Default::default()
        };
        let model = Model::build(&config, &system);
        let mut menu = AddDeviceMenu::build(&model, Capabilities::default());

        assert_eq!(menu.unused_devices().collect::<Vec<_>>(), vec!["/dev/vdb", "/dev/md0"]);
        assert_eq!(menu.activate(AddDeviceItem::UseDisk), None);
        assert!(!menu.drilldown().can_confirm());
        assert!(menu.select("/dev/md0"));
        assert_eq!(
            menu.confirm(),
            Some(AddDeviceAction::AddDevice {
                name: "/dev/md0".to_string(),
                list: Collection::MdRaids,
            })
        );
    }

    #[test]
    fn disk_entry_hidden_when_everything_is_used() {
        let system = System::sample();
        let config = ConfigModel {
            drives: vec![Drive::new("/dev/vda"), Drive::new("/dev/vdb")],
            md_raids: vec![Drive::new("/dev/md0")],
            ..Default::default()
        };
        let model = Model::build(&config, &system);
        let mut menu = AddDeviceMenu::build(&model, Capabilities::default());

        assert!(!menu.is_visible(AddDeviceItem::UseDisk));
        assert_eq!(menu.activate(AddDeviceItem::UseDisk), None);
        assert_eq!(
            menu.activate(AddDeviceItem::AddVolumeGroup),
            Some(AddDeviceAction::Navigate(routes::ADD_VOLUME_GROUP))
        );
    }
}
