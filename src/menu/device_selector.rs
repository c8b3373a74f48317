//! Choosing devices: the switch target of a drive and volume group targets

use super::dialog::{Dialog, Selection};
use crate::api::config::Collection;
use crate::api::system::Device;
use crate::model::{Model, Partitionable};

/// Collection a probed device goes into when it gets configured
pub fn collection_for(device: &Device) -> Collection {
    if device.is_md_raid() {
        Collection::MdRaids
    } else {
        Collection::Drives
    }
}

/// Devices picked among a fixed list of candidates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSelection {
    candidates: Vec<String>,
    chosen: Vec<String>,
    multiple: bool,
}

impl DeviceSelection {
    /// Exactly one device, starting from `current` when it is a candidate
    pub fn single(candidates: Vec<String>, current: Option<&str>) -> Self {
        let chosen = current
            .filter(|c| candidates.iter().any(|d| d == c))
            .map(|c| vec![c.to_string()])
            .unwrap_or_default();
        Self {
            candidates,
            chosen,
            multiple: false,
        }
    }

    /// One or more devices
    pub fn multiple(candidates: Vec<String>, current: &[String]) -> Self {
        let chosen = current
            .iter()
            .filter(|c| candidates.contains(c))
            .cloned()
            .collect();
        Self {
            candidates,
            chosen,
            multiple: true,
        }
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn chosen(&self) -> &[String] {
        &self.chosen
    }

    pub fn is_chosen(&self, name: &str) -> bool {
        self.chosen.iter().any(|c| c == name)
    }

    /// Pick `name`. Single selections replace the previous pick, multiple
    /// ones toggle it. Returns `false` for unknown devices.
    pub fn select(&mut self, name: &str) -> bool {
        if !self.candidates.iter().any(|c| c == name) {
            return false;
        }

        if !self.multiple {
            self.chosen = vec![name.to_string()];
        } else if self.is_chosen(name) {
            self.chosen.retain(|c| c != name);
        } else {
            self.chosen.push(name.to_string());
        }
        true
    }
}

impl Selection for DeviceSelection {
    type Output = Vec<String>;

    fn resolve(&self) -> Option<Vec<String>> {
        (!self.chosen.is_empty()).then(|| self.chosen.clone())
    }
}

/// Where the partitions of a device should go instead
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchTarget {
    pub from: String,
    pub to: String,
    pub collection: Collection,
}

/// Single device choice replacing a configured drive or RAID
#[derive(Debug, Clone)]
pub struct DeviceSelector {
    device: String,
    targets: Vec<(String, Collection)>,
    dialog: Dialog<DeviceSelection>,
}

impl DeviceSelector {
    pub fn new(model: &Model<'_>, device: &Partitionable<'_>) -> Self {
        let targets = model
            .system
            .available_devices()
            .into_iter()
            .map(|d| (d.name.clone(), collection_for(d)))
            .collect();
        Self {
            device: device.name().to_string(),
            targets,
            dialog: Dialog::new(),
        }
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    pub fn dialog(&self) -> &Dialog<DeviceSelection> {
        &self.dialog
    }

    pub fn open(&mut self) {
        let candidates = self.targets.iter().map(|(name, _)| name.clone()).collect();
        self.dialog
            .open(DeviceSelection::single(candidates, Some(&self.device)));
    }

    pub fn select(&mut self, name: &str) -> bool {
        self.dialog
            .selection_mut()
            .is_some_and(|selection| selection.select(name))
    }

    pub fn cancel(&mut self) {
        self.dialog.cancel();
    }

    pub fn confirm(&mut self) -> Option<SwitchTarget> {
        let to = self.dialog.confirm()?.into_iter().next()?;
        let collection = self
            .targets
            .iter()
            .find(|(name, _)| *name == to)
            .map_or(Collection::Drives, |(_, c)| *c);
        Some(SwitchTarget {
            from: self.device.clone(),
            to,
            collection,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::config::{ConfigModel, Drive};
    use crate::api::system::System;

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn single_selection_replaces() {
        let mut selection = DeviceSelection::single(names(&["/dev/vda", "/dev/vdb"]), Some("/dev/vda"));
        assert!(selection.select("/dev/vdb"));
        assert!(!selection.select("/dev/sdz"));
        assert_eq!(selection.resolve(), Some(names(&["/dev/vdb"])));
    }

    #[test]
    fn multiple_selection_toggles_and_requires_one() {
        let mut selection = DeviceSelection::multiple(names(&["/dev/vda", "/dev/vdb"]), &names(&["/dev/vda"]));
        selection.select("/dev/vdb");
        assert_eq!(selection.chosen(), names(&["/dev/vda", "/dev/vdb"]).as_slice());
        selection.select("/dev/vda");
        selection.select("/dev/vdb");
        assert_eq!(selection.resolve(), None);
    }

    #[test]
    fn switch_target_carries_the_collection() {
        let system = System::sample();
        let config = ConfigModel {
            drives: vec![Drive::new("/dev/vda")],
            ..Default::default()
        };
        let model = Model::build(&config, &system);
        let mut selector = DeviceSelector::new(&model, &model.drives[0]);

        assert!(!selector.select("/dev/md0"), "closed selector ignores picks");
        selector.open();
        assert!(selector.dialog().can_confirm(), "starts on the current device");
        assert!(selector.select("/dev/md0"));
        assert_eq!(
            selector.confirm(),
            Some(SwitchTarget {
                from: "/dev/vda".to_string(),
                to: "/dev/md0".to_string(),
                collection: Collection::MdRaids,
            })
        );
        assert!(!selector.dialog().is_open());
    }
}
