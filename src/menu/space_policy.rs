//! Space policy selector of a drive or RAID

use super::dialog::{Choice, Dialog};
use crate::api::config::SpacePolicy;
use crate::describe::drive::{SpacePolicyEntry, SPACE_POLICIES};
use crate::model::Partitionable;
use crate::routes::{self, RouteParams};
use crate::utils::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpacePolicyChoice {
    /// Submit the policy right away
    Apply(SpacePolicy),
    /// Open the per-partition editor at this path
    Navigate(String),
}

#[derive(Debug, Clone)]
pub struct SpacePolicyMenu {
    device: String,
    params: RouteParams,
    current: Option<SpacePolicy>,
    dialog: Dialog<Choice<SpacePolicy>>,
}

impl SpacePolicyMenu {
    /// Menu for `device`, `None` when there is nothing on it to make room from
    pub fn build(device: &Partitionable<'_>) -> Option<Self> {
        if !device.has_existing_partitions() {
            return None;
        }

        Some(Self {
            device: device.name().to_string(),
            params: RouteParams::from(device),
            current: device.space_policy(),
            dialog: Dialog::new(),
        })
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    /// Every policy, flagging the one in use
    pub fn entries(&self) -> impl Iterator<Item = (&'static SpacePolicyEntry, bool)> + '_ {
        SPACE_POLICIES
            .iter()
            .map(move |entry| (entry, Some(entry.id) == self.current))
    }

    pub fn is_open(&self) -> bool {
        self.dialog.is_open()
    }

    pub fn open(&mut self) {
        self.dialog.open(Choice(self.current));
    }

    pub fn cancel(&mut self) {
        self.dialog.cancel();
    }

    /// Pick `policy` and close the menu
    pub fn choose(&mut self, policy: SpacePolicy) -> Result<Option<SpacePolicyChoice>> {
        let Some(choice) = self.dialog.selection_mut() else {
            return Ok(None);
        };
        choice.0 = Some(policy);

        match self.dialog.confirm() {
            Some(SpacePolicy::Custom) => Ok(Some(SpacePolicyChoice::Navigate(
                routes::generate_path(routes::SPACE_POLICY, &self.params)?,
            ))),
            Some(policy) => Ok(Some(SpacePolicyChoice::Apply(policy))),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::config::{ConfigModel, Drive};
    use crate::api::system::System;
    use crate::model::Model;

    #[test]
    fn hidden_without_existing_partitions() {
        let system = System::sample();
        let config = ConfigModel {
            drives: vec![Drive::new("/dev/vda"), Drive::new("/dev/vdb")],
            ..Default::default()
        };
        let model = Model::build(&config, &system);

        assert!(SpacePolicyMenu::build(&model.drives[0]).is_some());
        assert!(SpacePolicyMenu::build(&model.drives[1]).is_none());
    }

    #[test]
    fn custom_navigates_to_the_editor() {
        let system = System::sample();
        let config = ConfigModel {
            drives: vec![Drive::new("/dev/vda")],
            ..Default::default()
        };
        let model = Model::build(&config, &system);
        let mut menu = SpacePolicyMenu::build(&model.drives[0]).unwrap();

        let selected: Vec<SpacePolicy> = menu.entries().filter(|(_, s)| *s).map(|(e, _)| e.id).collect();
        assert_eq!(selected, vec![SpacePolicy::Delete]);

        assert_eq!(menu.choose(SpacePolicy::Keep).unwrap(), None, "closed menu");

        menu.open();
        assert_eq!(
            menu.choose(SpacePolicy::Custom).unwrap(),
            Some(SpacePolicyChoice::Navigate("/storage/drives/0/space-policy".to_string()))
        );
        assert!(!menu.is_open());

        menu.open();
        assert_eq!(
            menu.choose(SpacePolicy::Resize).unwrap(),
            Some(SpacePolicyChoice::Apply(SpacePolicy::Resize))
        );
    }
}
