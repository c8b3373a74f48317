//! Boot device dialog

use super::dialog::{Dialog, Selection};
use crate::model::Model;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootMode {
    Automatic,
    Manual,
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootChoice {
    Automatic,
    Device(String),
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootSelection {
    mode: BootMode,
    device: Option<String>,
    candidates: Vec<String>,
}

impl BootSelection {
    pub fn mode(&self) -> BootMode {
        self.mode
    }

    pub fn device(&self) -> Option<&str> {
        self.device.as_deref()
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Switching to manual preselects the first candidate
    pub fn set_mode(&mut self, mode: BootMode) {
        self.mode = mode;
        if mode == BootMode::Manual && self.device.is_none() {
            self.device = self.candidates.first().cloned();
        }
    }

    pub fn set_device(&mut self, name: &str) -> bool {
        if !self.candidates.iter().any(|c| c == name) {
            return false;
        }
        self.mode = BootMode::Manual;
        self.device = Some(name.to_string());
        true
    }
}

impl Selection for BootSelection {
    type Output = BootChoice;

    fn resolve(&self) -> Option<BootChoice> {
        match self.mode {
            BootMode::Automatic => Some(BootChoice::Automatic),
            BootMode::Disabled => Some(BootChoice::Disabled),
            BootMode::Manual => self
                .device
                .as_ref()
                .filter(|d| self.candidates.contains(d))
                .map(|d| BootChoice::Device(d.clone())),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BootDialog {
    dialog: Dialog<BootSelection>,
}

impl BootDialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dialog(&self) -> &Dialog<BootSelection> {
        &self.dialog
    }

    /// Open on the current boot settings, offering every available device
    pub fn open(&mut self, model: &Model<'_>) {
        let mode = if !model.boot.configure {
            BootMode::Disabled
        } else if model.boot.is_default {
            BootMode::Automatic
        } else {
            BootMode::Manual
        };
        let candidates = model
            .system
            .available_devices()
            .into_iter()
            .map(|d| d.name.clone())
            .collect();

        self.dialog.open(BootSelection {
            mode,
            device: model.boot.device_name.map(str::to_string),
            candidates,
        });
    }

    pub fn selection_mut(&mut self) -> Option<&mut BootSelection> {
        self.dialog.selection_mut()
    }

    pub fn cancel(&mut self) {
        self.dialog.cancel();
    }

    pub fn confirm(&mut self) -> Option<BootChoice> {
        self.dialog.confirm()
    }
}
