//! Encryption settings dialog

use super::dialog::{Dialog, Selection};
use crate::api::config::{ConfigModel, EncryptionMethod};
use crate::api::system::System;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncryptionChoice {
    Disabled,
    Enabled {
        method: EncryptionMethod,
        password: String,
    },
}

/// Form state of the dialog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncryptionSettings {
    pub enabled: bool,
    pub password: String,
    pub confirmation: String,
    pub use_tpm: bool,
    tpm_supported: bool,
}

impl EncryptionSettings {
    pub fn tpm_supported(&self) -> bool {
        self.tpm_supported
    }

    pub fn password_error(&self) -> Option<&'static str> {
        if !self.enabled {
            return None;
        }
        if self.password.is_empty() {
            return Some("Password is empty.");
        }
        if self.password != self.confirmation {
            return Some("Passwords do not match.");
        }
        None
    }

    fn method(&self) -> EncryptionMethod {
        if self.use_tpm && self.tpm_supported {
            EncryptionMethod::TpmFde
        } else {
            EncryptionMethod::Luks2
        }
    }
}

impl Selection for EncryptionSettings {
    type Output = EncryptionChoice;

    fn resolve(&self) -> Option<EncryptionChoice> {
        if !self.enabled {
            return Some(EncryptionChoice::Disabled);
        }
        if self.password_error().is_some() {
            return None;
        }
        Some(EncryptionChoice::Enabled {
            method: self.method(),
            password: self.password.clone(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct EncryptionDialog {
    tpm_supported: bool,
    dialog: Dialog<EncryptionSettings>,
}

impl EncryptionDialog {
    /// TPM is only offered when the product allows it
    pub fn new(system: &System) -> Self {
        Self {
            tpm_supported: system.supports_tpm(),
            dialog: Dialog::new(),
        }
    }

    pub fn dialog(&self) -> &Dialog<EncryptionSettings> {
        &self.dialog
    }

    /// Open with the settings currently in `config`
    pub fn open(&mut self, config: &ConfigModel) {
        let current = config.encryption.as_ref();
        let password = current
            .and_then(|e| e.password.clone())
            .unwrap_or_default();
        self.dialog.open(EncryptionSettings {
            enabled: current.is_some(),
            confirmation: password.clone(),
            password,
            use_tpm: current.is_some_and(|e| e.method == EncryptionMethod::TpmFde),
            tpm_supported: self.tpm_supported,
        });
    }

    pub fn settings_mut(&mut self) -> Option<&mut EncryptionSettings> {
        self.dialog.selection_mut()
    }

    pub fn cancel(&mut self) {
        self.dialog.cancel();
    }

    pub fn confirm(&mut self) -> Option<EncryptionChoice> {
        self.dialog.confirm()
    }
}
