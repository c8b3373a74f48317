//! Backend stored in a directory of JSON files
//!
//! | File                  | Content                          | Required |
//! |-----------------------|----------------------------------|----------|
//! | `system.json`         | probed [`System`]                | yes      |
//! | `config.json`         | current [`ConfigModel`]          | no       |
//! | `default-config.json` | document restored by a reset     | no       |
//! | `issues.json`         | list of [`Issue`]                | no       |
//! | `capabilities.json`   | [`Capabilities`]                 | no       |
//! | `jobs.json`           | list of [`FormatJob`]            | no       |
//! | `activations.json`    | devices activated so far         | written  |

use super::{BackendEvent, StorageBackend, Subscribers};
use crate::api::config::ConfigModel;
use crate::api::system::{Capabilities, FormatJob, Issue, System};
use crate::utils::error::{Result, StorageError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;
use tracing::{debug, info};

const SYSTEM_FILE: &str = "system.json";
const CONFIG_FILE: &str = "config.json";
const DEFAULT_CONFIG_FILE: &str = "default-config.json";
const ISSUES_FILE: &str = "issues.json";
const CAPABILITIES_FILE: &str = "capabilities.json";
const JOBS_FILE: &str = "jobs.json";
const ACTIVATIONS_FILE: &str = "activations.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Activation {
    Dasd { channel: String },
    Zfcp { channel: String, wwpn: String, lun: String },
    Iscsi { target: String },
}

#[derive(Debug)]
pub struct FileBackend {
    dir: PathBuf,
    subscribers: Subscribers,
}

impl FileBackend {
    /// Open the backend rooted at `dir`, which must contain `system.json`
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.join(SYSTEM_FILE).is_file() {
            return Err(StorageError::Backend(format!(
                "{} not found in {}",
                SYSTEM_FILE,
                dir.display()
            )));
        }
        info!("Using storage backend at {}", dir.display());
        Ok(Self {
            dir,
            subscribers: Subscribers::default(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Read `file`, falling back to the default value when it does not exist
    fn read_or_default<T: DeserializeOwned + Default>(&self, file: &str) -> Result<T> {
        let path = self.dir.join(file);
        if !path.exists() {
            debug!("{} not present, using defaults", path.display());
            return Ok(T::default());
        }
        self.read(file)
    }

    fn read<T: DeserializeOwned>(&self, file: &str) -> Result<T> {
        let path = self.dir.join(file);
        let content = std::fs::read_to_string(&path)?;
        serde_json::from_str(&content)
            .map_err(|e| StorageError::Backend(format!("{}: {}", path.display(), e)))
    }

    fn write<T: Serialize>(&self, file: &str, value: &T) -> Result<()> {
        let path = self.dir.join(file);
        let content = serde_json::to_string_pretty(value)?;
        std::fs::write(&path, content)?;
        debug!("Wrote {}", path.display());
        Ok(())
    }

    pub fn activations(&self) -> Result<Vec<Activation>> {
        self.read_or_default(ACTIVATIONS_FILE)
    }

    fn activate(&self, activation: Activation, supported: bool) -> Result<()> {
        if !supported {
            let (device, kind) = match &activation {
                Activation::Dasd { channel } => (channel.clone(), "DASD"),
                Activation::Zfcp { channel, .. } => (channel.clone(), "zFCP"),
                Activation::Iscsi { target } => (target.clone(), "iSCSI"),
            };
            return Err(StorageError::ActivationFailed {
                device,
                reason: format!("{} is not supported by this system", kind),
            });
        }

        info!("Activating {:?}", activation);
        let mut activations = self.activations()?;
        activations.push(activation);
        self.write(ACTIVATIONS_FILE, &activations)?;
        self.subscribers.notify(BackendEvent::DevicesChanged);
        Ok(())
    }
}

impl StorageBackend for FileBackend {
    fn fetch_config(&self) -> Result<ConfigModel> {
        self.read_or_default(CONFIG_FILE)
    }

    fn fetch_system(&self) -> Result<System> {
        self.read(SYSTEM_FILE)
    }

    fn fetch_issues(&self) -> Result<Vec<Issue>> {
        self.read_or_default(ISSUES_FILE)
    }

    fn fetch_capabilities(&self) -> Result<Capabilities> {
        self.read_or_default(CAPABILITIES_FILE)
    }

    fn fetch_format_jobs(&self) -> Result<Vec<FormatJob>> {
        self.read_or_default(JOBS_FILE)
    }

    fn submit_config(&self, config: &ConfigModel) -> Result<()> {
        info!("Submitting storage configuration");
        self.write(CONFIG_FILE, config)?;
        self.subscribers.notify(BackendEvent::ConfigChanged);
        Ok(())
    }

    fn reset_config(&self) -> Result<()> {
        let config: ConfigModel = self.read_or_default(DEFAULT_CONFIG_FILE)?;
        info!("Resetting storage configuration");
        self.write(CONFIG_FILE, &config)?;
        self.subscribers.notify(BackendEvent::ConfigChanged);
        Ok(())
    }

    fn rescan(&self) -> Result<()> {
        // Validate the snapshot before telling anyone to reload it
        self.fetch_system()?;
        self.subscribers.notify(BackendEvent::DevicesChanged);
        Ok(())
    }

    fn activate_dasd(&self, channel: &str) -> Result<()> {
        let supported = self.fetch_capabilities()?.dasd;
        self.activate(
            Activation::Dasd {
                channel: channel.to_string(),
            },
            supported,
        )
    }

    fn activate_zfcp(&self, channel: &str, wwpn: &str, lun: &str) -> Result<()> {
        let supported = self.fetch_capabilities()?.zfcp;
        self.activate(
            Activation::Zfcp {
                channel: channel.to_string(),
                wwpn: wwpn.to_string(),
                lun: lun.to_string(),
            },
            supported,
        )
    }

    fn login_iscsi(&self, target: &str) -> Result<()> {
        self.activate(
            Activation::Iscsi {
                target: target.to_string(),
            },
            true,
        )
    }

    fn subscribe(&self) -> Receiver<BackendEvent> {
        self.subscribers.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::config::Drive;
    use tempfile::TempDir;

    fn backend_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(SYSTEM_FILE),
            serde_json::to_string(&System::sample()).unwrap(),
        )
        .unwrap();
        dir
    }

    #[test]
    fn requires_system_snapshot() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(FileBackend::open(dir.path()), Err(StorageError::Backend(_))));
    }

    #[test]
    fn missing_optional_files_use_defaults() {
        let dir = backend_dir();
        let backend = FileBackend::open(dir.path()).unwrap();

        assert_eq!(backend.fetch_system().unwrap(), System::sample());
        assert_eq!(backend.fetch_config().unwrap(), ConfigModel::default());
        assert!(backend.fetch_issues().unwrap().is_empty());
        assert!(backend.fetch_format_jobs().unwrap().is_empty());
        assert_eq!(backend.fetch_capabilities().unwrap(), Capabilities::default());
    }

    #[test]
    fn submit_then_reset() {
        let dir = backend_dir();
        let backend = FileBackend::open(dir.path()).unwrap();
        let events = backend.subscribe();

        let config = ConfigModel {
            drives: vec![Drive::new("/dev/vda")],
            ..Default::default()
        };
        backend.submit_config(&config).unwrap();
        assert_eq!(backend.fetch_config().unwrap(), config);
        assert_eq!(events.try_recv().unwrap(), BackendEvent::ConfigChanged);

        backend.reset_config().unwrap();
        assert_eq!(backend.fetch_config().unwrap(), ConfigModel::default());
    }

    #[test]
    fn malformed_file_names_the_path() {
        let dir = backend_dir();
        std::fs::write(dir.path().join(ISSUES_FILE), "{ not json").unwrap();
        let backend = FileBackend::open(dir.path()).unwrap();

        let err = backend.fetch_issues().unwrap_err();
        assert!(err.to_string().contains(ISSUES_FILE));
    }

    #[test]
    fn activations_are_recorded() {
        let dir = backend_dir();
        std::fs::write(dir.path().join(CAPABILITIES_FILE), r#"{ "dasd": true }"#).unwrap();
        let backend = FileBackend::open(dir.path()).unwrap();
        let events = backend.subscribe();

        backend.activate_dasd("0.0.0150").unwrap();
        backend.login_iscsi("iqn.2024-01.com.example:disk1").unwrap();
        assert!(backend.activate_zfcp("0.0.fa00", "0x1", "0x0").is_err());

        assert_eq!(
            backend.activations().unwrap(),
            vec![
                Activation::Dasd {
                    channel: "0.0.0150".to_string()
                },
                Activation::Iscsi {
                    target: "iqn.2024-01.com.example:disk1".to_string()
                },
            ]
        );
        assert_eq!(events.try_iter().count(), 2);
    }
}
