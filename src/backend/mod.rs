//! Access to the installer service
//!
//! The service owns the configuration document and the device probe. This
//! crate only reads snapshots, submits whole documents and asks for a few
//! actions (rescans, activations). Change notifications arrive through
//! `std::sync::mpsc` channels handed out by [`StorageBackend::subscribe`].

pub mod file;
pub mod memory;

pub use file::FileBackend;
pub use memory::MemoryBackend;

use crate::api::config::ConfigModel;
use crate::api::system::{Capabilities, FormatJob, Issue, System};
use crate::utils::error::Result;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Mutex;

/// Notification pushed by the backend
#[derive(Debug, Clone, PartialEq)]
pub enum BackendEvent {
    /// The probe changed; the system snapshot must be fetched again
    DevicesChanged,
    /// Someone submitted or reset the document
    ConfigChanged,
    /// A format job made progress
    FormatProgress(FormatJob),
}

pub trait StorageBackend {
    fn fetch_config(&self) -> Result<ConfigModel>;

    fn fetch_system(&self) -> Result<System>;

    /// Reasons the current document cannot be realized
    fn fetch_issues(&self) -> Result<Vec<Issue>>;

    fn fetch_capabilities(&self) -> Result<Capabilities>;

    fn fetch_format_jobs(&self) -> Result<Vec<FormatJob>>;

    /// Replace the whole document
    fn submit_config(&self, config: &ConfigModel) -> Result<()>;

    /// Go back to the product's default document
    fn reset_config(&self) -> Result<()>;

    /// Probe the devices again
    fn rescan(&self) -> Result<()>;

    fn activate_dasd(&self, channel: &str) -> Result<()>;

    fn activate_zfcp(&self, channel: &str, wwpn: &str, lun: &str) -> Result<()>;

    fn login_iscsi(&self, target: &str) -> Result<()>;

    fn subscribe(&self) -> Receiver<BackendEvent>;
}

/// Fan-out of backend events to every live subscriber
#[derive(Debug, Default)]
pub struct Subscribers {
    senders: Mutex<Vec<Sender<BackendEvent>>>,
}

impl Subscribers {
    pub fn subscribe(&self) -> Receiver<BackendEvent> {
        let (tx, rx) = channel();
        self.senders
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(tx);
        rx
    }

    /// Send `event` to everyone, forgetting receivers that were dropped
    pub fn notify(&self, event: BackendEvent) {
        self.senders
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|tx| tx.send(event.clone()).is_ok());
    }
}
