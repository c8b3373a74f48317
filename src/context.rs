//! Explicit state shared by the storage pages
//!
//! [`StorageContext`] mirrors what the backend reports: the document, the
//! probed system, the issues and the format jobs. Each section loads and fails
//! on its own, so a broken issues request does not hide the devices.

use crate::api::config::ConfigModel;
use crate::api::system::{Capabilities, FormatJob, Issue, System};
use crate::backend::{BackendEvent, StorageBackend};
use crate::hooks::Hooks;
use crate::menu::Menus;
use crate::model::Model;
use crate::utils::error::Result;
use std::sync::mpsc::Receiver;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> LoadState<T> {
    fn from_result(section: &str, result: Result<T>) -> Self {
        match result {
            Ok(value) => Self::Ready(value),
            Err(e) => {
                warn!("Failed to load {}: {}", section, e);
                Self::Failed(e.to_string())
            }
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

pub struct StorageContext<B: StorageBackend> {
    backend: B,
    events: Receiver<BackendEvent>,
    pub config: LoadState<ConfigModel>,
    pub system: LoadState<System>,
    pub issues: LoadState<Vec<Issue>>,
    pub jobs: LoadState<Vec<FormatJob>>,
    pub menus: Menus,
    capabilities: Capabilities,
    forced: Capabilities,
    activation_error: Option<String>,
}

impl<B: StorageBackend> StorageContext<B> {
    /// Context with every section still loading
    pub fn new(backend: B) -> Self {
        let events = backend.subscribe();
        Self {
            backend,
            events,
            config: LoadState::Loading,
            system: LoadState::Loading,
            issues: LoadState::Loading,
            jobs: LoadState::Loading,
            menus: Menus::default(),
            capabilities: Capabilities::default(),
            forced: Capabilities::default(),
            activation_error: None,
        }
    }

    /// Enable technologies regardless of what the backend reports
    pub fn with_capabilities(mut self, forced: Capabilities) -> Self {
        self.forced = forced;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn hooks(&self) -> Hooks<'_, B> {
        Hooks::new(&self.backend)
    }

    /// Fetch every section. Capabilities are resolved here and kept until
    /// the next load.
    pub fn load(&mut self) {
        self.system = LoadState::from_result("system", self.backend.fetch_system());
        self.load_config();
        self.jobs = LoadState::from_result("format jobs", self.backend.fetch_format_jobs());

        let reported = self.backend.fetch_capabilities().unwrap_or_else(|e| {
            warn!("Failed to load capabilities: {}", e);
            Capabilities::default()
        });
        self.capabilities = Capabilities {
            zfcp: reported.zfcp || self.forced.zfcp,
            dasd: reported.dasd || self.forced.dasd,
        };
    }

    fn load_config(&mut self) {
        self.config = LoadState::from_result("configuration", self.backend.fetch_config());
        self.issues = LoadState::from_result("issues", self.backend.fetch_issues());
    }

    /// Drop every open menu and fetch everything again
    pub fn reload(&mut self) {
        self.menus = Menus::default();
        self.load();
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Derived model, once both the document and the system are loaded
    pub fn model(&self) -> Option<Model<'_>> {
        Some(Model::build(self.config.ready()?, self.system.ready()?))
    }

    /// Apply pending backend notifications. Returns how many were handled.
    pub fn poll_events(&mut self) -> usize {
        let events: Vec<BackendEvent> = self.events.try_iter().collect();
        let mut devices_changed = false;
        let mut config_changed = false;

        for event in &events {
            match event {
                BackendEvent::DevicesChanged => devices_changed = true,
                BackendEvent::ConfigChanged => config_changed = true,
                BackendEvent::FormatProgress(job) => self.update_job(job.clone()),
            }
        }

        if devices_changed {
            debug!("Devices changed, reloading");
            self.reload();
        } else if config_changed {
            debug!("Configuration changed, reloading");
            self.menus = Menus::default();
            self.load_config();
        }
        events.len()
    }

    fn update_job(&mut self, job: FormatJob) {
        let mut jobs = self.jobs.ready().cloned().unwrap_or_default();
        match jobs.iter_mut().find(|j| j.id == job.id) {
            Some(slot) => *slot = job,
            None => jobs.push(job),
        }
        self.jobs = LoadState::Ready(jobs);
    }

    /// Last activation failure, shown until dismissed
    pub fn activation_error(&self) -> Option<&str> {
        self.activation_error.as_deref()
    }

    pub fn dismiss_activation_error(&mut self) {
        self.activation_error = None;
    }

    fn track_activation(&mut self, result: Result<()>) -> Result<()> {
        match &result {
            Ok(()) => self.activation_error = None,
            Err(e) => {
                warn!("{}", e);
                self.activation_error = Some(e.to_string());
            }
        }
        result
    }

    pub fn activate_dasd(&mut self, channel: &str) -> Result<()> {
        let result = self.backend.activate_dasd(channel);
        self.track_activation(result)
    }

    pub fn activate_zfcp(&mut self, channel: &str, wwpn: &str, lun: &str) -> Result<()> {
        let result = self.backend.activate_zfcp(channel, wwpn, lun);
        self.track_activation(result)
    }

    pub fn login_iscsi(&mut self, target: &str) -> Result<()> {
        let result = self.backend.login_iscsi(target);
        self.track_activation(result)
    }
}
