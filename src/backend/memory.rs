//! In-memory backend for tests and demos

use super::{BackendEvent, StorageBackend, Subscribers};
use crate::api::config::ConfigModel;
use crate::api::system::{Capabilities, FormatJob, Issue, System};
use crate::utils::error::{Result, StorageError};
use std::sync::mpsc::Receiver;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct State {
    config: ConfigModel,
    default_config: ConfigModel,
    system: System,
    issues: Vec<Issue>,
    capabilities: Capabilities,
    jobs: Vec<FormatJob>,
    submissions: Vec<ConfigModel>,
    activations: Vec<String>,
    failure: Option<String>,
}

/// Backend keeping everything in memory
///
/// Records every submitted document and can be told to fail the next request.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: Mutex<State>,
    subscribers: Subscribers,
}

impl MemoryBackend {
    pub fn new(system: System) -> Self {
        Self {
            state: Mutex::new(State {
                system,
                ..Default::default()
            }),
            subscribers: Subscribers::default(),
        }
    }

    pub fn with_config(self, config: ConfigModel) -> Self {
        {
            let mut state = self.state();
            state.default_config = config.clone();
            state.config = config;
        }
        self
    }

    pub fn with_capabilities(self, capabilities: Capabilities) -> Self {
        self.state().capabilities = capabilities;
        self
    }

    pub fn with_issues(self, issues: Vec<Issue>) -> Self {
        self.state().issues = issues;
        self
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Make the next request fail with `message`
    pub fn fail_next(&self, message: &str) {
        self.state().failure = Some(message.to_string());
    }

    fn check_failure(&self) -> Result<()> {
        match self.state().failure.take() {
            Some(message) => Err(StorageError::Backend(message)),
            None => Ok(()),
        }
    }

    /// Documents submitted so far, oldest first
    pub fn submissions(&self) -> Vec<ConfigModel> {
        self.state().submissions.clone()
    }

    /// Devices activated so far, as `kind:id`
    pub fn activations(&self) -> Vec<String> {
        self.state().activations.clone()
    }

    /// Simulate a reprobe returning `system`
    pub fn replace_system(&self, system: System) {
        self.state().system = system;
        self.subscribers.notify(BackendEvent::DevicesChanged);
    }

    /// Simulate progress of a format job
    pub fn update_job(&self, job: FormatJob) {
        {
            let mut state = self.state();
            state.jobs.retain(|j| j.id != job.id);
            state.jobs.push(job.clone());
        }
        self.subscribers.notify(BackendEvent::FormatProgress(job));
    }

    fn activate(&self, kind: &str, id: String, supported: bool) -> Result<()> {
        self.check_failure()?;
        if !supported {
            return Err(StorageError::ActivationFailed {
                device: id,
                reason: format!("{} is not supported", kind),
            });
        }
        self.state().activations.push(format!("{}:{}", kind, id));
        self.subscribers.notify(BackendEvent::DevicesChanged);
        Ok(())
    }
}

impl StorageBackend for MemoryBackend {
    fn fetch_config(&self) -> Result<ConfigModel> {
        self.check_failure()?;
        Ok(self.state().config.clone())
    }

    fn fetch_system(&self) -> Result<System> {
        self.check_failure()?;
        Ok(self.state().system.clone())
    }

    fn fetch_issues(&self) -> Result<Vec<Issue>> {
        self.check_failure()?;
        Ok(self.state().issues.clone())
    }

    fn fetch_capabilities(&self) -> Result<Capabilities> {
        self.check_failure()?;
        Ok(self.state().capabilities)
    }

    fn fetch_format_jobs(&self) -> Result<Vec<FormatJob>> {
        self.check_failure()?;
        Ok(self.state().jobs.clone())
    }

    fn submit_config(&self, config: &ConfigModel) -> Result<()> {
        self.check_failure()?;
        {
            let mut state = self.state();
            state.config = config.clone();
            state.submissions.push(config.clone());
        }
        self.subscribers.notify(BackendEvent::ConfigChanged);
        Ok(())
    }

    fn reset_config(&self) -> Result<()> {
        self.check_failure()?;
        {
            let mut state = self.state();
            state.config = state.default_config.clone();
        }
        self.subscribers.notify(BackendEvent::ConfigChanged);
        Ok(())
    }

    fn rescan(&self) -> Result<()> {
        self.check_failure()?;
        self.subscribers.notify(BackendEvent::DevicesChanged);
        Ok(())
    }

    fn activate_dasd(&self, channel: &str) -> Result<()> {
        let supported = self.state().capabilities.dasd;
        self.activate("dasd", channel.to_string(), supported)
    }

    fn activate_zfcp(&self, channel: &str, wwpn: &str, lun: &str) -> Result<()> {
        let supported = self.state().capabilities.zfcp;
        self.activate("zfcp", format!("{}/{}/{}", channel, wwpn, lun), supported)
    }

    fn login_iscsi(&self, target: &str) -> Result<()> {
        self.activate("iscsi", target.to_string(), true)
    }

    fn subscribe(&self) -> Receiver<BackendEvent> {
        self.subscribers.subscribe()
    }
}
