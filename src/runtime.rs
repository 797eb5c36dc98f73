//! In-process session runtime.
//!
//! Emulates how a cluster runtime behaves from the caller's side: the first
//! acquire blocks while the runtime boots, later acquires return the cached
//! session at once, and a release forces the next acquire to start over.

use std::thread;
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, info};

use crate::config::LocalSettings;
use crate::errors::ProbeError;
use crate::session::SessionProvider;
use crate::types::{APP_NAME_KEY, SessionConfig, SessionHandle};

#[derive(Debug)]
struct ActiveSession {
    handle: SessionHandle,
    config: SessionConfig,
}

#[derive(Debug)]
pub struct LocalRuntime {
    default_name: String,
    base_config: SessionConfig,
    startup: Duration,
    restart: Duration,
    stop: Duration,
    active: Option<ActiveSession>,
    started: u64,
}

impl LocalRuntime {
    pub fn new(settings: &LocalSettings, default_name: &str) -> Self {
        Self {
            default_name: default_name.to_string(),
            base_config: settings.conf.clone(),
            startup: Duration::from_millis(settings.startup_ms),
            restart: Duration::from_millis(settings.restart_ms.unwrap_or(settings.startup_ms)),
            stop: Duration::from_millis(settings.stop_ms),
            active: None,
            started: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Number of sessions started so far.
    pub fn sessions_started(&self) -> u64 {
        self.started
    }

    fn active_for(&self, handle: &SessionHandle) -> Result<&ActiveSession> {
        match &self.active {
            Some(active) if active.handle.id == handle.id => Ok(active),
            _ => Err(ProbeError::SessionNotActive {
                id: handle.id.clone(),
            }
            .into()),
        }
    }
}

impl SessionProvider for LocalRuntime {
    fn acquire(
        &mut self,
        name: Option<&str>,
        config: Option<SessionConfig>,
    ) -> Result<SessionHandle> {
        if let Some(active) = &self.active {
            debug!(id = %active.handle.id, "Reusing active session");
            return Ok(active.handle.clone());
        }

        let delay = if self.started == 0 {
            self.startup
        } else {
            self.restart
        };
        thread::sleep(delay);

        self.started += 1;
        let name = name.unwrap_or(self.default_name.as_str()).to_string();
        let mut config = config.unwrap_or_else(|| self.base_config.clone());
        config.insert(APP_NAME_KEY.to_string(), name.clone());

        let handle = SessionHandle {
            id: format!("local-{}", self.started),
            name,
        };
        info!(id = %handle.id, name = %handle.name, ?delay, "Started session");

        self.active = Some(ActiveSession {
            handle: handle.clone(),
            config,
        });
        Ok(handle)
    }

    fn release(&mut self, handle: &SessionHandle) -> Result<()> {
        self.active_for(handle)?;
        thread::sleep(self.stop);
        self.active = None;
        info!(id = %handle.id, "Stopped session");
        Ok(())
    }

    fn read_configuration(&self, handle: &SessionHandle) -> Result<SessionConfig> {
        Ok(self.active_for(handle)?.config.clone())
    }
}
