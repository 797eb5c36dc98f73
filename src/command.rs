//! Session provider backed by external commands.
//!
//! Each session step runs a configured argv to completion. Session details
//! travel through environment variables:
//!
//! - `SESSPROBE_SESSION_NAME`: name to acquire under (all steps)
//! - `SESSPROBE_SESSION_CONF`: JSON object, only when a configuration is forwarded
//! - `SESSPROBE_SESSION_ID`: id printed by the acquire command (release, describe)
//!
//! The acquire command prints the session id as its first line of output.
//! The describe command prints the session configuration as a JSON object of
//! strings.

use std::process::{Command, Stdio};

use anyhow::Result;
use tracing::debug;

use crate::config::CommandSettings;
use crate::errors::ProbeError;
use crate::session::SessionProvider;
use crate::types::{APP_NAME_KEY, SessionConfig, SessionHandle};

pub const SESSION_NAME_ENV: &str = "SESSPROBE_SESSION_NAME";
pub const SESSION_CONF_ENV: &str = "SESSPROBE_SESSION_CONF";
pub const SESSION_ID_ENV: &str = "SESSPROBE_SESSION_ID";

#[derive(Debug)]
pub struct CommandRuntime {
    settings: CommandSettings,
    default_name: String,
    forwarded: Option<SessionConfig>,
}

impl CommandRuntime {
    pub fn new(settings: CommandSettings, default_name: &str) -> Self {
        Self {
            settings,
            default_name: default_name.to_string(),
            forwarded: None,
        }
    }
}

impl SessionProvider for CommandRuntime {
    fn acquire(
        &mut self,
        name: Option<&str>,
        config: Option<SessionConfig>,
    ) -> Result<SessionHandle> {
        let name = name.unwrap_or(self.default_name.as_str()).to_string();
        let mut envs = vec![(SESSION_NAME_ENV, name.clone())];
        if let Some(config) = &config {
            envs.push((SESSION_CONF_ENV, serde_json::to_string(config)?));
        }

        let stdout = run_step("acquire", &self.settings.acquire, &envs)?;
        let id = stdout
            .lines()
            .next()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .ok_or(ProbeError::MissingSessionId)?
            .to_string();

        self.forwarded = config;
        Ok(SessionHandle { id, name })
    }

    fn release(&mut self, handle: &SessionHandle) -> Result<()> {
        run_step("release", &self.settings.release, &handle_envs(handle))?;
        Ok(())
    }

    fn read_configuration(&self, handle: &SessionHandle) -> Result<SessionConfig> {
        let Some(describe) = &self.settings.describe else {
            let mut config = self.forwarded.clone().unwrap_or_default();
            config.insert(APP_NAME_KEY.to_string(), handle.name.clone());
            return Ok(config);
        };

        let stdout = run_step("describe", describe, &handle_envs(handle))?;
        let config: SessionConfig = serde_json::from_str(stdout.trim())
            .map_err(|e| ProbeError::InvalidSessionConfig {
                detail: e.to_string(),
            })?;
        Ok(config)
    }
}

fn handle_envs(handle: &SessionHandle) -> Vec<(&'static str, String)> {
    vec![
        (SESSION_ID_ENV, handle.id.clone()),
        (SESSION_NAME_ENV, handle.name.clone()),
    ]
}

/// Runs one session step and returns its stdout.
fn run_step(step: &str, argv: &[String], envs: &[(&str, String)]) -> Result<String> {
    let (program, args) = argv.split_first().ok_or_else(|| ProbeError::EmptyCommand {
        step: step.to_string(),
    })?;

    debug!(step, program = %program, "Running session command");
    let output = Command::new(program)
        .args(args)
        .envs(envs.iter().map(|(key, value)| (*key, value.as_str())))
        .stdin(Stdio::null())
        .output()
        .map_err(|source| ProbeError::CommandSpawnError {
            step: step.to_string(),
            program: program.clone(),
            source,
        })?;

    if !output.status.success() {
        return Err(ProbeError::CommandFailed {
            step: step.to_string(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
        .into());
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
