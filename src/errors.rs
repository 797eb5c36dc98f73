use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum ProbeError {
    #[error("Config file not found at {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Failed to read config file {path}: {source}")]
    ConfigReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {detail}")]
    ConfigParseError { path: PathBuf, detail: String },

    #[error("Invalid wait '{value}'. Expected a non-negative number of seconds")]
    InvalidWait { value: f64 },

    #[error("Session {id} is not the active session")]
    SessionNotActive { id: String },

    #[error("No command configured for session step '{step}'")]
    EmptyCommand { step: String },

    #[error("Failed to run {step} command '{program}': {source}")]
    CommandSpawnError {
        step: String,
        program: String,
        source: std::io::Error,
    },

    #[error("Session {step} command exited with {status}: {stderr}")]
    CommandFailed {
        step: String,
        status: String,
        stderr: String,
    },

    #[error("Session acquire command printed no session id")]
    MissingSessionId,

    #[error("Session describe command printed invalid configuration: {detail}")]
    InvalidSessionConfig { detail: String },
}
