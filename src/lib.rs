pub mod command;
pub mod config;
pub mod display;
pub mod errors;
pub mod logging;
pub mod runtime;
pub mod scenario;
pub mod session;
pub mod timer;
pub mod types;
