use std::collections::BTreeMap;
use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Opaque session configuration. Only ever forwarded between provider calls.
pub type SessionConfig = BTreeMap<String, String>;

/// Configuration key carrying the session's application name.
pub const APP_NAME_KEY: &str = "app.name";

/// Reference to an active session, as handed out by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionHandle {
    pub id: String,
    pub name: String,
}

/// One completed measurement. Rendered as soon as it is built.
#[derive(Debug, Clone, PartialEq)]
pub struct TimingRecord {
    pub label: String,
    pub duration: Duration,
    pub elapsed: Duration,
}

impl TimingRecord {
    pub fn duration_centis(&self) -> u128 {
        round_to_centis(self.duration)
    }

    pub fn elapsed_centis(&self) -> u128 {
        round_to_centis(self.elapsed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Rounds a duration to whole hundredths of a second, ties to even.
pub fn round_to_centis(duration: Duration) -> u128 {
    const NANOS_PER_CENTI: u128 = 10_000_000;
    const HALF: u128 = NANOS_PER_CENTI / 2;

    let nanos = duration.as_nanos();
    let quotient = nanos / NANOS_PER_CENTI;
    let remainder = nanos % NANOS_PER_CENTI;

    if remainder > HALF || (remainder == HALF && quotient % 2 == 1) {
        quotient + 1
    } else {
        quotient
    }
}

/// Formats hundredths of a second as seconds with exactly two decimals.
pub fn format_centis(centis: u128) -> String {
    format!("{}.{:02}", centis / 100, centis % 100)
}
