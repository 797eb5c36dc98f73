use std::io::Write;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use clap::ValueEnum;

use crate::errors::ProbeError;
use crate::session::SessionProvider;
use crate::timer::Timer;
use crate::types::SessionHandle;

/// Fixed call patterns the probe knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Scenario {
    /// Acquire one session
    SingleAcquire,
    /// Sleep for --wait seconds, then acquire one session
    SingleAcquireAfterWait,
    /// Acquire twice in a row under two different names
    DoubleAcquire,
    /// Acquire, stop, then acquire again with the first session's configuration
    SingleCreate,
    /// Run single-create twice in a row
    #[default]
    DoubleCreate,
}

impl Scenario {
    pub fn name(self) -> &'static str {
        match self {
            Scenario::SingleAcquire => "single-acquire",
            Scenario::SingleAcquireAfterWait => "single-acquire-after-wait",
            Scenario::DoubleAcquire => "double-acquire",
            Scenario::SingleCreate => "single-create",
            Scenario::DoubleCreate => "double-create",
        }
    }
}

/// Converts a `--wait` value in seconds into a duration.
pub fn parse_wait(secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs).map_err(|_| ProbeError::InvalidWait { value: secs }.into())
}

/// Drives a provider through a scenario, timing every step.
pub struct ScenarioRunner<'a, P: SessionProvider + ?Sized, W: Write> {
    provider: &'a mut P,
    timer: Timer<'a, W>,
    second_name: String,
}

impl<'a, P: SessionProvider + ?Sized, W: Write> ScenarioRunner<'a, P, W> {
    pub fn new(provider: &'a mut P, timer: Timer<'a, W>, second_name: impl Into<String>) -> Self {
        Self {
            provider,
            timer,
            second_name: second_name.into(),
        }
    }

    pub fn run(&mut self, scenario: Scenario, wait: Duration) -> Result<()> {
        match scenario {
            Scenario::SingleAcquire => self.single_acquire(),
            Scenario::SingleAcquireAfterWait => self.single_acquire_after_wait(wait),
            Scenario::DoubleAcquire => self.double_acquire(),
            Scenario::SingleCreate => self.single_create(),
            Scenario::DoubleCreate => self.double_create(),
        }
    }

    pub fn single_acquire(&mut self) -> Result<()> {
        let Self { provider, timer, .. } = self;
        timer.measure("First session", || provider.acquire(None, None))?;
        Ok(())
    }

    pub fn single_acquire_after_wait(&mut self, wait: Duration) -> Result<()> {
        let Self { provider, timer, .. } = self;
        let label = format!("Sleeping for {} sec", wait.as_secs_f64());
        timer.measure_value(&label, || thread::sleep(wait))?;
        timer.measure("Getting session", || provider.acquire(None, None))?;
        Ok(())
    }

    pub fn double_acquire(&mut self) -> Result<()> {
        let Self {
            provider,
            timer,
            second_name,
        } = self;
        timer.measure("First session", || provider.acquire(None, None))?;
        timer.measure("Second session", || {
            provider.acquire(Some(second_name.as_str()), None)
        })?;
        Ok(())
    }

    pub fn single_create(&mut self) -> Result<()> {
        let started = self.timer.begin();
        self.create_session()?;
        self.timer.record("Create session", started)?;
        Ok(())
    }

    pub fn double_create(&mut self) -> Result<()> {
        let started = self.timer.begin();
        self.create_session()?;
        self.timer.record("Create first session", started)?;

        let started = self.timer.begin();
        self.create_session()?;
        self.timer.record("Create second session", started)?;
        Ok(())
    }

    /// Acquire, stop, and re-acquire with the stopped session's configuration.
    fn create_session(&mut self) -> Result<SessionHandle> {
        let Self { provider, timer, .. } = self;
        let session = timer.measure("Initial acquire", || provider.acquire(None, None))?;
        let config = provider.read_configuration(&session)?;
        timer.measure("Stopping session", || provider.release(&session))?;
        timer.measure("Second acquire after stop", || {
            provider.acquire(None, Some(config))
        })
    }

    /// Number of timing lines written so far.
    pub fn steps(&self) -> usize {
        self.timer.steps()
    }

    pub fn into_timer(self) -> Timer<'a, W> {
        self.timer
    }
}
