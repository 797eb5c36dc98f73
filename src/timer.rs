//! Timed invocation of session operations.
//!
//! A [`ProcessClock`] is captured once, as early as possible in `main`, and
//! every [`Timer`] measures against it. Durations come from the monotonic
//! clock, so the "from program start" figure never goes backwards within a
//! run. The wall-clock start is kept only for reporting.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::display;
use crate::types::{OutputFormat, TimingRecord};

/// Reference point for "from program start" figures.
#[derive(Debug, Clone)]
pub struct ProcessClock {
    started_at: DateTime<Utc>,
    instant: Instant,
}

impl ProcessClock {
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            instant: Instant::now(),
        }
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn elapsed(&self) -> Duration {
        self.instant.elapsed()
    }

    pub fn elapsed_at(&self, at: Instant) -> Duration {
        at.saturating_duration_since(self.instant)
    }
}

/// Runs operations once each and writes one timing line per success.
pub struct Timer<'a, W: Write> {
    clock: &'a ProcessClock,
    out: W,
    format: OutputFormat,
    steps: usize,
}

impl<'a, W: Write> Timer<'a, W> {
    pub fn new(clock: &'a ProcessClock, out: W, format: OutputFormat) -> Self {
        Self {
            clock,
            out,
            format,
            steps: 0,
        }
    }

    /// Runs `op` and reports how long it took.
    ///
    /// The operation's result is returned untouched. When `op` fails the
    /// error is passed straight through and nothing is written. Arguments are
    /// forwarded by capturing them in the closure.
    pub fn measure<T, E, F>(&mut self, label: &str, op: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<io::Error>,
    {
        let started = self.begin();
        let value = op()?;
        self.record(label, started)?;
        Ok(value)
    }

    /// Like [`Timer::measure`] for operations that cannot fail, e.g. sleeping.
    pub fn measure_value<T, F>(&mut self, label: &str, op: F) -> io::Result<T>
    where
        F: FnOnce() -> T,
    {
        let started = self.begin();
        let value = op();
        self.record(label, started)?;
        Ok(value)
    }

    /// Start of a measurement that is closed later with [`Timer::record`].
    pub fn begin(&self) -> Instant {
        Instant::now()
    }

    /// Ends a measurement opened with [`Timer::begin`] and writes its line.
    pub fn record(&mut self, label: &str, started: Instant) -> io::Result<()> {
        let end = Instant::now();
        let record = TimingRecord {
            label: label.to_string(),
            duration: end.saturating_duration_since(started),
            elapsed: self.clock.elapsed_at(end),
        };
        self.emit(&record)
    }

    /// Number of timing lines written so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, record: &TimingRecord) -> io::Result<()> {
        let line = match self.format {
            OutputFormat::Text => display::format_text(record),
            OutputFormat::Json => display::format_json(record, self.clock.started_at()),
        };
        writeln!(self.out, "{}", line)?;
        self.out.flush()?;
        self.steps += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum OpError {
        Boom(&'static str),
        Io(String),
    }

    impl From<io::Error> for OpError {
        fn from(err: io::Error) -> Self {
            OpError::Io(err.to_string())
        }
    }

    fn lines(out: Vec<u8>) -> Vec<String> {
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(String::from)
            .collect()
    }

    /// Pulls the two numeric fields out of a text timing line.
    fn fields(line: &str) -> (f64, f64) {
        let (_, rest) = line.split_once(" took: ").unwrap();
        let (duration, rest) = rest.split_once(". From Program Start: ").unwrap();
        let elapsed = rest.strip_suffix('.').unwrap();
        (duration.parse().unwrap(), elapsed.parse().unwrap())
    }

    #[test]
    fn measure_returns_operation_value() {
        let clock = ProcessClock::start();
        let mut timer = Timer::new(&clock, Vec::new(), OutputFormat::Text);

        let value: Result<_, OpError> = timer.measure("Answer", || Ok(42));
        assert_eq!(value, Ok(42));
    }

    #[test]
    fn measure_writes_exactly_one_line() {
        let clock = ProcessClock::start();
        let mut timer = Timer::new(&clock, Vec::new(), OutputFormat::Text);

        let _: Result<(), OpError> = timer.measure("Noop", || Ok(()));
        assert_eq!(timer.steps(), 1);

        let out = lines(timer.into_inner());
        assert_eq!(out.len(), 1);
        assert!(out[0].starts_with("Noop took: 0.00. From Program Start: "));
        assert!(out[0].ends_with('.'));
    }

    #[test]
    fn measure_forwards_captured_arguments() {
        let clock = ProcessClock::start();
        let mut timer = Timer::new(&clock, Vec::new(), OutputFormat::Text);

        let add = |a: i32, b: i32| -> Result<i32, OpError> { Ok(a + b) };
        let (a, b) = (40, 2);
        assert_eq!(timer.measure("Add", || add(a, b)), Ok(42));
    }

    #[test]
    fn failed_operation_propagates_and_writes_nothing() {
        let clock = ProcessClock::start();
        let mut timer = Timer::new(&clock, Vec::new(), OutputFormat::Text);

        let result: Result<(), OpError> = timer.measure("Broken", || Err(OpError::Boom("no")));
        assert_eq!(result, Err(OpError::Boom("no")));
        assert_eq!(timer.steps(), 0);
        assert!(timer.into_inner().is_empty());
    }

    #[test]
    fn anyhow_errors_pass_through_unchanged() {
        let clock = ProcessClock::start();
        let mut timer = Timer::new(&clock, Vec::new(), OutputFormat::Text);

        let result: anyhow::Result<()> =
            timer.measure("Broken", || Err(anyhow::anyhow!("runtime failed to start")));
        assert_eq!(result.unwrap_err().to_string(), "runtime failed to start");
        assert!(timer.into_inner().is_empty());
    }

    #[test]
    fn both_fields_have_two_decimals() {
        let clock = ProcessClock::start();
        let mut timer = Timer::new(&clock, Vec::new(), OutputFormat::Text);

        timer
            .measure_value("Sleeping for 0.02 sec", || {
                std::thread::sleep(Duration::from_millis(20))
            })
            .unwrap();

        let out = lines(timer.into_inner());
        let (_, rest) = out[0].split_once(" took: ").unwrap();
        let (duration, rest) = rest.split_once(". From Program Start: ").unwrap();
        let elapsed = rest.strip_suffix('.').unwrap();
        for number in [duration, elapsed] {
            let (_, decimals) = number.split_once('.').unwrap();
            assert_eq!(decimals.len(), 2, "bad number {number:?} in {:?}", out[0]);
        }
        assert!(duration.parse::<f64>().unwrap() >= 0.02);
    }

    #[test]
    fn elapsed_is_non_decreasing() {
        let clock = ProcessClock::start();
        let mut timer = Timer::new(&clock, Vec::new(), OutputFormat::Text);

        for i in 0..5 {
            timer
                .measure_value(&format!("Step {i}"), || {
                    std::thread::sleep(Duration::from_millis(3))
                })
                .unwrap();
        }

        let out = lines(timer.into_inner());
        assert_eq!(out.len(), 5);
        let elapsed: Vec<f64> = out.iter().map(|l| fields(l).1).collect();
        assert!(elapsed.windows(2).all(|w| w[0] <= w[1]), "{elapsed:?}");
    }

    #[test]
    fn begin_and_record_wrap_nested_measurements() {
        let clock = ProcessClock::start();
        let mut timer = Timer::new(&clock, Vec::new(), OutputFormat::Text);

        let outer = timer.begin();
        timer
            .measure_value("Inner", || std::thread::sleep(Duration::from_millis(10)))
            .unwrap();
        timer.record("Outer", outer).unwrap();

        let out = lines(timer.into_inner());
        assert_eq!(out.len(), 2);
        assert!(out[0].starts_with("Inner took: "));
        assert!(out[1].starts_with("Outer took: "));
        let (inner, inner_elapsed) = fields(&out[0]);
        let (outer, outer_elapsed) = fields(&out[1]);
        assert!(outer >= inner);
        assert!(outer_elapsed >= inner_elapsed);
    }

    #[test]
    fn json_format_writes_one_object_per_line() {
        let clock = ProcessClock::start();
        let mut timer = Timer::new(&clock, Vec::new(), OutputFormat::Json);

        let _: Result<(), OpError> = timer.measure("First session", || Ok(()));
        let _: Result<(), OpError> = timer.measure("Second session", || Ok(()));

        let out = lines(timer.into_inner());
        assert_eq!(out.len(), 2);
        for (line, label) in out.iter().zip(["First session", "Second session"]) {
            let parsed: serde_json::Value = serde_json::from_str(line).unwrap();
            assert_eq!(parsed["label"], label);
            assert!(parsed["duration_secs"].is_number());
            assert!(parsed["elapsed_secs"].is_number());
        }
    }

    #[test]
    fn clock_elapsed_at_saturates_before_start() {
        let before = Instant::now();
        let clock = ProcessClock::start();
        assert_eq!(clock.elapsed_at(before), Duration::ZERO);
    }
}
