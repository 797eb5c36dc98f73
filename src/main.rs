use std::io;
use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use sessprobe::command::CommandRuntime;
use sessprobe::config::{self, ProviderSettings};
use sessprobe::display;
use sessprobe::logging;
use sessprobe::runtime::LocalRuntime;
use sessprobe::scenario::{self, Scenario, ScenarioRunner};
use sessprobe::session::SessionProvider;
use sessprobe::timer::{ProcessClock, Timer};
use sessprobe::types::OutputFormat;

#[derive(Parser)]
#[command(
    name = "sessprobe",
    version,
    about = "Measure how long it takes to acquire a computing session"
)]
struct Cli {
    /// Scenario to run
    #[arg(value_enum, default_value_t = Scenario::DoubleCreate)]
    scenario: Scenario,

    /// Seconds to sleep before acquiring (single-acquire-after-wait)
    #[arg(long, default_value_t = 2.0, allow_negative_numbers = true)]
    wait: f64,

    /// Settings file (default: <config dir>/sessprobe/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print timing lines as JSON objects
    #[arg(long)]
    json: bool,

    /// Print a run summary to stderr when done
    #[arg(long)]
    summary: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn run(clock: &ProcessClock) -> Result<()> {
    let cli = Cli::parse();

    let settings = config::load_settings(cli.config.as_deref())?;
    logging::init_logging(cli.verbose, settings.log.level.as_deref())?;

    let wait = scenario::parse_wait(cli.wait)?;
    let format = if cli.json {
        OutputFormat::Json
    } else {
        settings.output.format
    };

    let default_name = settings.session.default_name.as_str();
    let mut provider: Box<dyn SessionProvider> = match &settings.provider {
        ProviderSettings::Local(local) => Box::new(LocalRuntime::new(local, default_name)),
        ProviderSettings::Command(command) => {
            Box::new(CommandRuntime::new(command.clone(), default_name))
        }
    };

    let timer = Timer::new(clock, io::stdout().lock(), format);
    let mut runner =
        ScenarioRunner::new(&mut provider, timer, settings.session.second_name.as_str());

    info!(scenario = cli.scenario.name(), "Running scenario");
    runner.run(cli.scenario, wait)?;

    if cli.summary {
        eprintln!(
            "{}",
            display::format_summary(cli.scenario.name(), runner.steps(), clock.elapsed())
        );
    }

    Ok(())
}

fn main() {
    let clock = ProcessClock::start();
    if let Err(err) = run(&clock) {
        eprintln!("{}", err);
        process::exit(1);
    }
}
