use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use flexsim_game::{AdcResolution, Driver, GameConfig, Summary};
use flexsim_timing::{Clock, PacedClock, VirtualClock};
use rand::Rng;

use crate::cli::Cli;
use crate::console::{ConsoleDisplay, ConsoleFeedback};

pub struct App {
    config: GameConfig,
    seed: u64,
    tasks: bool,
    realtime: bool,
    results: Option<PathBuf>,
}

impl App {
    pub fn new(cli: &Cli) -> Result<Self> {
        let config = load_config(cli)?;
        let seed = config.seed.unwrap_or_else(|| rand::rng().random());

        Ok(Self {
            config,
            seed,
            tasks: cli.tasks,
            realtime: cli.realtime,
            results: cli.results.clone(),
        })
    }

    pub fn run(self) -> Result<()> {
        let tick_ms = self.config.tick_ms;
        if self.realtime {
            self.run_with(PacedClock::new(tick_ms))
        } else {
            self.run_with(VirtualClock::new(tick_ms))
        }
    }

    fn run_with<C: Clock + Send>(&self, clock: C) -> Result<()> {
        log::info!(
            "Seed {} ({} mode, {} clock)",
            self.seed,
            if self.tasks { "three-task" } else { "sequential" },
            if self.realtime { "paced" } else { "virtual" }
        );

        let mut driver = Driver::seeded(
            &self.config,
            self.seed,
            clock,
            ConsoleDisplay::default(),
            ConsoleFeedback::default(),
        )?;
        let state = driver.initial_state();
        let budget = self.config.tick_budget();

        let report = if self.tasks {
            driver.run_tasks(state, budget)
        } else {
            driver.run(state, budget)
        }
        .context("Simulation stopped on a fatal error")?;

        let summary = Summary::from_report(&report, Some(self.seed));
        driver.sink.show_summary(&summary);

        if self.realtime {
            let stats = driver.clock.stats();
            log::info!(
                "Pacing over {} ticks: {:.3} ms/tick, jitter {:.3} ms, min {:.3} ms, max {:.3} ms",
                stats.samples,
                stats.average_tick_ns / 1_000_000.0,
                stats.jitter_ns / 1_000_000.0,
                stats.min_tick_ns / 1_000_000.0,
                stats.max_tick_ns / 1_000_000.0,
            );
        }

        if let Some(path) = &self.results {
            let file = File::create(path)
                .with_context(|| format!("Cannot create result file {}", path.display()))?;
            summary
                .write_json(BufWriter::new(file))
                .context("Failed to write results")?;
            println!("Results saved to {}", path.display());
        }

        Ok(())
    }
}

/// File settings first, then the resolution preset, then single-value flags.
fn load_config(cli: &Cli) -> Result<GameConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Cannot read config file {}", path.display()))?;
            GameConfig::from_json_str(&json)
                .with_context(|| format!("Bad config file {}", path.display()))?
        }
        None => GameConfig::default(),
    };

    if let Some(bits) = cli.resolution {
        let Some(resolution) = AdcResolution::from_bits(bits) else {
            bail!("Unsupported resolution {} bits, expected 10 or 12", bits);
        };
        config.apply_resolution(resolution);
    }
    if let Some(channels) = cli.channels {
        config.channel_count = channels;
    }
    if let Some(repetitions) = cli.repetitions {
        config.initial_repetitions = repetitions;
    }
    if let Some(limit) = cli.time_limit_ms {
        config.time_limit_ms = limit;
    }
    if let Some(retarget) = cli.retarget {
        config.retarget = retarget.into();
    }
    if let Some(mode) = cli.mode {
        config.mode = mode.into();
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }

    config.validate()?;
    Ok(config)
}
