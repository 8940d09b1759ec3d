use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};
use flexsim_game::{GameMode, RetargetPolicy};
use log::LevelFilter;

#[derive(ValueEnum, Copy, Clone, Debug)]
pub enum Retarget {
    /// Any channel, repeats allowed
    Random,
    /// Next channel in order
    Sequential,
}

impl From<Retarget> for RetargetPolicy {
    fn from(value: Retarget) -> Self {
        match value {
            Retarget::Random => RetargetPolicy::Random,
            Retarget::Sequential => RetargetPolicy::Sequential,
        }
    }
}

#[derive(ValueEnum, Copy, Clone, Debug)]
pub enum Mode {
    /// Fixed number of repetitions
    Classic,
    /// Each finger stays the target until it meets a rising score requirement
    Progressive,
}

impl From<Mode> for GameMode {
    fn from(value: Mode) -> Self {
        match value {
            Mode::Classic => GameMode::Classic,
            Mode::Progressive => GameMode::Progressive,
        }
    }
}

/// Finger flex rehabilitation game, simulated end to end.
#[derive(Debug, Parser)]
#[command(name = "flexsim", version, about)]
pub struct Cli {
    /// JSON file with game settings; flags below override it
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// ADC resolution preset in bits (10 or 12)
    #[arg(long)]
    pub resolution: Option<u8>,

    #[arg(long)]
    pub channels: Option<usize>,

    #[arg(long)]
    pub repetitions: Option<i32>,

    /// Seed for every random draw; random when omitted
    #[arg(long)]
    pub seed: Option<u64>,

    /// Virtual time after which the run is aborted
    #[arg(long)]
    pub time_limit_ms: Option<u64>,

    #[arg(long, value_enum)]
    pub retarget: Option<Retarget>,

    #[arg(long, value_enum)]
    pub mode: Option<Mode>,

    /// Run acquisition, processing and presentation on separate threads
    #[arg(long)]
    pub tasks: bool,

    /// Pace ticks against the wall clock instead of running flat out
    #[arg(long)]
    pub realtime: bool,

    /// Write the run summary as JSON to this file
    #[arg(long)]
    pub results: Option<PathBuf>,

    /// More output (-v, -vv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Warn;
        }
        match self.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_levels() {
        let cli = Cli::parse_from(["flexsim"]);
        assert_eq!(cli.log_level(), LevelFilter::Info);
        let cli = Cli::parse_from(["flexsim", "-vv"]);
        assert_eq!(cli.log_level(), LevelFilter::Trace);
        let cli = Cli::parse_from(["flexsim", "-q"]);
        assert_eq!(cli.log_level(), LevelFilter::Warn);
    }

    #[test]
    fn overrides_parse() {
        let cli = Cli::parse_from([
            "flexsim",
            "--channels",
            "3",
            "--seed",
            "42",
            "--retarget",
            "sequential",
            "--tasks",
            "--mode",
            "progressive",
        ]);
        assert_eq!(cli.channels, Some(3));
        assert_eq!(cli.seed, Some(42));
        assert!(matches!(cli.retarget, Some(Retarget::Sequential)));
        assert!(cli.tasks);
        assert!(!cli.realtime);
        assert!(matches!(cli.mode, Some(Mode::Progressive)));
    }
}
