use flexsim_core::{GameState, RepetitionRecord, SimError};
use flexsim_timing::Clock;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::config::{GameConfig, GameMode};
use crate::logic::{GameLogic, StepOutcome};
use crate::present::{DisplayBackend, FeedbackDevice, PresentationSink};
use crate::shared::SharedSample;
use crate::signal::{EngagementLatch, SignalSource};

/// Why a run stopped
#[derive(Copy, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// The game reached game over on its own.
    Completed,
    /// The tick ceiling was hit first. Not a game state transition.
    AbortedByCeiling,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub state: GameState,
    pub ticks: u64,
    pub elapsed_ms: u64,
    pub records: Vec<RepetitionRecord>,
    pub pulses: u64,
}

/// Round-robin scheduler for the acquisition, processing and presentation
/// steps, driven by a `Clock`.
pub struct Driver<C, R, D, F>
where
    C: Clock,
    R: Rng,
    D: DisplayBackend,
    F: FeedbackDevice,
{
    pub config: GameConfig,
    pub clock: C,
    pub source: SignalSource<R>,
    pub logic: GameLogic<R>,
    pub sink: PresentationSink<D, F>,
}

impl<C, D, F> Driver<C, ChaCha8Rng, D, F>
where
    C: Clock,
    D: DisplayBackend,
    F: FeedbackDevice,
{
    /// Builds every component from `config`, with the signal source and the
    /// re-targeting policy on separate streams of the same seed.
    pub fn seeded(
        config: &GameConfig,
        seed: u64,
        clock: C,
        display: D,
        feedback: F,
    ) -> Result<Self, SimError> {
        let latch = EngagementLatch::new();
        let source_rng = ChaCha8Rng::seed_from_u64(seed);
        let mut logic_rng = ChaCha8Rng::seed_from_u64(seed);
        logic_rng.set_stream(1);

        Driver::new(
            config,
            clock,
            SignalSource::new(config, source_rng, latch.clone()),
            GameLogic::new(config, logic_rng, latch),
            PresentationSink::new(display, feedback),
        )
    }
}

impl<C, R, D, F> Driver<C, R, D, F>
where
    C: Clock,
    R: Rng,
    D: DisplayBackend,
    F: FeedbackDevice,
{
    pub fn new(
        config: &GameConfig,
        clock: C,
        source: SignalSource<R>,
        logic: GameLogic<R>,
        sink: PresentationSink<D, F>,
    ) -> Result<Self, SimError> {
        config.validate()?;
        Ok(Self {
            config: config.clone(),
            clock,
            source,
            logic,
            sink,
        })
    }

    pub fn initial_state(&self) -> GameState {
        match self.config.mode {
            GameMode::Classic => {
                GameState::new(self.config.channel_count, self.config.initial_repetitions)
            }
            GameMode::Progressive => {
                GameState::progressive(self.config.channel_count, self.config.score_required)
            }
        }
    }

    /// Runs ticks until game over or until `max_ticks` ticks have run.
    pub fn run(&mut self, state: GameState, max_ticks: u64) -> Result<RunReport, SimError> {
        let mut state = state;
        state.check(self.config.channel_count)?;

        let mut slot = SharedSample::new(self.config.channel_count);
        let mut records = Vec::new();
        let start_ms = self.clock.now_ms();
        let pulses_before = self.sink.pulses();
        let mut ticks = 0;

        self.logic.begin_run();
        self.sink.initialize_display();
        log::info!(
            "Starting run: {} channels, {} repetitions, ceiling {} ticks",
            self.config.channel_count,
            state.repetitions_remaining,
            max_ticks
        );

        let outcome = loop {
            if let Some(outcome) = verdict(&state, ticks, max_ticks) {
                break outcome;
            }
            if let Some(record) = self.tick(&mut slot, &mut state)? {
                records.push(record);
            }
            ticks += 1;
        };

        Ok(RunReport {
            outcome,
            state,
            ticks,
            elapsed_ms: self.clock.now_ms() - start_ms,
            records,
            pulses: self.sink.pulses() - pulses_before,
        })
    }

    fn tick(
        &mut self,
        slot: &mut SharedSample,
        state: &mut GameState,
    ) -> Result<Option<RepetitionRecord>, SimError> {
        let now_ms = self.clock.now_ms();
        slot.write(self.source.generate(self.config.channel_count, now_ms));

        let sample = slot.read();
        let record = match self.logic.step(&sample, state)? {
            StepOutcome::Repetition(record) => Some(record),
            _ => None,
        };
        let frame = self.sink.present(state, &sample)?;
        log::trace!("t={} ms {:?} -> {:?}", now_ms, sample.values, frame);

        self.clock.advance();
        Ok(record)
    }
}

/// Decides, between ticks, whether the run is over.
pub(crate) fn verdict(state: &GameState, ticks: u64, max_ticks: u64) -> Option<RunOutcome> {
    if state.game_over {
        return Some(RunOutcome::Completed);
    }
    if ticks >= max_ticks {
        log::warn!(
            "Tick ceiling reached after {} ticks with {} repetitions left",
            ticks,
            state.repetitions_remaining
        );
        return Some(RunOutcome::AbortedByCeiling);
    }
    None
}
