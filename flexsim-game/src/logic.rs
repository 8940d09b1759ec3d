use flexsim_core::{GameState, RepetitionRecord, Sample, SimError};
use rand::Rng;

use crate::config::{GameConfig, GameMode, RetargetPolicy};
use crate::signal::EngagementLatch;

/// What a single `step` did to the game state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Game was already over; nothing was touched.
    Inactive,
    /// No repetitions were left; the game is now over.
    Finished,
    /// Target channel below threshold.
    Idle,
    /// Target channel flexed: a repetition was counted.
    Repetition(RepetitionRecord),
}

/// Processing task: checks the target channel against the flex threshold
/// and moves the game forward.
pub struct GameLogic<R: Rng> {
    pub rng: R,
    latch: EngagementLatch,
    channel_count: usize,
    flex_threshold: u16,
    retarget: RetargetPolicy,
    mode: GameMode,
    score_step: u32,
    score_limit: u32,
    // Repetitions counted since the last `begin_run`
    completed: u32,
}

impl<R: Rng> GameLogic<R> {
    pub fn new(config: &GameConfig, rng: R, latch: EngagementLatch) -> Self {
        Self {
            rng,
            latch,
            channel_count: config.channel_count,
            flex_threshold: config.flex_threshold,
            retarget: config.retarget,
            mode: config.mode,
            score_step: config.score_step,
            score_limit: config.score_limit,
            completed: 0,
        }
    }

    pub fn flex_threshold(&self) -> u16 {
        self.flex_threshold
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// Restarts repetition numbering at 1.
    pub fn begin_run(&mut self) {
        self.completed = 0;
    }

    pub fn step(&mut self, sample: &Sample, state: &mut GameState) -> Result<StepOutcome, SimError> {
        if state.game_over {
            return Ok(StepOutcome::Inactive);
        }
        state.check(self.channel_count)?;
        if sample.channel_count() != self.channel_count {
            return Err(SimError::invariant(format!(
                "sample has {} channels, expected {}",
                sample.channel_count(),
                self.channel_count
            )));
        }

        match self.mode {
            GameMode::Classic if state.repetitions_remaining <= 0 => {
                state.game_over = true;
                log::info!(
                    "Game over at {} ms: all repetitions complete",
                    sample.timestamp_ms
                );
                return Ok(StepOutcome::Finished);
            }
            GameMode::Progressive if state.score_required == 0 => {
                return Err(SimError::invariant("progressive game without a score requirement"));
            }
            _ => {}
        }

        let target = state.target_channel;
        let intensity = sample.values[target];
        if intensity < self.flex_threshold {
            return Ok(StepOutcome::Idle);
        }

        let reaction_ms = sample
            .timestamp_ms
            .checked_sub(state.target_set_ms)
            .ok_or_else(|| {
                SimError::invariant(format!(
                    "sample at {} ms predates target set at {} ms",
                    sample.timestamp_ms, state.target_set_ms
                ))
            })?;

        state.last_reaction_ms = reaction_ms;
        state.score_count[target] += 1;
        state.feedback_pending = true;
        state.target_set_ms = sample.timestamp_ms;
        // The trigger has to be asserted again for the next flex
        self.latch.clear();
        self.completed += 1;

        match self.mode {
            GameMode::Classic => {
                state.repetitions_remaining -= 1;
                state.target_channel = self.next_target(target);
            }
            GameMode::Progressive => self.raise_requirement(state, target, sample.timestamp_ms),
        }

        let record = RepetitionRecord {
            repetition: self.completed,
            channel: target,
            reaction_ms,
            timestamp_ms: sample.timestamp_ms,
        };
        log::info!(
            "Repetition {} on channel {} (intensity {}), reaction {} ms",
            record.repetition,
            target,
            intensity,
            reaction_ms
        );
        Ok(StepOutcome::Repetition(record))
    }

    fn next_target(&mut self, current: usize) -> usize {
        match self.retarget {
            RetargetPolicy::Random => self.rng.random_range(0..self.channel_count),
            RetargetPolicy::Sequential => (current + 1) % self.channel_count,
        }
    }

    // Scores are cumulative: a finger that comes round again keeps what it
    // already earned towards the higher requirement.
    fn raise_requirement(&self, state: &mut GameState, target: usize, now_ms: u64) {
        if state.score_count[target] < state.score_required {
            return;
        }
        log::info!(
            "Channel {} reached score {} at {} ms",
            target,
            state.score_required,
            now_ms
        );
        state.target_channel = (target + 1) % self.channel_count;
        state.score_required += self.score_step;
        if state.score_required > self.score_limit {
            state.game_over = true;
            log::info!(
                "Game over at {} ms: requirement passed {}",
                now_ms,
                self.score_limit
            );
        }
    }
}
