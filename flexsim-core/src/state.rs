use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::sample::MAX_CHANNELS;

/// Game state shared by the processing and presentation tasks.
///
/// Fields are public so scenarios can be set up directly; `check` is the
/// gatekeeper that the game logic runs before touching anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// Channel the player must flex next
    pub target_channel: usize,
    /// Signed so a finished game can be told apart from a configured zero
    pub repetitions_remaining: i32,
    pub target_set_ms: u64,
    pub last_reaction_ms: u64,
    pub score_count: Vec<u32>,
    pub game_over: bool,
    /// Score the current target must reach before it moves on. Only the
    /// progressive game uses it; zero otherwise.
    #[serde(default)]
    pub score_required: u32,
    /// One-shot flag: set by the game logic, consumed by the presentation sink
    pub feedback_pending: bool,
}

impl GameState {
    pub fn new(channel_count: usize, repetitions: i32) -> Self {
        Self {
            target_channel: 0,
            repetitions_remaining: repetitions,
            target_set_ms: 0,
            last_reaction_ms: 0,
            score_count: vec![0; channel_count],
            game_over: false,
            score_required: 0,
            feedback_pending: false,
        }
    }

    /// Progressive game start: first channel, every score at zero.
    pub fn progressive(channel_count: usize, score_required: u32) -> Self {
        Self {
            score_required,
            ..Self::new(channel_count, 0)
        }
    }

    pub fn channel_count(&self) -> usize {
        self.score_count.len()
    }

    pub fn total_score(&self) -> u32 {
        self.score_count.iter().sum()
    }

    /// Verifies the state is well formed for `channel_count` channels.
    pub fn check(&self, channel_count: usize) -> Result<(), SimError> {
        if channel_count == 0 || channel_count > MAX_CHANNELS {
            return Err(SimError::invariant(format!(
                "channel count {} outside 1..={}",
                channel_count, MAX_CHANNELS
            )));
        }
        if self.score_count.len() != channel_count {
            return Err(SimError::invariant(format!(
                "score table has {} entries, expected {}",
                self.score_count.len(),
                channel_count
            )));
        }
        if self.target_channel >= channel_count {
            return Err(SimError::invariant(format!(
                "target channel {} out of range 0..{}",
                self.target_channel, channel_count
            )));
        }
        if !self.game_over && self.repetitions_remaining < 0 {
            return Err(SimError::invariant(format!(
                "{} repetitions remaining in a running game",
                self.repetitions_remaining
            )));
        }
        Ok(())
    }
}
