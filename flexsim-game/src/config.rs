use flexsim_core::{MAX_CHANNELS, SimError};
use serde::{Deserialize, Serialize};

/// How the next target channel is chosen after a successful repetition
#[derive(Copy, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetargetPolicy {
    /// Uniform over every channel; the same channel may come up again.
    #[default]
    Random,
    /// Next channel, wrapping around.
    Sequential,
}

/// Which rule ends the game
#[derive(Copy, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    /// A fixed number of repetitions, each on a freshly picked target.
    #[default]
    Classic,
    /// Each finger is held as the target until its score reaches the
    /// current requirement. The requirement then grows and the next finger
    /// takes over; the game ends once it passes `score_limit`.
    Progressive,
}

/// ADC width the simulated sensors are read with
#[derive(Copy, Debug, Clone, PartialEq, Eq)]
pub enum AdcResolution {
    Bits10,
    Bits12,
}

impl AdcResolution {
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            10 => Some(AdcResolution::Bits10),
            12 => Some(AdcResolution::Bits12),
            _ => None,
        }
    }
}

/// Game and simulation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub channel_count: usize,
    pub initial_repetitions: i32,

    pub max_intensity: u16,
    pub flex_threshold: u16,
    pub engaged_intensity: u16,
    pub relaxed_range: (u16, u16),
    /// An engagement fires with probability 1 / `engage_one_in` per tick
    pub engage_one_in: u32,

    pub tick_ms: u64,
    pub time_limit_ms: u64,

    pub retarget: RetargetPolicy,
    pub seed: Option<u64>,

    pub mode: GameMode,
    /// Requirement for the first target in the progressive game
    pub score_required: u32,
    pub score_step: u32,
    pub score_limit: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            channel_count: 5,
            initial_repetitions: 10,
            max_intensity: 4095,
            flex_threshold: 3000,
            engaged_intensity: 3800,
            relaxed_range: (1000, 1499),
            engage_one_in: 1000,
            tick_ms: 10,
            time_limit_ms: 200_000,
            retarget: RetargetPolicy::Random,
            seed: None,
            mode: GameMode::Classic,
            score_required: 10,
            score_step: 2,
            score_limit: 20,
        }
    }
}

impl GameConfig {
    pub fn for_resolution(resolution: AdcResolution) -> Self {
        let mut config = GameConfig::default();
        config.apply_resolution(resolution);
        config
    }

    /// Rescales every intensity setting to the given ADC width.
    pub fn apply_resolution(&mut self, resolution: AdcResolution) {
        match resolution {
            AdcResolution::Bits12 => {
                self.max_intensity = 4095;
                self.flex_threshold = 3000;
                self.engaged_intensity = 3800;
                self.relaxed_range = (1000, 1499);
            }
            AdcResolution::Bits10 => {
                self.max_intensity = 1023;
                self.flex_threshold = 512;
                self.engaged_intensity = 949;
                self.relaxed_range = (250, 374);
            }
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, SimError> {
        let config: GameConfig =
            serde_json::from_str(json).map_err(|e| SimError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Number of ticks that fit in the time limit
    pub fn tick_budget(&self) -> u64 {
        self.time_limit_ms / self.tick_ms.max(1)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if self.channel_count == 0 || self.channel_count > MAX_CHANNELS {
            return Err(SimError::config(format!(
                "channel_count must be within 1..={}, got {}",
                MAX_CHANNELS, self.channel_count
            )));
        }
        if self.initial_repetitions < 0 {
            return Err(SimError::config(format!(
                "initial_repetitions must not be negative, got {}",
                self.initial_repetitions
            )));
        }
        if self.max_intensity == 0 {
            return Err(SimError::config("max_intensity must be positive"));
        }
        if self.flex_threshold == 0 || self.flex_threshold > self.max_intensity {
            return Err(SimError::config(format!(
                "flex_threshold must be within 1..={}, got {}",
                self.max_intensity, self.flex_threshold
            )));
        }
        let (lo, hi) = self.relaxed_range;
        if lo > hi || hi > self.max_intensity {
            return Err(SimError::config(format!(
                "relaxed_range {}..={} must be ordered and within 0..={}",
                lo, hi, self.max_intensity
            )));
        }
        if self.engage_one_in == 0 {
            return Err(SimError::config("engage_one_in must be at least 1"));
        }
        if self.tick_ms == 0 {
            return Err(SimError::config("tick_ms must be at least 1"));
        }
        if self.mode == GameMode::Progressive {
            if self.score_required == 0 {
                return Err(SimError::config("score_required must be at least 1"));
            }
            if self.score_step == 0 {
                return Err(SimError::config(
                    "score_step must be at least 1 or the game never ends",
                ));
            }
        }
        Ok(())
    }
}
