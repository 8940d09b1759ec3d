use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use flexsim_core::{ChannelMask, Sample};
use rand::Rng;

use crate::config::GameConfig;

/// Simulated trigger state shared between the signal source, which asserts
/// it, and the game logic, which releases it after a repetition.
#[derive(Debug, Clone, Default)]
pub struct EngagementLatch(Arc<AtomicU8>);

impl EngagementLatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> ChannelMask {
        ChannelMask::from_bits(self.0.load(Ordering::Acquire))
    }

    pub fn engage(&self, channel: usize) {
        self.0
            .fetch_or(ChannelMask::single(channel).bits(), Ordering::AcqRel);
    }

    pub fn clear(&self) {
        self.0.store(0, Ordering::Release);
    }
}

/// Synthetic flex sensor readings, one per channel per tick
pub struct SignalSource<R: Rng> {
    pub rng: R,
    latch: EngagementLatch,
    max_intensity: u16,
    engaged_intensity: u16,
    relaxed_range: (u16, u16),
    engage_one_in: u32,
}

impl<R: Rng> SignalSource<R> {
    pub fn new(config: &GameConfig, rng: R, latch: EngagementLatch) -> Self {
        Self {
            rng,
            latch,
            max_intensity: config.max_intensity,
            engaged_intensity: config.engaged_intensity,
            relaxed_range: config.relaxed_range,
            engage_one_in: config.engage_one_in.max(1),
        }
    }

    pub fn latch(&self) -> &EngagementLatch {
        &self.latch
    }

    /// Reads every channel at `tick_ms`. May first latch a new engagement.
    pub fn generate(&mut self, channel_count: usize, tick_ms: u64) -> Sample {
        if channel_count > 0 && self.rng.random_ratio(1, self.engage_one_in) {
            let channel = self.rng.random_range(0..channel_count);
            self.latch.engage(channel);
            log::trace!("Channel {} engaged at {} ms", channel, tick_ms);
        }

        let engaged = self.latch.get();
        let values = (0..channel_count)
            .map(|channel| self.read_channel(channel, engaged))
            .collect();

        Sample {
            values,
            timestamp_ms: tick_ms,
            engaged,
        }
    }

    fn read_channel(&mut self, channel: usize, engaged: ChannelMask) -> u16 {
        let raw = if engaged.contains(channel) {
            self.engaged_intensity
        } else {
            let (lo, hi) = self.relaxed_range;
            self.rng.random_range(lo..=hi)
        };
        raw.min(self.max_intensity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn source(config: &GameConfig, seed: u64) -> SignalSource<ChaCha8Rng> {
        SignalSource::new(
            config,
            ChaCha8Rng::seed_from_u64(seed),
            EngagementLatch::new(),
        )
    }

    #[test]
    fn relaxed_channels_stay_in_range() {
        let config = GameConfig {
            engage_one_in: u32::MAX,
            ..GameConfig::default()
        };
        let mut src = source(&config, 1);
        for tick in 0..200 {
            let sample = src.generate(5, tick * 10);
            assert_eq!(sample.channel_count(), 5);
            assert_eq!(sample.timestamp_ms, tick * 10);
            for value in &sample.values {
                assert!((1000..=1499).contains(value), "{} out of range", value);
            }
        }
    }

    #[test]
    fn engagement_latches_until_cleared() {
        let config = GameConfig {
            channel_count: 1,
            engage_one_in: 1,
            ..GameConfig::default()
        };
        let mut src = source(&config, 2);
        let sample = src.generate(1, 0);
        assert!(sample.engaged.contains(0));
        assert_eq!(sample.values, vec![3800]);

        let mut quiet = source(
            &GameConfig {
                engage_one_in: u32::MAX,
                ..config.clone()
            },
            3,
        );
        quiet.latch().engage(0);
        assert_eq!(quiet.generate(1, 10).values, vec![3800]);
        assert_eq!(quiet.generate(1, 20).values, vec![3800]);
        quiet.latch().clear();
        let sample = quiet.generate(1, 30);
        assert!(sample.engaged.is_empty());
        assert!(sample.values[0] < 3000);
    }

    #[test]
    fn values_are_clamped_to_max_intensity() {
        let config = GameConfig {
            engaged_intensity: u16::MAX,
            engage_one_in: u32::MAX,
            ..GameConfig::default()
        };
        let mut src = source(&config, 4);
        src.latch().engage(2);
        let sample = src.generate(5, 0);
        assert_eq!(sample.values[2], 4095);
    }

    #[test]
    fn same_seed_same_readings() {
        let config = GameConfig {
            engage_one_in: 10,
            ..GameConfig::default()
        };
        let mut a = source(&config, 99);
        let mut b = source(&config, 99);
        for tick in 0..500 {
            assert_eq!(a.generate(5, tick), b.generate(5, tick));
        }
    }
}
