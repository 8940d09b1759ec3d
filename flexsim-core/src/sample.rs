use serde::{Deserialize, Serialize};

/// Upper bound on channels; the engagement mask is one byte wide.
pub const MAX_CHANNELS: usize = 8;

/// Bitmask of channels whose simulated trigger is asserted
#[derive(Copy, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMask(u8);

impl ChannelMask {
    pub const EMPTY: ChannelMask = ChannelMask(0);

    pub const fn from_bits(bits: u8) -> Self {
        ChannelMask(bits)
    }

    /// Mask with only `channel` set. Channels past `MAX_CHANNELS` give an empty mask.
    pub fn single(channel: usize) -> Self {
        if channel < MAX_CHANNELS {
            ChannelMask(1 << channel)
        } else {
            ChannelMask::EMPTY
        }
    }

    pub const fn bits(&self) -> u8 {
        self.0
    }

    pub fn contains(&self, channel: usize) -> bool {
        channel < MAX_CHANNELS && self.0 & (1 << channel) != 0
    }

    pub fn insert(&mut self, channel: usize) {
        self.0 |= ChannelMask::single(channel).0;
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

/// One reading of every channel, taken at a single tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    pub values: Vec<u16>,
    pub timestamp_ms: u64,
    pub engaged: ChannelMask,
}

impl Sample {
    /// All-zero reading at t=0, the contents of a slot nobody has written yet.
    pub fn idle(channel_count: usize) -> Self {
        Self {
            values: vec![0; channel_count],
            timestamp_ms: 0,
            engaged: ChannelMask::EMPTY,
        }
    }

    pub fn channel_count(&self) -> usize {
        self.values.len()
    }

    pub fn intensity(&self, channel: usize) -> Option<u16> {
        self.values.get(channel).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_tracks_inserted_channels() {
        let mut mask = ChannelMask::EMPTY;
        assert!(mask.is_empty());
        mask.insert(2);
        mask.insert(4);
        assert!(mask.contains(2));
        assert!(mask.contains(4));
        assert!(!mask.contains(0));
        assert_eq!(mask.bits(), 0b1_0100);
    }

    #[test]
    fn out_of_range_channels_are_ignored() {
        let mut mask = ChannelMask::single(MAX_CHANNELS);
        assert!(mask.is_empty());
        mask.insert(42);
        assert!(mask.is_empty());
        assert!(!mask.contains(42));
    }

    #[test]
    fn idle_sample_is_zeroed() {
        let sample = Sample::idle(5);
        assert_eq!(sample.channel_count(), 5);
        assert_eq!(sample.intensity(4), Some(0));
        assert_eq!(sample.intensity(5), None);
        assert_eq!(sample.timestamp_ms, 0);
    }
}
