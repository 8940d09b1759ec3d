use serde::{Deserialize, Serialize};

/// Recorded result per qualifying event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepetitionRecord {
    /// 1-based ordinal within the run
    pub repetition: u32,
    pub channel: usize,
    pub reaction_ms: u64,
    pub timestamp_ms: u64,
}
