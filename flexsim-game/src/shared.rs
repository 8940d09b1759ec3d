use std::sync::{Mutex, PoisonError};

use flexsim_core::Sample;

/// Single-slot buffer holding the most recent sample. Writes overwrite,
/// nothing is queued.
#[derive(Debug, Clone)]
pub struct SharedSample {
    slot: Sample,
}

impl SharedSample {
    pub fn new(channel_count: usize) -> Self {
        Self {
            slot: Sample::idle(channel_count),
        }
    }

    pub fn write(&mut self, sample: Sample) {
        self.slot = sample;
    }

    pub fn read(&self) -> Sample {
        self.slot.clone()
    }
}

/// Mutex-guarded slot for when producer and consumers live on different
/// threads. Last write wins.
#[derive(Debug)]
pub struct SyncSharedSample {
    slot: Mutex<Sample>,
}

impl SyncSharedSample {
    pub fn new(channel_count: usize) -> Self {
        Self {
            slot: Mutex::new(Sample::idle(channel_count)),
        }
    }

    pub fn write(&self, sample: Sample) {
        // A writer that panicked mid-store cannot leave a torn sample behind,
        // so a poisoned slot is still readable.
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = sample;
    }

    pub fn read(&self) -> Sample {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
