pub mod error;
pub mod finger;
pub mod repetition;
pub mod sample;
pub mod state;

pub use error::SimError;
pub use finger::{Finger, channel_label};
pub use repetition::RepetitionRecord;
pub use sample::{ChannelMask, MAX_CHANNELS, Sample};
pub use state::GameState;
