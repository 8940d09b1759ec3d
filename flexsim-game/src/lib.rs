pub mod config;
pub mod driver;
pub mod logic;
pub mod present;
pub mod shared;
pub mod signal;
pub mod summary;
pub mod tasks;

pub use config::{AdcResolution, GameConfig, GameMode, RetargetPolicy};
pub use driver::{Driver, RunOutcome, RunReport};
pub use logic::{GameLogic, StepOutcome};
pub use present::{DisplayBackend, FeedbackDevice, Headless, PresentationSink, RenderDescription};
pub use shared::{SharedSample, SyncSharedSample};
pub use signal::{EngagementLatch, SignalSource};
pub use summary::Summary;
