pub mod clock;

pub use clock::{Clock, PacedClock, TickStats, VirtualClock};
