use flexsim_core::{GameState, Sample, SimError};
use serde::Serialize;

use crate::summary::Summary;

/// What the screen should show for one frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderDescription {
    pub target_channel: usize,
    pub repetitions_remaining: i32,
    pub last_reaction_ms: u64,
    pub target_intensity: u16,
    /// Non-zero only in the progressive game
    pub score_required: u32,
}

/// Screen the game is drawn on
pub trait DisplayBackend {
    /// Called before the first frame. Must tolerate repeated calls.
    fn initialize(&mut self);
    fn draw(&mut self, frame: &RenderDescription);
    /// Final results screen
    fn show_summary(&mut self, _summary: &Summary) {}
}

/// Visual or haptic success signal. Fire and forget.
pub trait FeedbackDevice {
    fn pulse(&mut self);
}

/// Backend that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct Headless;

impl DisplayBackend for Headless {
    fn initialize(&mut self) {}
    fn draw(&mut self, _frame: &RenderDescription) {}
}

impl FeedbackDevice for Headless {
    fn pulse(&mut self) {}
}

/// Presentation task: turns state and sample into a frame and fires the
/// success pulse.
pub struct PresentationSink<D: DisplayBackend, F: FeedbackDevice> {
    pub display: D,
    pub feedback: F,
    initialized: bool,
    pulses: u64,
}

impl<D: DisplayBackend, F: FeedbackDevice> PresentationSink<D, F> {
    pub fn new(display: D, feedback: F) -> Self {
        Self {
            display,
            feedback,
            initialized: false,
            pulses: 0,
        }
    }

    pub fn initialize_display(&mut self) {
        if !self.initialized {
            self.display.initialize();
            self.initialized = true;
        }
    }

    pub fn pulses(&self) -> u64 {
        self.pulses
    }

    pub fn present(
        &mut self,
        state: &mut GameState,
        sample: &Sample,
    ) -> Result<RenderDescription, SimError> {
        self.initialize_display();

        let target_intensity = sample.intensity(state.target_channel).ok_or_else(|| {
            SimError::invariant(format!(
                "target channel {} missing from {}-channel sample",
                state.target_channel,
                sample.channel_count()
            ))
        })?;

        let frame = RenderDescription {
            target_channel: state.target_channel,
            repetitions_remaining: state.repetitions_remaining,
            last_reaction_ms: state.last_reaction_ms,
            target_intensity,
            score_required: state.score_required,
        };
        self.display.draw(&frame);

        if state.feedback_pending {
            self.feedback.pulse();
            state.feedback_pending = false;
            self.pulses += 1;
        }

        Ok(frame)
    }

    pub fn show_summary(&mut self, summary: &Summary) {
        self.initialize_display();
        self.display.show_summary(summary);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flexsim_core::ChannelMask;

    #[derive(Default)]
    struct Recorder {
        inits: usize,
        frames: Vec<RenderDescription>,
        pulses: usize,
    }

    impl DisplayBackend for Recorder {
        fn initialize(&mut self) {
            self.inits += 1;
        }
        fn draw(&mut self, frame: &RenderDescription) {
            self.frames.push(frame.clone());
        }
    }

    impl FeedbackDevice for Recorder {
        fn pulse(&mut self) {
            self.pulses += 1;
        }
    }

    fn sample() -> Sample {
        Sample {
            values: vec![100, 200, 300, 400, 500],
            timestamp_ms: 40,
            engaged: ChannelMask::EMPTY,
        }
    }

    #[test]
    fn frame_selects_target_channel() {
        let mut sink = PresentationSink::new(Recorder::default(), Recorder::default());
        let mut state = GameState::new(5, 7);
        state.target_channel = 3;
        state.last_reaction_ms = 120;

        let frame = sink.present(&mut state, &sample()).unwrap();

        assert_eq!(
            frame,
            RenderDescription {
                target_channel: 3,
                repetitions_remaining: 7,
                last_reaction_ms: 120,
                target_intensity: 400,
                score_required: 0,
            }
        );
        assert_eq!(sink.display.frames, vec![frame]);
    }

    #[test]
    fn display_initialized_once() {
        let mut sink = PresentationSink::new(Recorder::default(), Recorder::default());
        let mut state = GameState::new(5, 7);
        sink.initialize_display();
        for _ in 0..3 {
            sink.present(&mut state, &sample()).unwrap();
        }
        assert_eq!(sink.display.inits, 1);
    }

    #[test]
    fn feedback_consumed_exactly_once() {
        let mut sink = PresentationSink::new(Recorder::default(), Recorder::default());
        let mut state = GameState::new(5, 7);

        sink.present(&mut state, &sample()).unwrap();
        assert_eq!(sink.feedback.pulses, 0);

        state.feedback_pending = true;
        sink.present(&mut state, &sample()).unwrap();
        assert!(!state.feedback_pending);
        assert_eq!(sink.feedback.pulses, 1);

        sink.present(&mut state, &sample()).unwrap();
        assert_eq!(sink.feedback.pulses, 1);
        assert_eq!(sink.pulses(), 1);
    }

    #[test]
    fn missing_target_channel_is_rejected() {
        let mut sink = PresentationSink::new(Headless, Headless);
        let mut state = GameState::new(5, 7);
        state.target_channel = 4;
        state.feedback_pending = true;
        let err = sink.present(&mut state, &Sample::idle(2)).unwrap_err();
        assert!(matches!(err, SimError::InvariantViolation(_)));
        assert!(state.feedback_pending);
    }
}
