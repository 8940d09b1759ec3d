use flexsim_core::channel_label;
use flexsim_game::{DisplayBackend, FeedbackDevice, RenderDescription, Summary};

/// Text stand-in for the LCD: frames go to the log, the results screen to stdout.
#[derive(Debug, Default)]
pub struct ConsoleDisplay {
    initialized: bool,
    last: Option<RenderDescription>,
}

impl ConsoleDisplay {
    // Only the target, progress and reaction time make a frame worth a log line;
    // the intensity changes every tick.
    fn changed(&self, frame: &RenderDescription) -> bool {
        match &self.last {
            Some(last) => {
                last.target_channel != frame.target_channel
                    || last.repetitions_remaining != frame.repetitions_remaining
                    || last.last_reaction_ms != frame.last_reaction_ms
                    || last.score_required != frame.score_required
            }
            None => true,
        }
    }
}

impl DisplayBackend for ConsoleDisplay {
    fn initialize(&mut self) {
        if self.initialized {
            return;
        }
        self.initialized = true;
        log::info!("Display initialized");
    }

    fn draw(&mut self, frame: &RenderDescription) {
        let progress = if frame.score_required > 0 {
            format!("score {} needed", frame.score_required)
        } else {
            format!("{} left", frame.repetitions_remaining.max(0))
        };
        let line = format!(
            "Target {}, {}, last reaction {} ms, intensity {}",
            channel_label(frame.target_channel),
            progress,
            frame.last_reaction_ms,
            frame.target_intensity
        );
        if self.changed(frame) {
            log::debug!("{}", line);
        } else {
            log::trace!("{}", line);
        }
        self.last = Some(frame.clone());
    }

    fn show_summary(&mut self, summary: &Summary) {
        println!("\n=== RESULTS ===");
        println!("{}", summary);
    }
}

#[derive(Debug, Default)]
pub struct ConsoleFeedback {
    pulses: u64,
}

impl FeedbackDevice for ConsoleFeedback {
    fn pulse(&mut self) {
        self.pulses += 1;
        log::info!("Success feedback #{}: flash", self.pulses);
    }
}
