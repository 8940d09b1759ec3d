//! Three-task execution: acquisition, processing and presentation each run
//! on their own thread, the way the firmware split them across RTOS tasks.
//!
//! Every tick is a rendezvous chain
//! acquisition -> processing -> presentation -> acquisition, so exactly one
//! task touches the sample slot or the game state at any time and every
//! lock is taken uncontended. The presentation task decides after each tick
//! whether to continue; when it says stop, the acquisition task returns,
//! which closes the channels and lets the other two drain out.

use std::sync::mpsc::sync_channel;
use std::sync::{Mutex, PoisonError};
use std::thread;

use flexsim_core::{GameState, SimError};
use flexsim_timing::Clock;
use rand::Rng;

use crate::driver::{Driver, RunOutcome, RunReport, verdict};
use crate::logic::StepOutcome;
use crate::present::{DisplayBackend, FeedbackDevice};
use crate::shared::SyncSharedSample;

enum Control {
    Continue,
    Stop(RunOutcome),
}

impl<C, R, D, F> Driver<C, R, D, F>
where
    C: Clock + Send,
    R: Rng + Send,
    D: DisplayBackend + Send,
    F: FeedbackDevice + Send,
{
    /// Same contract as `run`, with each component on its own thread.
    /// Given the same seeds it produces the same report.
    pub fn run_tasks(&mut self, state: GameState, max_ticks: u64) -> Result<RunReport, SimError> {
        let channels = self.config.channel_count;
        state.check(channels)?;

        let start_ms = self.clock.now_ms();
        let pulses_before = self.sink.pulses();
        self.logic.begin_run();
        self.sink.initialize_display();

        if let Some(outcome) = verdict(&state, 0, max_ticks) {
            return Ok(RunReport {
                outcome,
                state,
                ticks: 0,
                elapsed_ms: 0,
                records: Vec::new(),
                pulses: 0,
            });
        }

        log::info!(
            "Starting tasks: {} channels, {} repetitions, ceiling {} ticks",
            channels,
            state.repetitions_remaining,
            max_ticks
        );

        let Driver {
            clock,
            source,
            logic,
            sink,
            ..
        } = &mut *self;

        let slot_cell = SyncSharedSample::new(channels);
        let state_cell = Mutex::new(state);
        let slot = &slot_cell;
        let shared = &state_cell;

        let (sample_tx, sample_rx) = sync_channel::<u64>(0);
        let (frame_tx, frame_rx) = sync_channel::<u64>(0);
        let (control_tx, control_rx) = sync_channel::<Control>(0);

        let (acquired, processed, presented) = thread::scope(|s| {
            let acquisition = s.spawn(move || {
                let mut ticks = 0u64;
                loop {
                    let now_ms = clock.now_ms();
                    slot.write(source.generate(channels, now_ms));
                    if sample_tx.send(ticks).is_err() {
                        return (ticks, None);
                    }
                    let control = match control_rx.recv() {
                        Ok(control) => control,
                        Err(_) => return (ticks, None),
                    };
                    clock.advance();
                    ticks += 1;
                    if let Control::Stop(outcome) = control {
                        log::debug!("Acquisition task stopping after {} ticks", ticks);
                        return (ticks, Some(outcome));
                    }
                }
            });

            let processing = s.spawn(move || -> Result<_, SimError> {
                let mut records = Vec::new();
                for tick in sample_rx.iter() {
                    let sample = slot.read();
                    {
                        let mut state = shared.lock().unwrap_or_else(PoisonError::into_inner);
                        if let StepOutcome::Repetition(record) = logic.step(&sample, &mut state)? {
                            records.push(record);
                        }
                    }
                    if frame_tx.send(tick).is_err() {
                        break;
                    }
                }
                Ok(records)
            });

            let presentation = s.spawn(move || -> Result<(), SimError> {
                for tick in frame_rx.iter() {
                    let sample = slot.read();
                    let control = {
                        let mut state = shared.lock().unwrap_or_else(PoisonError::into_inner);
                        sink.present(&mut state, &sample)?;
                        match verdict(&state, tick + 1, max_ticks) {
                            Some(outcome) => Control::Stop(outcome),
                            None => Control::Continue,
                        }
                    };
                    if control_tx.send(control).is_err() {
                        break;
                    }
                }
                Ok(())
            });

            (
                acquisition.join(),
                processing.join(),
                presentation.join(),
            )
        });

        let (ticks, outcome) = acquired.map_err(|_| SimError::TaskPanicked("acquisition"))?;
        let records = processed.map_err(|_| SimError::TaskPanicked("processing"))??;
        presented.map_err(|_| SimError::TaskPanicked("presentation"))??;
        let outcome = outcome
            .ok_or_else(|| SimError::invariant("acquisition task stopped without a verdict"))?;

        let state = state_cell
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);

        Ok(RunReport {
            outcome,
            state,
            ticks,
            elapsed_ms: self.clock.now_ms() - start_ms,
            records,
            pulses: self.sink.pulses() - pulses_before,
        })
    }
}
