use std::fmt;
use std::io::Write;

use flexsim_core::{RepetitionRecord, channel_label};
use serde::Serialize;

use crate::driver::{RunOutcome, RunReport};

/// End-of-run results: what the final screen shows and what gets exported
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub outcome: RunOutcome,
    pub seed: Option<u64>,
    pub ticks: u64,
    pub elapsed_ms: u64,
    pub repetitions_completed: u32,
    pub repetitions_remaining: i32,
    pub scores: Vec<u32>,
    pub reaction_mean_ms: Option<f64>,
    pub reaction_min_ms: Option<u64>,
    pub reaction_max_ms: Option<u64>,
    pub pulses: u64,
    pub repetitions: Vec<RepetitionRecord>,
}

impl Summary {
    pub fn from_report(report: &RunReport, seed: Option<u64>) -> Self {
        let times: Vec<u64> = report.records.iter().map(|r| r.reaction_ms).collect();
        let reaction_mean_ms = if times.is_empty() {
            None
        } else {
            Some(times.iter().sum::<u64>() as f64 / times.len() as f64)
        };

        Summary {
            outcome: report.outcome,
            seed,
            ticks: report.ticks,
            elapsed_ms: report.elapsed_ms,
            repetitions_completed: report.records.len() as u32,
            repetitions_remaining: report.state.repetitions_remaining,
            scores: report.state.score_count.clone(),
            reaction_mean_ms,
            reaction_min_ms: times.iter().min().copied(),
            reaction_max_ms: times.iter().max().copied(),
            pulses: report.pulses,
            repetitions: report.records.clone(),
        }
    }

    pub fn write_json<W: Write>(&self, writer: W) -> serde_json::Result<()> {
        serde_json::to_writer_pretty(writer, self)
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = match self.outcome {
            RunOutcome::Completed => "completed",
            RunOutcome::AbortedByCeiling => "aborted by tick ceiling",
        };
        writeln!(f, "Game {} after {} ticks ({} ms)", outcome, self.ticks, self.elapsed_ms)?;
        writeln!(
            f,
            "Repetitions: {} done, {} remaining, {} feedback pulses",
            self.repetitions_completed,
            self.repetitions_remaining.max(0),
            self.pulses
        )?;
        let scores: Vec<String> = self
            .scores
            .iter()
            .enumerate()
            .map(|(channel, score)| format!("{} {}", channel_label(channel), score))
            .collect();
        writeln!(f, "Scores: {}", scores.join(", "))?;
        match (self.reaction_mean_ms, self.reaction_min_ms, self.reaction_max_ms) {
            (Some(mean), Some(min), Some(max)) => write!(
                f,
                "Reaction times: mean {:.1} ms, min {} ms, max {} ms",
                mean, min, max
            )?,
            _ => write!(f, "Reaction times: none recorded")?,
        }
        if let Some(seed) = self.seed {
            write!(f, "\nSeed: {}", seed)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flexsim_core::GameState;

    fn report() -> RunReport {
        let mut state = GameState::new(3, 1);
        state.score_count = vec![1, 0, 1];
        RunReport {
            outcome: RunOutcome::Completed,
            state,
            ticks: 42,
            elapsed_ms: 420,
            records: vec![
                RepetitionRecord {
                    repetition: 1,
                    channel: 0,
                    reaction_ms: 100,
                    timestamp_ms: 100,
                },
                RepetitionRecord {
                    repetition: 2,
                    channel: 2,
                    reaction_ms: 250,
                    timestamp_ms: 350,
                },
            ],
            pulses: 2,
        }
    }

    #[test]
    fn reaction_statistics() {
        let summary = Summary::from_report(&report(), Some(5));
        assert_eq!(summary.repetitions_completed, 2);
        assert_eq!(summary.reaction_mean_ms, Some(175.0));
        assert_eq!(summary.reaction_min_ms, Some(100));
        assert_eq!(summary.reaction_max_ms, Some(250));
        assert_eq!(summary.scores, vec![1, 0, 1]);
    }

    #[test]
    fn no_repetitions_no_statistics() {
        let mut report = report();
        report.records.clear();
        report.outcome = RunOutcome::AbortedByCeiling;
        let summary = Summary::from_report(&report, None);
        assert_eq!(summary.reaction_mean_ms, None);
        let text = summary.to_string();
        assert!(text.contains("aborted by tick ceiling"));
        assert!(text.contains("none recorded"));
        assert!(!text.contains("Seed"));
    }

    #[test]
    fn text_and_json_forms() {
        let summary = Summary::from_report(&report(), Some(5));
        let text = summary.to_string();
        assert!(text.contains("Game completed after 42 ticks"));
        assert!(text.contains("thumb 1, index 0, middle 1"));
        assert!(text.contains("Seed: 5"));

        let mut out = Vec::new();
        summary.write_json(&mut out).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["outcome"], "completed");
        assert_eq!(json["repetitions"][1]["channel"], 2);
        assert_eq!(json["reaction_max_ms"], 250);
    }
}
