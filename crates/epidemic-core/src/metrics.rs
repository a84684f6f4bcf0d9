use crate::agent::{Agent, HealthState};
use serde::{Deserialize, Serialize};

/// Aggregate population counts at the end of one frame.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FrameCounts {
    pub frame: usize,
    pub susceptible: usize,
    pub infected: usize,
    pub recovered: usize,
    pub dead: usize,
    pub quarantined: usize,
    pub total: usize,
}

impl FrameCounts {
    /// Tally `agents` by health state.
    pub fn tally(frame: usize, agents: &[Agent]) -> Self {
        let mut counts = FrameCounts {
            frame,
            total: agents.len(),
            ..FrameCounts::default()
        };
        for agent in agents {
            match agent.state {
                HealthState::Susceptible => counts.susceptible += 1,
                HealthState::Infected => counts.infected += 1,
                HealthState::Recovered => counts.recovered += 1,
                HealthState::Dead => counts.dead += 1,
                HealthState::Quarantined => counts.quarantined += 1,
            }
        }
        counts
    }

    pub fn count(&self, state: HealthState) -> usize {
        match state {
            HealthState::Susceptible => self.susceptible,
            HealthState::Infected => self.infected,
            HealthState::Recovered => self.recovered,
            HealthState::Dead => self.dead,
            HealthState::Quarantined => self.quarantined,
        }
    }

    /// Agents currently able to transmit.
    pub fn infectious(&self) -> usize {
        self.infected + self.quarantined
    }

    pub fn state_sum(&self) -> usize {
        self.susceptible + self.infected + self.recovered + self.dead + self.quarantined
    }
}

/// Caller-owned time series of per-frame counts.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct History {
    frames: Vec<FrameCounts>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            frames: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, counts: FrameCounts) {
        debug_assert!(
            self.frames.last().map_or(true, |last| last.frame < counts.frame),
            "history frames must be strictly increasing"
        );
        self.frames.push(counts);
    }

    pub fn frames(&self) -> &[FrameCounts] {
        &self.frames
    }

    pub fn last(&self) -> Option<&FrameCounts> {
        self.frames.last()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frame with the largest infectious count (earliest on ties).
    pub fn peak_infected(&self) -> Option<&FrameCounts> {
        self.frames.iter().reduce(|best, c| {
            if c.infectious() > best.infectious() {
                c
            } else {
                best
            }
        })
    }

    /// `(frame, susceptible, infected, recovered, dead, quarantined)` rows for exporters.
    pub fn rows(&self) -> impl Iterator<Item = (usize, usize, usize, usize, usize, usize)> + '_ {
        self.frames.iter().map(|c| {
            (
                c.frame,
                c.susceptible,
                c.infected,
                c.recovered,
                c.dead,
                c.quarantined,
            )
        })
    }
}

fn default_schema_version() -> u32 {
    1
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunSummary {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub seed: u64,
    pub steps: usize,
    pub sample_every: usize,
    pub samples: Vec<FrameCounts>,
    pub final_counts: FrameCounts,
    /// Largest infected + quarantined count seen on any frame.
    pub peak_infectious: usize,
    pub peak_frame: usize,
}
