use crate::constants::PLANE_SIZE;
use serde::{Deserialize, Serialize};

/// How the infection pass finds susceptible agents near each source.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InfectionScan {
    /// Every source is tested against every susceptible agent.
    BruteForce,
    /// Susceptible agents are bulk-loaded into an R*-tree once per frame.
    #[default]
    SpatialIndex,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    /// Deterministic seed for reproducible simulation runs.
    pub seed: u64,
    /// Number of agents created at construction.
    pub num_agents: usize,
    /// Number of initial agents (taken from the front of the population) that start infected.
    pub init_infected: usize,
    /// Upper bound of each initial velocity component, drawn from `[-initial_speed, initial_speed)`.
    pub initial_speed: f64,
    /// Base contact radius of an ordinary infectious agent.
    pub infection_radius: f64,
    /// Base per-contact, per-frame transmission probability.
    pub infection_prob: f64,
    /// Probability that a new infection is a super-spreader episode.
    pub super_spreader_prob: f64,
    /// Radius multiplier applied to super-spreaders.
    pub super_spreader_radius_mult: f64,
    /// Transmission probability multiplier applied to super-spreaders.
    pub super_spreader_prob_mult: f64,
    /// Length of an infection episode in frames.
    pub recovery_time: u32,
    /// Probability that an episode ends in death rather than recovery.
    pub death_prob: f64,
    /// Probability of entering quarantine at the onset frame.
    pub quarantine_prob: f64,
    /// Frames after infection at which the quarantine trial happens.
    pub quarantine_onset_offset: u32,
    /// Point quarantined agents drift toward.
    pub quarantine_point: [f64; 2],
    /// Distance from `quarantine_point` inside which quarantined agents stop drifting.
    pub quarantine_radius: f64,
    /// Constant per-frame drift length toward the quarantine point.
    pub quarantine_step: f64,
    /// Per-axis positional jitter applied to quarantined agents.
    pub quarantine_jitter: f64,
    /// Period (in frames) of ambient seeding (0 = disabled).
    pub new_infection_every: usize,
    /// Period (in frames) of new infected arrivals (0 = disabled).
    pub new_agent_every: usize,
    /// Population size at which arrivals stop (`None` = unbounded).
    pub population_cap: Option<usize>,
    /// Neighbor search strategy for the infection pass.
    pub infection_scan: InfectionScan,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            num_agents: 200,
            init_infected: 5,
            initial_speed: 0.01,
            infection_radius: 0.03,
            infection_prob: 0.2,
            super_spreader_prob: 0.05,
            super_spreader_radius_mult: 2.0,
            super_spreader_prob_mult: 1.5,
            recovery_time: 300,
            death_prob: 0.02,
            quarantine_prob: 0.3,
            quarantine_onset_offset: 5,
            quarantine_point: [0.9, 0.9],
            quarantine_radius: 0.05,
            quarantine_step: 0.005,
            quarantine_jitter: 0.002,
            new_infection_every: 50,
            new_agent_every: 100,
            population_cap: Some(400),
            infection_scan: InfectionScan::SpatialIndex,
        }
    }
}

macro_rules! define_sim_config_error {
    (
        $(
            $variant:ident $( { $($field:ident : $type:ty),* } )? => $fmt:literal $(, $arg:expr)*
        );* $(;)?
    ) => {
        #[derive(Debug, Clone, PartialEq)]
        pub enum SimConfigError {
            $(
                $variant $( { $($field : $type),* } )?,
            )*
        }

        impl std::fmt::Display for SimConfigError {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        Self::$variant $( { $($field),* } )? => write!(f, $fmt $(, $arg)*),
                    )*
                }
            }
        }
    };
}

define_sim_config_error! {
    InitInfectedExceedsPopulation { init_infected: usize, num_agents: usize } => "init_infected ({init_infected}) exceeds num_agents ({num_agents})";
    TooManyAgents { max: usize, actual: usize } => "Too many agents: {} > max {}", actual, max;
    PopulationCapTooLarge { max: usize, actual: usize } => "population_cap ({actual}) exceeds supported maximum ({max})";
    InvalidInitialSpeed => "initial_speed must be finite and within [0,1]";
    InvalidInfectionRadius => "infection_radius must be finite and non-negative";
    InvalidInfectionProb => "infection_prob must be finite and within [0,1]";
    InvalidSuperSpreaderProb => "super_spreader_prob must be finite and within [0,1]";
    InvalidSuperSpreaderRadiusMult => "super_spreader_radius_mult must be finite and non-negative";
    InvalidSuperSpreaderProbMult => "super_spreader_prob_mult must be finite and non-negative";
    InvalidRecoveryTime => "recovery_time must be positive";
    InvalidDeathProb => "death_prob must be finite and within [0,1]";
    InvalidQuarantineProb => "quarantine_prob must be finite and within [0,1]";
    InvalidQuarantineOnsetOffset { recovery_time: u32 } => "quarantine_onset_offset must be within [1,{recovery_time}]";
    InvalidQuarantinePoint => "quarantine_point coordinates must be finite and within [0,1]";
    InvalidQuarantineRadius => "quarantine_radius must be finite and non-negative";
    InvalidQuarantineStep => "quarantine_step must be finite and within [0,1]";
    InvalidQuarantineJitter => "quarantine_jitter must be finite and within [0,1]";
}

impl std::error::Error for SimConfigError {}

fn is_probability(p: f64) -> bool {
    p.is_finite() && (0.0..=1.0).contains(&p)
}

fn is_non_negative(x: f64) -> bool {
    x.is_finite() && x >= 0.0
}

/// Per-frame displacements larger than the plane are meaningless and can
/// overflow sampling ranges.
fn is_plane_distance(x: f64) -> bool {
    x.is_finite() && (0.0..=PLANE_SIZE).contains(&x)
}

impl SimConfig {
    pub const MAX_TOTAL_AGENTS: usize = crate::constants::MAX_TOTAL_AGENTS;

    pub fn validate(&self) -> Result<(), SimConfigError> {
        self.validate_population()?;
        self.validate_transmission()?;
        self.validate_course()?;
        self.validate_quarantine()?;
        Ok(())
    }

    fn validate_population(&self) -> Result<(), SimConfigError> {
        if self.num_agents > Self::MAX_TOTAL_AGENTS {
            return Err(SimConfigError::TooManyAgents {
                max: Self::MAX_TOTAL_AGENTS,
                actual: self.num_agents,
            });
        }
        if self.init_infected > self.num_agents {
            return Err(SimConfigError::InitInfectedExceedsPopulation {
                init_infected: self.init_infected,
                num_agents: self.num_agents,
            });
        }
        if let Some(cap) = self.population_cap {
            if cap > Self::MAX_TOTAL_AGENTS {
                return Err(SimConfigError::PopulationCapTooLarge {
                    max: Self::MAX_TOTAL_AGENTS,
                    actual: cap,
                });
            }
        }
        if !(is_non_negative(self.initial_speed) && self.initial_speed <= 1.0) {
            return Err(SimConfigError::InvalidInitialSpeed);
        }
        Ok(())
    }

    fn validate_transmission(&self) -> Result<(), SimConfigError> {
        if !is_non_negative(self.infection_radius) {
            return Err(SimConfigError::InvalidInfectionRadius);
        }
        if !is_probability(self.infection_prob) {
            return Err(SimConfigError::InvalidInfectionProb);
        }
        if !is_probability(self.super_spreader_prob) {
            return Err(SimConfigError::InvalidSuperSpreaderProb);
        }
        if !is_non_negative(self.super_spreader_radius_mult) {
            return Err(SimConfigError::InvalidSuperSpreaderRadiusMult);
        }
        if !is_non_negative(self.super_spreader_prob_mult) {
            return Err(SimConfigError::InvalidSuperSpreaderProbMult);
        }
        Ok(())
    }

    fn validate_course(&self) -> Result<(), SimConfigError> {
        if self.recovery_time == 0 {
            return Err(SimConfigError::InvalidRecoveryTime);
        }
        if !is_probability(self.death_prob) {
            return Err(SimConfigError::InvalidDeathProb);
        }
        Ok(())
    }

    fn validate_quarantine(&self) -> Result<(), SimConfigError> {
        if !is_probability(self.quarantine_prob) {
            return Err(SimConfigError::InvalidQuarantineProb);
        }
        if self.quarantine_onset_offset == 0 || self.quarantine_onset_offset > self.recovery_time {
            return Err(SimConfigError::InvalidQuarantineOnsetOffset {
                recovery_time: self.recovery_time,
            });
        }
        if !self.quarantine_point.iter().all(|&c| is_probability(c)) {
            return Err(SimConfigError::InvalidQuarantinePoint);
        }
        if !is_non_negative(self.quarantine_radius) {
            return Err(SimConfigError::InvalidQuarantineRadius);
        }
        if !is_plane_distance(self.quarantine_step) {
            return Err(SimConfigError::InvalidQuarantineStep);
        }
        if !is_plane_distance(self.quarantine_jitter) {
            return Err(SimConfigError::InvalidQuarantineJitter);
        }
        Ok(())
    }

    /// Timer value at which an infected agent rolls for quarantine.
    pub fn quarantine_onset_timer(&self) -> u32 {
        self.recovery_time.saturating_sub(self.quarantine_onset_offset)
    }
}
