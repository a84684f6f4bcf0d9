use crate::agent::{Agent, HealthState};
use crate::config::{SimConfig, SimConfigError};
use crate::constants::{MAX_EXPERIMENT_STEPS, PLANE_SIZE};
use crate::metrics::{FrameCounts, RunSummary};
use crate::rng::create_rng;
use rand::Rng;
use rand_chacha::ChaCha12Rng;
use std::{error::Error, fmt};
use tracing::{debug, trace};

mod phases;

pub use phases::contact_profile;


/// The simulation engine: owns the population, the frame counter and the RNG.
///
/// Agents are never removed, so an agent's index is stable for the whole run.
pub struct World<R = ChaCha12Rng> {
    agents: Vec<Agent>,
    config: SimConfig,
    rng: R,
    frame: usize,

    // Buffers for avoiding allocation in the infection pass
    marked_flags: Vec<bool>,
    newly_infected: Vec<usize>,
    neighbor_buffer: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorldInitError {
    Config(SimConfigError),
    AgentCountMismatch { expected: usize, actual: usize },
    InvalidAgentPosition { index: usize },
    InvalidInfectionTimer { index: usize },
}

impl fmt::Display for WorldInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorldInitError::Config(e) => write!(f, "{}", e),
            WorldInitError::AgentCountMismatch { expected, actual } => write!(
                f,
                "agents.len() ({actual}) must match num_agents ({expected})"
            ),
            WorldInitError::InvalidAgentPosition { index } => {
                write!(f, "agent {index} is positioned outside the unit plane")
            }
            WorldInitError::InvalidInfectionTimer { index } => write!(
                f,
                "agent {index} is infectious but its infection_timer is outside [1, recovery_time]"
            ),
        }
    }
}

impl From<SimConfigError> for WorldInitError {
    fn from(err: SimConfigError) -> Self {
        WorldInitError::Config(err)
    }
}

impl Error for WorldInitError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            WorldInitError::Config(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExperimentError {
    InvalidSampleEvery,
    TooManySteps { max: usize, actual: usize },
}

impl fmt::Display for ExperimentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExperimentError::InvalidSampleEvery => write!(f, "sample_every must be positive"),
            ExperimentError::TooManySteps { max, actual } => {
                write!(f, "steps ({actual}) exceed supported maximum ({max})")
            }
        }
    }
}

impl Error for ExperimentError {}

impl World<ChaCha12Rng> {
    /// Build a world whose RNG is seeded from `config.seed`.
    pub fn new(config: SimConfig) -> Result<Self, WorldInitError> {
        let rng = create_rng(config.seed);
        Self::with_rng(config, rng)
    }
}

impl<R: Rng> World<R> {
    /// Build a world with `config.num_agents` random agents, the first
    /// `config.init_infected` of which start infected.
    pub fn with_rng(config: SimConfig, mut rng: R) -> Result<Self, WorldInitError> {
        config.validate()?;
        let mut agents: Vec<Agent> = (0..config.num_agents)
            .map(|_| Agent::random(&config, &mut rng))
            .collect();
        for agent in agents.iter_mut().take(config.init_infected) {
            agent.infect(&config, &mut rng);
        }
        debug!(
            num_agents = config.num_agents,
            init_infected = config.init_infected,
            scan = ?config.infection_scan,
            "world initialized"
        );
        Ok(Self::assemble(agents, config, rng))
    }

    /// Build a world around a caller-supplied population. States are taken as
    /// given; `config.init_infected` is not applied.
    pub fn from_agents(
        agents: Vec<Agent>,
        config: SimConfig,
        rng: R,
    ) -> Result<Self, WorldInitError> {
        config.validate()?;
        if agents.len() != config.num_agents {
            return Err(WorldInitError::AgentCountMismatch {
                expected: config.num_agents,
                actual: agents.len(),
            });
        }
        for (index, agent) in agents.iter().enumerate() {
            if !agent
                .position
                .iter()
                .all(|c| c.is_finite() && (0.0..=PLANE_SIZE).contains(c))
            {
                return Err(WorldInitError::InvalidAgentPosition { index });
            }
            if agent.state.is_infectious()
                && !(1..=config.recovery_time).contains(&agent.infection_timer)
            {
                return Err(WorldInitError::InvalidInfectionTimer { index });
            }
        }
        debug!(num_agents = agents.len(), "world initialized from explicit population");
        Ok(Self::assemble(agents, config, rng))
    }

    fn assemble(agents: Vec<Agent>, config: SimConfig, rng: R) -> Self {
        let agent_count = agents.len();
        Self {
            agents,
            config,
            rng,
            frame: 0,
            marked_flags: Vec::with_capacity(agent_count),
            newly_infected: Vec::new(),
            neighbor_buffer: Vec::new(),
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Index of the last completed frame (0 before the first `step`).
    pub fn frame(&self) -> usize {
        self.frame
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent(&self, index: usize) -> Option<&Agent> {
        self.agents.get(index)
    }

    pub fn population(&self) -> usize {
        self.agents.len()
    }

    /// Per-state counts of the current population.
    pub fn counts(&self) -> FrameCounts {
        FrameCounts::tally(self.frame, &self.agents)
    }

    /// Advance the world by one frame and return the frame's counts.
    ///
    /// Phases run strictly in order: agent updates, infection scan with a
    /// batched commit, population dynamics, aggregation.
    pub fn step(&mut self) -> FrameCounts {
        self.frame = self.frame.saturating_add(1);
        self.step_agent_update_phase();
        let new_infections = self.step_infection_phase();
        self.step_population_dynamics_phase();

        let counts = self.counts();
        debug_assert_eq!(counts.state_sum(), counts.total);
        trace!(
            frame = counts.frame,
            new_infections,
            susceptible = counts.susceptible,
            infected = counts.infected,
            recovered = counts.recovered,
            dead = counts.dead,
            quarantined = counts.quarantined,
            total = counts.total,
            "frame complete"
        );
        counts
    }

    /// Step `steps` frames, sampling counts every `sample_every` frames and on
    /// the final frame.
    pub fn run_experiment(
        &mut self,
        steps: usize,
        sample_every: usize,
    ) -> Result<RunSummary, ExperimentError> {
        if sample_every == 0 {
            return Err(ExperimentError::InvalidSampleEvery);
        }
        if steps > MAX_EXPERIMENT_STEPS {
            return Err(ExperimentError::TooManySteps {
                max: MAX_EXPERIMENT_STEPS,
                actual: steps,
            });
        }

        let mut final_counts = self.counts();
        let mut peak_infectious = final_counts.infectious();
        let mut peak_frame = final_counts.frame;
        let mut samples = Vec::with_capacity(steps / sample_every + 1);
        for step in 1..=steps {
            let counts = self.step();
            if counts.infectious() > peak_infectious {
                peak_infectious = counts.infectious();
                peak_frame = counts.frame;
            }
            if step % sample_every == 0 || step == steps {
                samples.push(counts);
            }
            final_counts = counts;
        }
        debug!(
            steps,
            peak_infectious,
            peak_frame,
            dead = final_counts.dead,
            "experiment finished"
        );

        Ok(RunSummary {
            schema_version: 1,
            seed: self.config.seed,
            steps,
            sample_every,
            samples,
            final_counts,
            peak_infectious,
            peak_frame,
        })
    }

    fn susceptible_count(&self) -> usize {
        self.agents
            .iter()
            .filter(|a| a.state == HealthState::Susceptible)
            .count()
    }
}
