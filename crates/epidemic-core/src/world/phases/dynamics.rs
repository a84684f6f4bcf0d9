use super::super::World;
use crate::agent::{Agent, HealthState};
use crate::config::SimConfig;
use rand::Rng;
use tracing::debug;

fn period_elapsed(frame: usize, period: usize) -> bool {
    period > 0 && frame % period == 0
}

impl<R: Rng> World<R> {
    /// Apply the frame-gated ambient seeding and arrival effects.
    pub(in crate::world) fn step_population_dynamics_phase(&mut self) {
        if period_elapsed(self.frame, self.config.new_infection_every) {
            self.seed_ambient_infection();
        }
        if period_elapsed(self.frame, self.config.new_agent_every) {
            self.spawn_infected_arrival();
        }
    }

    /// Infect one uniformly chosen susceptible agent. Returns its index.
    pub(in crate::world) fn seed_ambient_infection(&mut self) -> Option<usize> {
        let susceptible = self.susceptible_count();
        if susceptible == 0 {
            return None;
        }
        let pick = self.rng.random_range(0..susceptible);
        let index = self
            .agents
            .iter()
            .enumerate()
            .filter(|(_, a)| a.state == HealthState::Susceptible)
            .nth(pick)
            .map(|(index, _)| index)?;
        self.agents[index].infect(&self.config, &mut self.rng);
        debug!(frame = self.frame, index, "ambient infection seeded");
        Some(index)
    }

    /// Append one freshly infected agent unless the population cap (or the
    /// hard `MAX_TOTAL_AGENTS` ceiling) is reached. Returns the new agent's index.
    pub(in crate::world) fn spawn_infected_arrival(&mut self) -> Option<usize> {
        let population = self.agents.len();
        if self
            .config
            .population_cap
            .is_some_and(|cap| population >= cap)
        {
            return None;
        }
        if population >= SimConfig::MAX_TOTAL_AGENTS {
            debug!(
                frame = self.frame,
                population,
                max = SimConfig::MAX_TOTAL_AGENTS,
                "arrival blocked by agent ceiling"
            );
            return None;
        }
        let mut agent = Agent::random(&self.config, &mut self.rng);
        agent.infect(&self.config, &mut self.rng);
        let index = self.agents.len();
        self.agents.push(agent);
        debug!(
            frame = self.frame,
            index,
            population = self.agents.len(),
            "infected agent arrived"
        );
        Some(index)
    }
}
