use super::super::World;
use rand::Rng;

impl<R: Rng> World<R> {
    /// Run every agent's own update (movement, timer, self-contained transitions).
    /// Agents do not read each other here, so order only matters for RNG draws.
    pub(in crate::world) fn step_agent_update_phase(&mut self) {
        let config = &self.config;
        let rng = &mut self.rng;
        for agent in self.agents.iter_mut() {
            agent.update(config, rng);
        }
    }
}
