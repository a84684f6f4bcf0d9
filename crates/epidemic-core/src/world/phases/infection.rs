use super::super::World;
use crate::agent::{Agent, HealthState};
use crate::config::{InfectionScan, SimConfig};
use crate::spatial;
use rand::Rng;

/// Contact radius and per-contact transmission probability of an infectious agent.
///
/// Infectiousness decays linearly with the remaining timer; the probability is
/// clamped so amplified super-spreader values stay a valid Bernoulli parameter.
pub fn contact_profile(source: &Agent, config: &SimConfig) -> (f64, f64) {
    let (radius_mult, prob_mult) = if source.is_super_spreader {
        (
            config.super_spreader_radius_mult,
            config.super_spreader_prob_mult,
        )
    } else {
        (1.0, 1.0)
    };
    let intensity = source.infection_timer as f64 / config.recovery_time as f64;
    let prob = (config.infection_prob * prob_mult * intensity).clamp(0.0, 1.0);
    (config.infection_radius * radius_mult, prob)
}

impl<R: Rng> World<R> {
    /// Scan infectious sources against the susceptible population and commit the
    /// resulting infections as one batch. Returns the number of new infections.
    ///
    /// Decisions read the post-update, pre-infection states: an agent marked in
    /// this pass is neither a source nor re-tested against later sources.
    pub(in crate::world) fn step_infection_phase(&mut self) -> usize {
        self.newly_infected.clear();
        self.marked_flags.clear();
        self.marked_flags.resize(self.agents.len(), false);

        let has_source = self.agents.iter().any(|a| a.state.is_infectious());
        if !has_source {
            return 0;
        }

        match self.config.infection_scan {
            InfectionScan::BruteForce => self.scan_brute_force(),
            InfectionScan::SpatialIndex => self.scan_spatial_index(),
        }

        let config = &self.config;
        let rng = &mut self.rng;
        let agents = &mut self.agents;
        for &index in &self.newly_infected {
            debug_assert_eq!(agents[index].state, HealthState::Susceptible);
            agents[index].infect(config, rng);
        }
        self.newly_infected.len()
    }

    fn scan_brute_force(&mut self) {
        let agents = &self.agents;
        let config = &self.config;
        let rng = &mut self.rng;
        let flags = &mut self.marked_flags;
        let marked = &mut self.newly_infected;

        for source in agents.iter().filter(|a| a.state.is_infectious()) {
            let (radius, prob) = contact_profile(source, config);
            let r_sq = radius * radius;
            for (index, target) in agents.iter().enumerate() {
                if target.state != HealthState::Susceptible || flags[index] {
                    continue;
                }
                if spatial::distance_sq(source.position, target.position) < r_sq
                    && rng.random_bool(prob)
                {
                    flags[index] = true;
                    marked.push(index);
                }
            }
        }
    }

    /// Same draws as `scan_brute_force`, in the same order, with candidates
    /// pulled from an R*-tree of susceptible positions.
    fn scan_spatial_index(&mut self) {
        let tree = spatial::build_susceptible_index(&self.agents);
        if tree.size() == 0 {
            return;
        }
        let agents = &self.agents;
        let config = &self.config;
        let rng = &mut self.rng;
        let flags = &mut self.marked_flags;
        let marked = &mut self.newly_infected;
        let candidates = &mut self.neighbor_buffer;

        for source in agents.iter().filter(|a| a.state.is_infectious()) {
            let (radius, prob) = contact_profile(source, config);
            spatial::indices_within(&tree, source.position, radius, candidates);
            for &index in candidates.iter() {
                if flags[index] {
                    continue;
                }
                if rng.random_bool(prob) {
                    flags[index] = true;
                    marked.push(index);
                }
            }
        }
    }
}
