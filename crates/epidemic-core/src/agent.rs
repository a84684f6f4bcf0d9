use crate::config::SimConfig;
use crate::constants::{MIN_SPEED_FACTOR, PLANE_SIZE};
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    #[default]
    Susceptible,
    Infected,
    Recovered,
    Dead,
    Quarantined,
}

impl HealthState {
    /// Infected and quarantined agents both transmit.
    pub fn is_infectious(self) -> bool {
        matches!(self, HealthState::Infected | HealthState::Quarantined)
    }

    /// Display colour used by renderers for this state.
    pub fn color(self) -> &'static str {
        match self {
            HealthState::Susceptible => "blue",
            HealthState::Infected => "red",
            HealthState::Recovered => "green",
            HealthState::Dead => "black",
            HealthState::Quarantined => "orange",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Agent {
    pub position: [f64; 2],
    pub velocity: [f64; 2],
    pub state: HealthState,
    /// Frames left in the current infection episode.
    pub infection_timer: u32,
    pub is_super_spreader: bool,
    /// Fatigue-scaled fraction of `velocity` applied while infected.
    pub speed_factor: f64,
}

impl Agent {
    /// Create a susceptible agent at `position` moving with `velocity`.
    pub fn new(position: [f64; 2], velocity: [f64; 2]) -> Self {
        Self {
            position,
            velocity,
            state: HealthState::Susceptible,
            infection_timer: 0,
            is_super_spreader: false,
            speed_factor: 1.0,
        }
    }

    /// Create a susceptible agent at a uniformly random position with a random velocity.
    pub fn random<R: Rng + ?Sized>(config: &SimConfig, rng: &mut R) -> Self {
        let position = [rng.random::<f64>(), rng.random::<f64>()];
        let speed = config.initial_speed;
        let velocity = if speed > 0.0 {
            [
                rng.random_range(-speed..speed),
                rng.random_range(-speed..speed),
            ]
        } else {
            [0.0, 0.0]
        };
        Self::new(position, velocity)
    }

    /// Start a fresh infection episode. Returns `false` (and draws nothing) unless susceptible.
    pub fn infect<R: Rng + ?Sized>(&mut self, config: &SimConfig, rng: &mut R) -> bool {
        if self.state != HealthState::Susceptible {
            return false;
        }
        self.state = HealthState::Infected;
        self.infection_timer = config.recovery_time;
        self.is_super_spreader = rng.random_bool(config.super_spreader_prob);
        self.speed_factor = 1.0;
        true
    }

    /// Advance this agent by one frame: movement first, then the infection timer and
    /// the transitions it triggers.
    pub fn update<R: Rng + ?Sized>(&mut self, config: &SimConfig, rng: &mut R) {
        match self.state {
            HealthState::Dead => {}
            HealthState::Susceptible | HealthState::Recovered => self.advance(1.0),
            HealthState::Infected => {
                self.speed_factor = fatigue_speed_factor(self.infection_timer, config.recovery_time);
                self.advance(self.speed_factor);
                self.tick_timer();
                if self.infection_timer == config.quarantine_onset_timer()
                    && rng.random_bool(config.quarantine_prob)
                {
                    self.state = HealthState::Quarantined;
                    self.speed_factor = 1.0;
                }
                self.resolve_if_finished(config, rng);
            }
            HealthState::Quarantined => {
                self.drift_to_quarantine(config, rng);
                self.tick_timer();
                self.resolve_if_finished(config, rng);
            }
        }
        debug_assert!(self.position.iter().all(|c| (0.0..=PLANE_SIZE).contains(c)));
    }

    fn tick_timer(&mut self) {
        debug_assert!(
            self.infection_timer > 0,
            "infection timer decremented past zero"
        );
        self.infection_timer = self.infection_timer.saturating_sub(1);
    }

    fn resolve_if_finished<R: Rng + ?Sized>(&mut self, config: &SimConfig, rng: &mut R) {
        if self.infection_timer > 0 {
            return;
        }
        self.state = if rng.random_bool(config.death_prob) {
            HealthState::Dead
        } else {
            HealthState::Recovered
        };
        self.speed_factor = 1.0;
    }

    /// Move by the scaled velocity, reflecting off (and clamping to) the plane edges.
    fn advance(&mut self, scale: f64) {
        for axis in 0..2 {
            let next = self.position[axis] + self.velocity[axis] * scale;
            if !(0.0..=PLANE_SIZE).contains(&next) {
                self.velocity[axis] = -self.velocity[axis];
            }
            self.position[axis] = next.clamp(0.0, PLANE_SIZE);
        }
    }

    fn drift_to_quarantine<R: Rng + ?Sized>(&mut self, config: &SimConfig, rng: &mut R) {
        let dx = config.quarantine_point[0] - self.position[0];
        let dy = config.quarantine_point[1] - self.position[1];
        let dist = dx.hypot(dy);
        if dist > config.quarantine_radius && dist > 0.0 {
            let step = config.quarantine_step.min(dist);
            self.position[0] += dx / dist * step;
            self.position[1] += dy / dist * step;
        }
        if config.quarantine_jitter > 0.0 {
            let j = config.quarantine_jitter;
            self.position[0] += rng.random_range(-j..=j);
            self.position[1] += rng.random_range(-j..=j);
        }
        self.position[0] = self.position[0].clamp(0.0, PLANE_SIZE);
        self.position[1] = self.position[1].clamp(0.0, PLANE_SIZE);
    }
}

/// Speed multiplier for an infected agent with `timer` frames left of `recovery_time`.
pub fn fatigue_speed_factor(timer: u32, recovery_time: u32) -> f64 {
    let total = recovery_time as f64;
    let elapsed = total - timer as f64;
    (1.0 - elapsed / total).max(MIN_SPEED_FACTOR)
}
