/// Largest population (initial agents plus arrivals) a world may be configured for.
pub const MAX_TOTAL_AGENTS: usize = 1_000_000;

/// Lower bound for an infected agent's fatigue-scaled speed.
pub const MIN_SPEED_FACTOR: f64 = 0.1;

/// Side length of the square plane agents live on.
pub const PLANE_SIZE: f64 = 1.0;

/// Upper bound on the number of frames a single experiment run may request.
pub const MAX_EXPERIMENT_STEPS: usize = 1_000_000;
