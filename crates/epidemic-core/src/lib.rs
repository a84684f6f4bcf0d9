pub mod agent;
pub mod config;
pub mod constants;
pub mod metrics;
pub mod rng;
pub mod spatial;
pub mod world;

pub use agent::{Agent, HealthState};
pub use config::{InfectionScan, SimConfig, SimConfigError};
pub use constants::MAX_TOTAL_AGENTS;
pub use metrics::{FrameCounts, History, RunSummary};
pub use world::{ExperimentError, World, WorldInitError};
