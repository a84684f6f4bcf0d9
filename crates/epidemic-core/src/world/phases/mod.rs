mod agent_update;
mod dynamics;
mod infection;

pub use infection::contact_profile;
