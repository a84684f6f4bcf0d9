use crate::agent::{Agent, HealthState};
use rstar::{RTree, RTreeObject, AABB};

/// Lightweight position-only struct for spatial indexing to avoid cloning full agents.
#[derive(Clone, Debug)]
pub struct AgentLocation {
    /// Index of the agent in the world's population.
    pub index: usize,
    pub position: [f64; 2],
}

impl RTreeObject for AgentLocation {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

/// Build an R*-tree from the positions of susceptible agents via bulk_load (O(n log n)).
pub fn build_susceptible_index(agents: &[Agent]) -> RTree<AgentLocation> {
    let locations: Vec<AgentLocation> = agents
        .iter()
        .enumerate()
        .filter(|(_, a)| a.state == HealthState::Susceptible)
        .map(|(index, a)| AgentLocation {
            index,
            position: a.position,
        })
        .collect();
    RTree::bulk_load(locations)
}

/// Collect indices of indexed agents strictly closer than `radius` to `center`,
/// in ascending index order. `out` is cleared first so callers can reuse the buffer.
pub fn indices_within(
    tree: &RTree<AgentLocation>,
    center: [f64; 2],
    radius: f64,
    out: &mut Vec<usize>,
) {
    out.clear();
    if radius <= 0.0 {
        return;
    }
    let envelope = AABB::from_corners(
        [center[0] - radius, center[1] - radius],
        [center[0] + radius, center[1] + radius],
    );
    let r_sq = radius * radius;
    for loc in tree.locate_in_envelope(&envelope) {
        if distance_sq(loc.position, center) < r_sq {
            out.push(loc.index);
        }
    }
    out.sort_unstable();
}

pub fn distance_sq(a: [f64; 2], b: [f64; 2]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    dx * dx + dy * dy
}
