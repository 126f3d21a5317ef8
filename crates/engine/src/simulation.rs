use std::fmt;

use orrery_core::{Boundary, Collisions, Exchange, Gravity, Hooks, SpatialIndex, State};
use orrery_solvers::{DirectGravity, NoBoundary, Scheme};

/// The optional capabilities the step orchestrator drives.
///
/// A missing capability turns its phase into a no-op.
pub struct Subsystems {
    pub boundary: Box<dyn Boundary + Send>,
    pub gravity: Box<dyn Gravity + Send>,
    pub index: Option<Box<dyn SpatialIndex + Send>>,
    pub collisions: Option<Box<dyn Collisions + Send>>,
    pub exchange: Option<Box<dyn Exchange + Send>>,
}

impl Default for Subsystems {
    /// No boundary, direct gravity, and nothing else.
    fn default() -> Self {
        Self {
            boundary: Box::new(NoBoundary),
            gravity: Box::new(DirectGravity::new()),
            index: None,
            collisions: None,
            exchange: None,
        }
    }
}

impl fmt::Debug for Subsystems {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subsystems")
            .field("index", &self.index.is_some())
            .field("collisions", &self.collisions.is_some())
            .field("exchange", &self.exchange.is_some())
            .finish_non_exhaustive()
    }
}

/// Everything one simulation run owns.
///
/// The fields are disjoint so the orchestrator can borrow each of them
/// independently within a step.
#[derive(Debug)]
pub struct Simulation {
    pub state: State,
    pub integrator: Scheme,
    pub subsystems: Subsystems,
    pub hooks: Hooks,
}
