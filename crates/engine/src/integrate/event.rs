use orrery_core::State;

use super::{Encounter, Escape};

/// Event emitted by the integration loop.
///
/// Step 0 is emitted after the priming `post_timestep` call, before any
/// stepping. Steps 1..N follow each completed step, after the
/// `post_timestep` hook and monitoring have run.
#[derive(Debug, Clone, Copy)]
pub struct Event<'a> {
    /// The step number (0 before the first step).
    pub step: usize,

    /// The simulation state after this step.
    ///
    /// Particle data is synchronized whenever the [`Monitor`](super::Monitor)
    /// has a check enabled. Without one, an integrator that defers
    /// synchronization may leave positions and velocities lagging.
    pub state: &'a State,

    /// Every particle beyond the escape radius after this step.
    pub escapes: &'a [Escape],

    /// Every pair closer than the encounter distance after this step.
    pub encounters: &'a [Encounter],
}

impl Event<'_> {
    /// Whether monitoring raised any signal in this step.
    #[must_use]
    pub fn is_signaled(&self) -> bool {
        !self.escapes.is_empty() || !self.encounters.is_empty()
    }
}
