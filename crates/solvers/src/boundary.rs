//! Domain boundaries.
//!
//! Boundaries act on real particles only. Variational particles are
//! displacements, not positions, and are never wrapped or removed.

use orrery_core::{Boundary, State};
use tracing::debug;

/// Leaves particles wherever they are.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBoundary;

impl Boundary for NoBoundary {
    fn check(&mut self, _state: &mut State) {}
}

/// Removes real particles that left the domain.
///
/// An unbounded domain removes nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Open {
    removed: usize,
}

impl Open {
    /// Total number of particles removed so far.
    #[must_use]
    pub fn removed(&self) -> usize {
        self.removed
    }
}

impl Boundary for Open {
    fn check(&mut self, state: &mut State) {
        let domain = state.domain;
        if domain.box_size.is_none() {
            return;
        }
        let removed = state.retain_real(|p| domain.contains(&p.position));
        if removed > 0 {
            debug!(time = state.time, removed, "particles left the domain");
            self.removed += removed;
        }
    }
}

/// Wraps real particles back into the domain, as if it tiled space.
#[derive(Debug, Clone, Copy, Default)]
pub struct Periodic;

impl Boundary for Periodic {
    fn check(&mut self, state: &mut State) {
        let Some(extent) = state.domain.extent() else {
            return;
        };
        let real = state.real_count();
        for p in &mut state.particles_mut()[..real] {
            for (x, l) in p.position.iter_mut().zip(extent.iter()) {
                let half = 0.5 * l;
                if *x < -half || *x >= half {
                    *x -= l * ((*x + half) / l).floor();
                }
            }
        }
    }
}
