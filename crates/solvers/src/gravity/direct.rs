use orrery_core::{Gravity, Particle, SpatialIndex, State, Vector3};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::{accelerate_variational, field_at};

/// Pairwise summation over the active sources.
///
/// Ignores any spatial index it is handed.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectGravity;

impl DirectGravity {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Gravity for DirectGravity {
    fn evaluate(&mut self, state: &mut State, _index: Option<&dyn SpatialIndex>) {
        let real = state.real_count();
        let active = state.active_count();
        let g = state.gravity_constant;
        let eps2 = state.softening * state.softening;

        let accelerations: Vec<Vector3<f64>> = {
            let particles = state.particles();
            let sources = &particles[..active];
            let field = |(i, p): (usize, &Particle)| {
                field_at(sources, &p.position, i, eps2) * g
            };

            #[cfg(feature = "parallel")]
            let out = particles[..real].par_iter().enumerate().map(field).collect();
            #[cfg(not(feature = "parallel"))]
            let out = particles[..real].iter().enumerate().map(field).collect();
            out
        };

        let particles = state.particles_mut();
        for (p, a) in particles.iter_mut().zip(accelerations) {
            p.acceleration = a;
        }
        for p in &mut particles[real..] {
            p.acceleration = Vector3::zeros();
        }
    }

    fn evaluate_variational(&mut self, state: &mut State) {
        accelerate_variational(state);
    }
}
