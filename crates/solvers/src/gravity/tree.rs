use orrery_core::{Gravity, SpatialIndex, State, Vector3};
use tracing::trace;

use super::{DirectGravity, accelerate_variational};

/// Barnes-Hut force evaluation over a [`SpatialIndex`].
///
/// Falls back to direct summation when no index is configured.
#[derive(Debug, Clone, Copy)]
pub struct TreeGravity {
    /// Largest ratio of node width to distance accepted for a monopole.
    pub opening_angle: f64,
}

impl Default for TreeGravity {
    fn default() -> Self {
        Self { opening_angle: 0.5 }
    }
}

impl TreeGravity {
    #[must_use]
    pub fn new(opening_angle: f64) -> Self {
        Self { opening_angle }
    }
}

impl Gravity for TreeGravity {
    fn evaluate(&mut self, state: &mut State, index: Option<&dyn SpatialIndex>) {
        let Some(index) = index else {
            trace!("no spatial index configured, summing directly");
            DirectGravity::new().evaluate(state, None);
            return;
        };

        let real = state.real_count();
        let g = state.gravity_constant;
        let accelerations: Vec<Vector3<f64>> = (0..real)
            .map(|i| index.acceleration_at(state, i, self.opening_angle) * g)
            .collect();

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
