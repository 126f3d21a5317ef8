use orrery_core::{Integrator, State};

use super::{drift, kick};

/// Second-order drift-kick-drift leapfrog in the inertial frame.
///
/// ```text
/// part1:  x += v * dt/2
/// part2:  v += a * dt,  x += v * dt/2
/// ```
///
/// Particle data is consistent after every `part2`, so synchronization is a
/// no-op.
#[derive(Debug, Clone, Copy, Default)]
pub struct Leapfrog;

impl Integrator for Leapfrog {
    fn part1(&mut self, state: &mut State) {
        let half = 0.5 * state.dt;
        drift(state.particles_mut(), half);
        state.time += half;
    }

    fn part2(&mut self, state: &mut State, _forces: &mut dyn FnMut(&mut State)) {
        let dt = state.dt;
        let half = 0.5 * dt;
        kick(state.particles_mut(), dt);
        drift(state.particles_mut(), half);
        state.time += half;
    }

    fn synchronize(&mut self, _state: &mut State) {}

    fn is_synchronized(&self) -> bool {
        true
    }

    fn reset_coordinates(&mut self) {}
}
