use orrery_core::{Config, Gravity, Particle, State, Vector3};

use crate::DirectGravity;

/// A deterministic empty state with the given step size.
pub(crate) fn empty(dt: f64) -> State {
    State::new(&Config {
        seed: Some(42),
        dt,
        ..Config::default()
    })
}

/// A state holding `particles` as real particles.
pub(crate) fn with(dt: f64, particles: &[Particle]) -> State {
    let mut state = empty(dt);
    for &p in particles {
        state.add(p).expect("real particles come first");
    }
    state
}

/// A unit-mass star at the origin with a light planet on a circular orbit of
/// radius 1 (period 2π when G = 1).
pub(crate) fn kepler(dt: f64) -> State {
    with(
        dt,
        &[
            Particle::new(1.0, Vector3::zeros(), Vector3::zeros()),
            Particle::new(1e-9, Vector3::x(), Vector3::y()),
        ],
    )
}

/// Evaluates direct gravity, as the orchestrator would between `part1` and
/// `part2`.
pub(crate) fn accelerate(state: &mut State) {
    let mut gravity = DirectGravity::new();
    gravity.evaluate(state, None);
    if state.variational_count() > 0 {
        gravity.evaluate_variational(state);
    }
}
