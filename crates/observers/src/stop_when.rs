use orrery::{Observer, State};
use tracing::debug;

use crate::traits::{CanStopEarly, HasState};

/// Stops the run the first time a predicate on the state holds.
///
/// The predicate is also checked at step 0, so a run whose initial state
/// already satisfies it takes no steps.
pub struct StopWhen<F> {
    predicate: F,
}

impl<F> StopWhen<F>
where
    F: FnMut(&State) -> bool,
{
    #[must_use]
    pub fn new(predicate: F) -> Self {
        Self { predicate }
    }
}

impl<E, A, F> Observer<E, A> for StopWhen<F>
where
    E: HasState,
    A: CanStopEarly,
    F: FnMut(&State) -> bool,
{
    fn observe(&mut self, event: &E) -> Option<A> {
        if (self.predicate)(event.state()) {
            debug!(step = event.step(), time = event.state().time, "stop condition met");
            Some(A::stop_early())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use orrery::{Config, IntegratorKind, Monitor, Particle, Status, Vector3, initialize, integrate};

    #[test]
    fn stops_once_the_particle_passes_a_plane() {
        let mut sim = initialize(&Config {
            show_banner: false,
            seed: Some(9),
            dt: 0.1,
            integrator: IntegratorKind::Leapfrog,
            ..Config::default()
        })
        .expect("valid config");
        sim.state
            .add(Particle::new(1.0, Vector3::zeros(), Vector3::x()))
            .unwrap();

        let observer = StopWhen::new(|state: &State| state.particles()[0].position.x > 0.45);
        let solution = integrate(&mut sim, 10.0, &Monitor::default(), observer);

        assert_eq!(solution.status, Status::Cancelled);
        assert_eq!(solution.steps, 5);
    }

    #[test]
    fn satisfied_at_the_start_takes_no_steps() {
        let mut sim = initialize(&Config {
            show_banner: false,
            ..Config::default()
        })
        .expect("valid config");
        sim.state
            .add(Particle::new(1.0, Vector3::zeros(), Vector3::zeros()))
            .unwrap();

        let solution = integrate(
            &mut sim,
            1.0,
            &Monitor::default(),
            StopWhen::new(|_: &State| true),
        );

        assert_eq!(solution.steps, 0);
        assert_eq!(sim.state.time, 0.0);
    }
}
