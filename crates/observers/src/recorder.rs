//! Sampling observer for run diagnostics.

use orrery::Observer;

use crate::traits::HasState;

/// One recorded sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub step: usize,
    pub time: f64,
    pub energy: f64,
    pub particle_count: usize,
}

/// Records time, total energy, and particle count every `every` steps.
///
/// Step 0 is always recorded. Energy is an O(N²) sum, so keep `every` large
/// for big systems.
///
/// # Example
///
/// ```
/// use orrery::{Config, Monitor, Particle, Vector3, initialize, integrate};
/// use orrery_observers::Recorder;
///
/// let mut sim = initialize(&Config { show_banner: false, dt: 0.01, ..Config::default() })?;
/// sim.state.add(Particle::new(1.0, Vector3::zeros(), Vector3::zeros()))?;
/// sim.state.add(Particle::new(1e-3, Vector3::x(), Vector3::y()))?;
///
/// let mut recorder = Recorder::every(10);
/// integrate(&mut sim, 1.0, &Monitor::default(), &mut recorder);
///
/// assert_eq!(recorder.samples()[0].step, 0);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    every: usize,
    samples: Vec<Sample>,
}

impl Recorder {
    /// Creates a recorder that samples every `every` steps (at least one).
    #[must_use]
    pub fn every(every: usize) -> Self {
        Self {
            every: every.max(1),
            samples: Vec::new(),
        }
    }

    #[must_use]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Consumes the recorder and returns its samples.
    #[must_use]
    pub fn into_samples(self) -> Vec<Sample> {
        self.samples
    }

    /// Relative drift of the last sampled energy from the first.
    ///
    /// Returns `None` with fewer than two samples or a zero initial energy.
    #[must_use]
    pub fn energy_drift(&self) -> Option<f64> {
        let (first, last) = match self.samples.as_slice() {
            [first, .., last] => (first, last),
            _ => return None,
        };
        (first.energy != 0.0).then(|| ((last.energy - first.energy) / first.energy).abs())
    }

    fn record<E: HasState>(&mut self, event: &E) {
        let step = event.step();
        if step % self.every.max(1) != 0 {
            return;
        }
        let state = event.state();
        self.samples.push(Sample {
            step,
            time: state.time,
            energy: state.energy(),
            particle_count: state.particle_count(),
        });
    }
}

impl<E: HasState, A> Observer<E, A> for Recorder {
    fn observe(&mut self, event: &E) -> Option<A> {
        self.record(event);
        None
    }
}

/// Allows `&mut Recorder` to be passed to the loop, which takes its observer
/// by value, so the samples can be read after the run.
impl<E: HasState, A> Observer<E, A> for &mut Recorder {
    fn observe(&mut self, event: &E) -> Option<A> {
        self.record(event);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use orrery::{
        Action, Config, Event, IntegratorKind, Monitor, Particle, Simulation, Vector3, initialize,
        integrate,
    };

    fn kepler(kind: IntegratorKind) -> Simulation {
        let mut sim = initialize(&Config {
            show_banner: false,
            seed: Some(1),
            dt: 0.01,
            integrator: kind,
            ..Config::default()
        })
        .expect("valid config");
        sim.state
            .add(Particle::new(1.0, Vector3::zeros(), Vector3::zeros()))
            .unwrap();
        sim.state
            .add(Particle::new(1e-6, Vector3::x(), Vector3::y()))
            .unwrap();
        sim.state.exact_finish_time = true;
        sim
    }

    #[test]
    fn samples_every_nth_step() {
        let mut sim = kepler(IntegratorKind::Leapfrog);
        let mut recorder = Recorder::every(25);

        integrate(&mut sim, 1.0, &Monitor::default(), &mut recorder);

        let steps: Vec<_> = recorder.samples().iter().map(|s| s.step).collect();
        assert_eq!(steps, vec![0, 25, 50, 75, 100]);
        assert!(recorder.samples().iter().all(|s| s.particle_count == 2));
        assert_relative_eq!(recorder.samples()[4].time, 1.0);
    }

    #[test]
    fn zero_interval_samples_every_step() {
        let mut recorder = Recorder::every(0);
        let sim = kepler(IntegratorKind::Leapfrog);

        for step in 0..3 {
            let event = Event {
                step,
                state: &sim.state,
                escapes: &[],
                encounters: &[],
            };
            let action: Option<Action> = recorder.observe(&event);
            assert!(action.is_none());
        }

        assert_eq!(recorder.samples().len(), 3);
    }

    #[test]
    fn symplectic_energy_stays_bounded() {
        let mut sim = kepler(IntegratorKind::Symplectic);
        let mut recorder = Recorder::every(50);

        integrate(&mut sim, 2.0 * std::f64::consts::TAU, &Monitor::default(), &mut recorder);

        let drift = recorder.energy_drift().expect("two or more samples");
        assert!(drift < 1e-4, "energy drift {drift}");
    }

    #[test]
    fn drift_needs_two_samples() {
        assert_eq!(Recorder::every(1).energy_drift(), None);
    }
}
