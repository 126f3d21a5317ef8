use nalgebra::Vector3;
use orrery_core::{Integrator, State};
use tracing::{debug, warn};

/// Drift-kick-drift in barycentric coordinates with lazy synchronization.
///
/// Real particles are integrated relative to their centre of mass, which moves
/// on its own straight line unless external forces accelerate it. Variational
/// particles are integrated as-is.
///
/// With `safe_mode` off, the closing half drift of each step is deferred and
/// merged into the opening drift of the next one, halving the number of
/// drifts. While a drift is pending, particle positions lag the internal
/// coordinates and velocities are stale; [`Integrator::synchronize`] completes
/// the pending drift and writes consistent data back.
#[derive(Debug, Clone)]
pub struct Symplectic {
    /// Synchronize at the end of every step.
    pub safe_mode: bool,

    synchronized: bool,
    recalculate: bool,
    unsynchronized_resets: usize,
    pending_drift: f64,
    frame: Frame,
}

/// Internal coordinates: barycentric for real particles, raw for variational
/// particles.
#[derive(Debug, Clone, Default)]
struct Frame {
    positions: Vec<Vector3<f64>>,
    velocities: Vec<Vector3<f64>>,
    com_position: Vector3<f64>,
    com_velocity: Vector3<f64>,
    real: usize,
}

impl Default for Symplectic {
    fn default() -> Self {
        Self {
            safe_mode: true,
            synchronized: true,
            recalculate: false,
            unsynchronized_resets: 0,
            pending_drift: 0.0,
            frame: Frame::default(),
        }
    }
}

impl Symplectic {
    /// Creates the fast variant that defers synchronization.
    #[must_use]
    pub fn unsafe_mode() -> Self {
        Self {
            safe_mode: false,
            ..Self::default()
        }
    }

    /// Number of times internal coordinates were rebuilt from particle data
    /// that was not synchronized.
    #[must_use]
    pub fn unsynchronized_resets(&self) -> usize {
        self.unsynchronized_resets
    }

    fn drift(&mut self, dt: f64) {
        let frame = &mut self.frame;
        for (x, v) in frame.positions.iter_mut().zip(&frame.velocities) {
            *x += v * dt;
        }
        frame.com_position += frame.com_velocity * dt;
    }
}

impl Frame {
    fn load(&mut self, state: &State) {
        let particles = state.particles();
        let real = state.real_count();
        let mass = state.total_mass();

        let (com_position, com_velocity) = if mass > 0.0 {
            let (x, v) = particles[..real].iter().fold(
                (Vector3::<f64>::zeros(), Vector3::<f64>::zeros()),
                |(x, v), p| (x + p.position * p.mass, v + p.velocity * p.mass),
            );
            (x / mass, v / mass)
        } else {
            (Vector3::zeros(), Vector3::zeros())
        };

        self.real = real;
        self.com_position = com_position;
        self.com_velocity = com_velocity;
        self.positions.clear();
        self.velocities.clear();
        for (i, p) in particles.iter().enumerate() {
            if i < real {
                self.positions.push(p.position - com_position);
                self.velocities.push(p.velocity - com_velocity);
            } else {
                self.positions.push(p.position);
                self.velocities.push(p.velocity);
            }
        }
    }

    fn store(&self, state: &mut State) {
        let real = self.real;
        let (com_x, com_v) = (self.com_position, self.com_velocity);
        let data = self.positions.iter().zip(&self.velocities);
        for (i, (p, (x, v))) in state.particles_mut().iter_mut().zip(data).enumerate() {
            if i < real {
                p.position = x + com_x;
                p.velocity = v + com_v;
            } else {
                p.position = *x;
                p.velocity = *v;
            }
        }
    }

    fn len(&self) -> usize {
        self.positions.len()
    }
}

impl Integrator for Symplectic {
    fn part1(&mut self, state: &mut State) {
        // Synchronized particles are authoritative: boundaries and collisions
        // may have changed them after the last step.
        let stale = self.recalculate || self.frame.len() != state.particle_count();
        if self.synchronized || stale {
            if stale && !self.synchronized {
                self.unsynchronized_resets += 1;
                warn!(
                    time = state.time,
                    "rebuilding symplectic coordinates from unsynchronized particles"
                );
            }
            self.frame.load(state);
            self.pending_drift = 0.0;
            self.synchronized = true;
            self.recalculate = false;
        }

        let half = 0.5 * state.dt;
        self.drift(self.pending_drift + half);
        self.pending_drift = 0.0;
        self.synchronized = false;
        self.frame.store(state);
        state.time += half;
    }

    fn part2(&mut self, state: &mut State, _forces: &mut dyn FnMut(&mut State)) {
        // Boundaries and exchange may have moved or removed particles since part1.
        self.frame.load(state);

        let dt = state.dt;
        let half = 0.5 * dt;
        let real = self.frame.real;
        let mass = state.total_mass();
        let particles = state.particles();

        let com_acceleration = if mass > 0.0 {
            particles[..real]
                .iter()
                .fold(Vector3::<f64>::zeros(), |acc, p| acc + p.acceleration * p.mass)
                / mass
        } else {
            Vector3::zeros()
        };

        for (i, (v, p)) in self.frame.velocities.iter_mut().zip(particles).enumerate() {
            if i < real {
                *v += (p.acceleration - com_acceleration) * dt;
            } else {
                *v += p.acceleration * dt;
            }
        }
        self.frame.com_velocity += com_acceleration * dt;
        state.time += half;

        if self.safe_mode {
            self.drift(half);
            self.frame.store(state);
            self.synchronized = true;
        } else {
            self.pending_drift = half;
            debug!(time = state.time, "deferring closing drift");
        }
    }

    fn synchronize(&mut self, state: &mut State) {
        if self.synchronized {
            return;
        }
        self.drift(self.pending_drift);
        self.pending_drift = 0.0;
        self.frame.store(state);
        self.synchronized = true;
    }

    fn is_synchronized(&self) -> bool {
        self.synchronized
    }

    fn reset_coordinates(&mut self) {
        self.recalculate = true;
    }
}
