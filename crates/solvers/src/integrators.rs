//! Integrator backends.
//!
//! The variant set is closed: [`Scheme`] dispatches the [`Integrator`]
//! contract to exactly one active backend, and each backend owns its own
//! scratch state.

mod adaptive;
mod leapfrog;
mod symplectic;

pub use adaptive::Adaptive;
pub use leapfrog::Leapfrog;
pub use symplectic::Symplectic;

use orrery_core::{Integrator, IntegratorKind, Particle, State};

/// The active integrator backend.
#[derive(Debug, Clone)]
pub enum Scheme {
    Adaptive(Adaptive),
    Symplectic(Symplectic),
    Leapfrog(Leapfrog),
}

impl Scheme {
    /// Creates the selected backend with default scratch state.
    #[must_use]
    pub fn new(kind: IntegratorKind) -> Self {
        match kind {
            IntegratorKind::Adaptive => Self::Adaptive(Adaptive::default()),
            IntegratorKind::Symplectic => Self::Symplectic(Symplectic::default()),
            IntegratorKind::Leapfrog => Self::Leapfrog(Leapfrog),
        }
    }

    #[must_use]
    pub fn kind(&self) -> IntegratorKind {
        match self {
            Self::Adaptive(_) => IntegratorKind::Adaptive,
            Self::Symplectic(_) => IntegratorKind::Symplectic,
            Self::Leapfrog(_) => IntegratorKind::Leapfrog,
        }
    }

    fn backend(&mut self) -> &mut dyn Integrator {
        match self {
            Self::Adaptive(inner) => inner,
            Self::Symplectic(inner) => inner,
            Self::Leapfrog(inner) => inner,
        }
    }
}

impl Default for Scheme {
    fn default() -> Self {
        Self::new(IntegratorKind::default())
    }
}

impl From<Adaptive> for Scheme {
    fn from(inner: Adaptive) -> Self {
        Self::Adaptive(inner)
    }
}

impl From<Symplectic> for Scheme {
    fn from(inner: Symplectic) -> Self {
        Self::Symplectic(inner)
    }
}

impl From<Leapfrog> for Scheme {
    fn from(inner: Leapfrog) -> Self {
        Self::Leapfrog(inner)
    }
}

impl Integrator for Scheme {
    fn part1(&mut self, state: &mut State) {
        self.backend().part1(state);
    }

    fn part2(&mut self, state: &mut State, forces: &mut dyn FnMut(&mut State)) {
        self.backend().part2(state, forces);
    }

    fn synchronize(&mut self, state: &mut State) {
        self.backend().synchronize(state);
    }

    fn is_synchronized(&self) -> bool {
        match self {
            Self::Adaptive(inner) => inner.is_synchronized(),
            Self::Symplectic(inner) => inner.is_synchronized(),
            Self::Leapfrog(inner) => inner.is_synchronized(),
        }
    }

    fn reset_coordinates(&mut self) {
        self.backend().reset_coordinates();
    }
}

/// Advances every position along its velocity.
fn drift(particles: &mut [Particle], dt: f64) {
    for p in particles {
        p.position += p.velocity * dt;
    }
}

/// Advances every velocity along its acceleration.
fn kick(particles: &mut [Particle], dt: f64) {
    for p in particles {
        p.velocity += p.acceleration * dt;
    }
}
