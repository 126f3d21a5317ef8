use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// A point mass.
///
/// Particles are addressed by their index in [`State`](crate::State); every
/// subsystem uses the same indexing. The `acceleration` slot is written by
/// force evaluation and consumed by the integrator within the same step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
    #[serde(skip, default = "Vector3::zeros")]
    pub acceleration: Vector3<f64>,
    pub mass: f64,
    pub radius: f64,
}

impl Particle {
    /// Creates a particle with zero radius and zero acceleration.
    #[must_use]
    pub fn new(mass: f64, position: Vector3<f64>, velocity: Vector3<f64>) -> Self {
        Self {
            position,
            velocity,
            acceleration: Vector3::zeros(),
            mass,
            radius: 0.0,
        }
    }

    /// Creates a massless particle, e.g. a test particle or a variational
    /// displacement.
    #[must_use]
    pub fn massless(position: Vector3<f64>, velocity: Vector3<f64>) -> Self {
        Self::new(0.0, position, velocity)
    }

    /// Returns the particle with its physical radius set.
    #[must_use]
    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    #[must_use]
    pub fn momentum(&self) -> Vector3<f64> {
        self.velocity * self.mass
    }

    #[must_use]
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.velocity.norm_squared()
    }

    /// Squared distance from the coordinate origin.
    #[must_use]
    pub fn distance_squared_from_origin(&self) -> f64 {
        self.position.norm_squared()
    }

    /// Squared separation between two particles.
    #[must_use]
    pub fn distance_squared_to(&self, other: &Particle) -> f64 {
        (self.position - other.position).norm_squared()
    }
}
