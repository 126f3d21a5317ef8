use nalgebra::Vector3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::debug;

use crate::{Config, Particle};

/// Which particles act as gravitational sources.
///
/// Only real particles are ever sources; variational particles never are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Active {
    /// Every real particle is massive and active.
    #[default]
    All,

    /// Only the first `n` particles are sources; the rest are test particles.
    First(usize),
}

impl Active {
    /// Number of source particles among `real` real particles.
    #[must_use]
    pub fn count(self, real: usize) -> usize {
        match self {
            Self::All => real,
            Self::First(n) => n.min(real),
        }
    }
}

/// Spatial extent of the simulation, decomposed into root boxes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Domain {
    /// Side length of a root box; `None` means unbounded.
    pub box_size: Option<f64>,
    pub root_boxes: [usize; 3],
}

impl Domain {
    /// Full side lengths of the domain, or `None` when unbounded.
    #[must_use]
    pub fn extent(&self) -> Option<Vector3<f64>> {
        let size = self.box_size?;
        let [nx, ny, nz] = self.root_boxes;
        Some(Vector3::new(
            size * nx as f64,
            size * ny as f64,
            size * nz as f64,
        ))
    }

    /// Whether `position` lies within the centred domain.
    #[must_use]
    pub fn contains(&self, position: &Vector3<f64>) -> bool {
        match self.extent() {
            None => true,
            Some(extent) => position
                .iter()
                .zip(extent.iter())
                .all(|(x, l)| x.abs() <= 0.5 * l),
        }
    }
}

/// Errors returned when adding particles to a [`State`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AddError {
    #[error("real particles must be added before the {variational} variational particle(s)")]
    AfterVariational { variational: usize },
}

/// The mutable record of one simulation run.
///
/// Particles are stored real-first: the last [`State::variational_count`]
/// entries are variational particles, paired by offset with the real particle
/// they track. Every method that changes the particle sequence preserves this
/// layout.
#[derive(Debug, Clone)]
pub struct State {
    /// Current simulation time.
    pub time: f64,

    /// Signed step size. Its sign fixes the integration direction of a run.
    pub dt: f64,

    pub gravity_constant: f64,
    pub softening: f64,
    pub domain: Domain,
    pub active: Active,

    /// Truncate the final step of a run so `time` lands on the target.
    pub exact_finish_time: bool,

    /// Cooperative cancellation flag, checked at the top of every loop iteration.
    pub exit_requested: bool,

    particles: Vec<Particle>,
    variational: usize,
    rng: ChaCha8Rng,
}

impl State {
    /// Creates an empty state from an already validated config.
    ///
    /// The random source is seeded from `config.seed`, or from OS entropy when
    /// no seed is given.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        Self {
            time: 0.0,
            dt: config.dt,
            gravity_constant: config.gravity_constant,
            softening: config.softening,
            domain: Domain {
                box_size: config.box_size,
                root_boxes: config.root_boxes,
            },
            active: Active::All,
            exact_finish_time: false,
            exit_requested: false,
            particles: Vec::new(),
            variational: 0,
            rng,
        }
    }

    /// Appends a real particle and returns its index.
    ///
    /// # Errors
    ///
    /// Returns [`AddError::AfterVariational`] if variational particles have
    /// already been added.
    pub fn add(&mut self, particle: Particle) -> Result<usize, AddError> {
        if self.variational > 0 {
            return Err(AddError::AfterVariational {
                variational: self.variational,
            });
        }
        self.particles.push(particle);
        Ok(self.particles.len() - 1)
    }

    /// Appends a variational particle and returns its index.
    pub fn add_variational(&mut self, particle: Particle) -> usize {
        self.particles.push(particle);
        self.variational += 1;
        self.particles.len() - 1
    }

    /// Removes the particle at `index`, shifting later particles down.
    ///
    /// Removing a real particle also removes the variational particle paired
    /// with it, and shrinks [`Active::First`] when the particle was a source.
    pub fn remove(&mut self, index: usize) -> Option<Particle> {
        let real = self.real_count();
        if index >= self.particles.len() {
            return None;
        }
        if index >= real {
            self.variational -= 1;
            return Some(self.particles.remove(index));
        }

        if index < self.variational {
            self.particles.remove(real + index);
            self.variational -= 1;
            debug!(index, "dropped the variational particle of a removed particle");
        }
        if let Active::First(n) = &mut self.active {
            if index < *n {
                *n -= 1;
            }
        }
        Some(self.particles.remove(index))
    }

    /// Keeps only the real particles for which `keep` returns true.
    ///
    /// Variational particles paired with a removed real particle are removed
    /// too; the rest keep their pairing. Returns the number of real particles
    /// removed.
    pub fn retain_real<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&Particle) -> bool,
    {
        let real = self.real_count();
        let kept: Vec<bool> = self.particles[..real].iter().map(|p| keep(p)).collect();
        let removed = kept.iter().filter(|&&k| !k).count();
        if removed == 0 {
            return 0;
        }

        let paired = self.variational.min(real);
        let orphaned = kept[..paired].iter().filter(|&&k| !k).count();
        if let Active::First(n) = &mut self.active {
            *n -= kept[..(*n).min(real)].iter().filter(|&&k| !k).count();
        }

        let mut index: usize = 0;
        self.particles.retain(|_| {
            let i = index;
            index += 1;
            match i.checked_sub(real) {
                None => kept[i],
                Some(k) => k >= real || kept[k],
            }
        });
        self.variational -= orphaned;
        if orphaned > 0 {
            debug!(orphaned, "dropped variational particles of removed particles");
        }
        removed
    }

    #[must_use]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Mutable access to particle data. The sequence length cannot change
    /// through this slice.
    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    #[must_use]
    pub fn real_particles(&self) -> &[Particle] {
        &self.particles[..self.real_count()]
    }

    #[must_use]
    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    /// Number of non-variational particles; they form a prefix.
    #[must_use]
    pub fn real_count(&self) -> usize {
        self.particles.len() - self.variational
    }

    #[must_use]
    pub fn variational_count(&self) -> usize {
        self.variational
    }

    /// Number of gravitational sources among the real particles.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.count(self.real_count())
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.particles.capacity()
    }

    /// Reserves room for at least `additional` more particles.
    pub fn reserve(&mut self, additional: usize) {
        self.particles.reserve(additional);
    }

    /// The simulation's random source, shared by subsystems that need one.
    pub fn rng_mut(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    #[must_use]
    pub fn total_mass(&self) -> f64 {
        self.real_particles().iter().map(|p| p.mass).sum()
    }

    /// Mass-weighted centre of the real particles, or the origin when massless.
    #[must_use]
    pub fn center_of_mass(&self) -> Vector3<f64> {
        let mass = self.total_mass();
        if mass == 0.0 {
            return Vector3::zeros();
        }
        self.real_particles()
            .iter()
            .fold(Vector3::<f64>::zeros(), |acc, p| acc + p.position * p.mass)
            / mass
    }

    #[must_use]
    pub fn momentum(&self) -> Vector3<f64> {
        self.real_particles()
            .iter()
            .fold(Vector3::<f64>::zeros(), |acc, p| acc + p.momentum())
    }

    /// Total kinetic plus softened pairwise potential energy of the real
    /// particles, counting only pairs that involve an active source.
    #[must_use]
    pub fn energy(&self) -> f64 {
        let real = self.real_particles();
        let active = self.active_count();
        let eps2 = self.softening * self.softening;

        let kinetic: f64 = real.iter().map(Particle::kinetic_energy).sum();
        let potential: f64 = (0..active)
            .flat_map(|i| ((i + 1)..real.len()).map(move |j| (i, j)))
            .map(|(i, j)| {
                let r = (real[i].distance_squared_to(&real[j]) + eps2).sqrt();
                -self.gravity_constant * real[i].mass * real[j].mass / r
            })
            .sum();

        kinetic + potential
    }
}
