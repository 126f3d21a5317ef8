//! Direct contact search with pluggable resolution.
//!
//! Contacts are searched on synchronized data and resolved in a random order
//! drawn from the simulation's own random source, so seeded runs replay the
//! same sequence of mergers.

mod resolution;

pub use resolution::Resolution;

use orrery_core::{Collisions, State};
use rand::seq::SliceRandom;
use tracing::debug;

/// A pair of real particles in contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub first: usize,
    pub second: usize,
}

/// O(N²) search over the real particles.
///
/// Two particles are in contact when their separation is below the sum of
/// their radii. Pairs of point particles never collide.
#[derive(Debug, Clone, Default)]
pub struct DirectCollisions {
    pub resolution: Resolution,
    contacts: Vec<Contact>,
}

impl DirectCollisions {
    #[must_use]
    pub fn new(resolution: Resolution) -> Self {
        Self {
            resolution,
            contacts: Vec::new(),
        }
    }

    /// Contacts found by the last search that have not been resolved yet.
    #[must_use]
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }
}

impl Collisions for DirectCollisions {
    fn search(&mut self, state: &State) {
        let real = state.real_particles();
        self.contacts.clear();

        for (i, a) in real.iter().enumerate() {
            for (j, b) in real.iter().enumerate().skip(i + 1) {
                let reach = a.radius + b.radius;
                if reach > 0.0 && a.distance_squared_to(b) < reach * reach {
                    self.contacts.push(Contact { first: i, second: j });
                }
            }
        }
    }

    fn resolve(&mut self, state: &mut State) -> usize {
        if self.contacts.is_empty() {
            return 0;
        }

        let mut contacts = std::mem::take(&mut self.contacts);
        contacts.shuffle(state.rng_mut());

        let resolved = self.resolution.apply(state, &contacts);
        if resolved > 0 {
            debug!(
                time = state.time,
                resolved,
                found = contacts.len(),
                "resolved collisions"
            );
        }
        resolved
    }
}
