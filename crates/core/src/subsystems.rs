//! Contracts for the subsystems the step orchestrator drives.
//!
//! Each phase is a synchronous call. Implementations may parallelize
//! internally but must not retain references to the state between calls.

use nalgebra::Vector3;

use crate::State;

/// Enforces the domain boundary.
pub trait Boundary {
    /// Wraps or removes particles that left the domain.
    fn check(&mut self, state: &mut State);
}

/// A hierarchical index over particle positions.
pub trait SpatialIndex {
    /// Rebuilds or refines the index from current positions.
    fn update(&mut self, state: &State);

    /// Refreshes aggregate moments (mass, centre of mass) ahead of force
    /// evaluation.
    fn update_gravity_data(&mut self, state: &State);

    /// Prepares the part of the index that remote processes need near domain
    /// boundaries. Single-process indexes have nothing to prepare.
    fn prepare_essential_tree(&mut self, _state: &State) {}

    /// Gravitational field (acceleration per unit gravity constant) at the
    /// position of particle `index`, excluding its self-interaction.
    fn acceleration_at(&self, state: &State, index: usize, opening_angle: f64) -> Vector3<f64>;
}

/// Computes accelerations.
pub trait Gravity {
    /// Overwrites the acceleration of every particle.
    ///
    /// `index` is the spatial index when a tree-based force path is configured.
    fn evaluate(&mut self, state: &mut State, index: Option<&dyn SpatialIndex>);

    /// Writes linearised accelerations for the variational particles.
    ///
    /// Called only when the state carries variational particles.
    fn evaluate_variational(&mut self, state: &mut State);
}

/// Detects and resolves contacts.
pub trait Collisions {
    /// Searches for contacts on synchronized particle data.
    fn search(&mut self, state: &State);

    /// Resolves the contacts found by the last search and returns how many
    /// were resolved. Resolution may remove particles but never adds any.
    fn resolve(&mut self, state: &mut State) -> usize;
}

/// Collective exchange between cooperating processes.
///
/// Every participating process must reach the same call before any of them
/// proceeds. The orchestrator has no timeout or recovery for these calls; an
/// implementation that cannot complete an exchange must abort on its own.
pub trait Exchange {
    /// Sends particles that crossed into another process's domain and appends
    /// the ones received.
    fn distribute_particles(&mut self, state: &mut State);

    /// Shares the essential part of the local index with peers.
    fn distribute_essential_tree(&mut self, state: &State, index: &mut dyn SpatialIndex);
}
