//! Subsystem implementations for the Orrery N-body engine.
//!
//! # Modules
//!
//! - [`integrators`] — the closed set of integrator backends behind [`Scheme`]
//! - [`gravity`] — direct and tree-accelerated force evaluation, including
//!   variational accelerations
//! - [`octree`] — an arena-allocated Barnes-Hut octree
//! - [`boundary`] — open, periodic, and no-op domain boundaries
//! - [`collisions`] — direct contact search with merge or bounce resolution
//!
//! # Features
//!
//! - `parallel` — evaluates direct gravity across particles with rayon.

pub mod boundary;
pub mod collisions;
pub mod gravity;
pub mod integrators;
pub mod octree;

pub use boundary::{NoBoundary, Open, Periodic};
pub use collisions::{Contact, DirectCollisions, Resolution};
pub use gravity::{DirectGravity, TreeGravity};
pub use integrators::{Adaptive, Leapfrog, Scheme, Symplectic};
pub use octree::Octree;

#[cfg(test)]
pub(crate) mod test_utils;
