//! Core types and contracts for the Orrery N-body engine.
//!
//! This crate defines the shared abstractions that integrators, force
//! evaluators, and the step orchestrator build on:
//!
//! - [`Particle`] and [`State`] — the mutable record of a simulation run
//! - [`Config`] — validated, serializable initialization parameters
//! - [`Integrator`] — the operator-split backend contract (`part1`, `part2`,
//!   `synchronize`)
//! - [`Boundary`], [`SpatialIndex`], [`Gravity`], [`Collisions`],
//!   [`Exchange`] — subsystem contracts invoked once per step
//! - [`Hooks`] — optional user callbacks at documented call points
//! - [`Observer`] — receives loop events and optionally returns control actions

mod config;
mod hooks;
mod integrator;
mod observer;
mod particle;
mod state;
mod subsystems;

pub use config::{Config, ConfigError, IntegratorKind};
pub use hooks::{Hook, Hooks};
pub use integrator::Integrator;
pub use observer::Observer;
pub use particle::Particle;
pub use state::{Active, AddError, Domain, State};
pub use subsystems::{Boundary, Collisions, Exchange, Gravity, SpatialIndex};

pub use nalgebra::Vector3;
