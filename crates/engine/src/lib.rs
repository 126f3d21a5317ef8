//! The Orrery N-body engine.
//!
//! This crate drives a [`Simulation`] through time:
//!
//! - [`initialize`] — builds a defaulted simulation from a validated [`Config`]
//! - [`step()`] — runs one operator-split step through every configured
//!   subsystem in a fixed phase order
//! - [`integrate()`] — repeats steps until a target time, with exact-finish
//!   truncation, escape and close-encounter monitoring, and observer control
//!
//! Subsystem implementations live in [`orrery_solvers`], the shared types and
//! contracts in [`orrery_core`].
//!
//! # Example
//!
//! ```
//! use orrery::{Config, Monitor, Particle, Status, Vector3, initialize, integrate_unobserved};
//!
//! let mut sim = initialize(&Config {
//!     show_banner: false,
//!     seed: Some(7),
//!     dt: 0.01,
//!     ..Config::default()
//! })?;
//! sim.state.add(Particle::new(1.0, Vector3::zeros(), Vector3::zeros()))?;
//! sim.state.add(Particle::new(1e-3, Vector3::x(), Vector3::y()))?;
//! sim.state.exact_finish_time = true;
//!
//! let solution = integrate_unobserved(&mut sim, 1.0, &Monitor::default());
//!
//! assert_eq!(solution.status, Status::Complete);
//! assert_eq!(sim.state.time, 1.0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod init;
mod simulation;
mod step;

pub mod integrate;

pub use init::initialize;
pub use integrate::{
    Action, Encounter, Escape, Event, Monitor, Solution, Status, integrate, integrate_unobserved,
};
pub use simulation::{Simulation, Subsystems};
pub use step::step;

pub use orrery_core::{
    Config, ConfigError, Hooks, Integrator, IntegratorKind, Observer, Particle, State, Vector3,
};
pub use orrery_solvers::Scheme;
