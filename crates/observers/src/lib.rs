//! Reusable observers for the Orrery N-body engine.
//!
//! This crate provides [`Observer`] implementations and capability traits that
//! work with the integration loop's events.
//!
//! # Modules
//!
//! - [`traits`] — Capability traits for generic observers
//!   ([`HasState`], [`HasSignals`], [`CanStopEarly`])
//!
//! # Observers
//!
//! - [`Recorder`] — samples time, energy, and particle count every few steps
//! - [`StopWhen`] — stops the run once a predicate on the state holds
//!
//! [`Observer`]: orrery::Observer
//! [`HasState`]: traits::HasState
//! [`HasSignals`]: traits::HasSignals
//! [`CanStopEarly`]: traits::CanStopEarly

pub mod traits;

mod recorder;
mod stop_when;

pub use recorder::{Recorder, Sample};
pub use stop_when::StopWhen;
