//! Capability traits for generic observers.
//!
//! These traits abstract over event and action types so that observers do not
//! depend on the concrete loop types.
//!
//! # Event traits
//!
//! - [`HasState`] — events that expose the simulation state
//! - [`HasSignals`] — events that carry escape and close-encounter signals
//!
//! # Action traits
//!
//! - [`CanStopEarly`] — actions that can signal early termination
//!
//! # Example
//!
//! ```rust
//! use orrery::Observer;
//! use orrery_observers::traits::{CanStopEarly, HasSignals};
//!
//! /// Stops at the first escape.
//! struct FirstEscape;
//!
//! impl<E: HasSignals, A: CanStopEarly> Observer<E, A> for FirstEscape {
//!     fn observe(&mut self, event: &E) -> Option<A> {
//!         (event.escape_count() > 0).then(A::stop_early)
//!     }
//! }
//! ```

use orrery::{Action, Event, State};

/// An event that exposes the simulation state.
pub trait HasState {
    /// Returns the loop step this event was emitted after (zero before the
    /// first step).
    fn step(&self) -> usize;

    /// Returns the state as of this event.
    fn state(&self) -> &State;
}

/// An event that carries monitoring signals.
pub trait HasSignals {
    /// Returns how many particles were flagged as escaping at this step.
    fn escape_count(&self) -> usize;

    /// Returns how many close pairs were flagged at this step.
    fn encounter_count(&self) -> usize;
}

/// An action type that can signal early termination.
pub trait CanStopEarly {
    /// Returns the action that stops the run early.
    fn stop_early() -> Self;
}

impl HasState for Event<'_> {
    fn step(&self) -> usize {
        self.step
    }

    fn state(&self) -> &State {
        self.state
    }
}

impl HasSignals for Event<'_> {
    fn escape_count(&self) -> usize {
        self.escapes.len()
    }

    fn encounter_count(&self) -> usize {
        self.encounters.len()
    }
}

impl CanStopEarly for Action {
    fn stop_early() -> Self {
        Self::StopEarly
    }
}
