//! The integration loop.
//!
//! [`integrate`] repeats [`step`](crate::step) until the simulation reaches a
//! target time, in either direction:
//!
//! ```text
//! post_timestep (priming)      -> Event { step: 0 }
//! loop while time < t_max (in the sign of dt):
//!     abort if no particles
//!     step
//!     truncate the next step if it would overshoot (exact finish only)
//!     post_timestep
//!     synchronize (when monitoring)
//!     monitor escapes, then close encounters
//!                              -> Event { step: n }
//! synchronize, restore dt, finished
//! ```
//!
//! Monitoring signals never stop the run. The [`Solution`] records each
//! particle or pair once per entry into the flagged region, while every
//! [`Event`] carries all signals of its step. The only way to end early is cooperative: `exit_requested` set by a
//! hook, or [`Action::StopEarly`] returned by the observer.

mod action;
mod event;
mod monitor;
mod solution;

pub use action::Action;
pub use event::Event;
pub use monitor::Monitor;
pub use solution::{Encounter, Escape, Solution, Status};

use std::collections::HashSet;
use std::time::Instant;

use orrery_core::{Hooks, Integrator, Observer, State};
use tracing::{error, info};

use crate::{Simulation, step};

/// Integrates `sim` until `state.time` reaches `t_max`.
///
/// The sign of `state.dt` fixes the direction for the whole run. With
/// `exact_finish_time` set, the final step is shortened so that `time` ends
/// exactly on `t_max`, and `dt` is restored to its last untruncated value
/// afterwards. Without it the run may overshoot by up to one step.
///
/// On every exit path the integrator is synchronized, `dt` is restored, and
/// the `finished` hook runs.
///
/// # Observer
///
/// The observer receives an [`Event`] for step 0 and after every step, and may
/// return [`Action::StopEarly`] to end the run after the current step.
pub fn integrate<O>(
    sim: &mut Simulation,
    t_max: f64,
    monitor: &Monitor,
    mut observer: O,
) -> Solution
where
    O: for<'a> Observer<Event<'a>, Action>,
{
    let start = Instant::now();
    let direction = sim.state.dt.signum();
    let mut dt_last_done = sim.state.dt;
    let mut final_steps = 0;
    let mut truncated = false;
    let mut steps = 0;
    let mut no_particles = false;
    let mut escapes = Vec::new();
    let mut encounters = Vec::new();
    let mut step_escapes = Vec::new();
    let mut step_encounters = Vec::new();
    let mut escaping: HashSet<usize> = HashSet::new();
    let mut close: HashSet<(usize, usize)> = HashSet::new();

    Hooks::run(&mut sim.hooks.post_timestep, &mut sim.state);
    let mut stopped = matches!(
        observer.observe(&Event {
            step: 0,
            state: &sim.state,
            escapes: &[],
            encounters: &[],
        }),
        Some(Action::StopEarly)
    );

    if overshoots(&sim.state, t_max, direction) {
        sim.state.dt = t_max - sim.state.time;
        final_steps += 1;
        truncated = true;
    }

    while sim.state.time * direction < t_max * direction
        && final_steps < 2
        && !sim.state.exit_requested
        && !stopped
    {
        if sim.state.particle_count() == 0 {
            error!(time = sim.state.time, "no particles found, stopping");
            no_particles = true;
            break;
        }

        step(sim);
        steps += 1;
        if truncated {
            sim.state.time = t_max;
        }

        if overshoots(&sim.state, t_max, direction) {
            sim.integrator.synchronize(&mut sim.state);
            sim.state.dt = t_max - sim.state.time;
            final_steps += 1;
            truncated = true;
        } else {
            dt_last_done = sim.state.dt;
        }

        Hooks::run(&mut sim.hooks.post_timestep, &mut sim.state);

        if monitor.is_enabled() {
            sim.integrator.synchronize(&mut sim.state);
        }
        step_escapes.clear();
        step_encounters.clear();
        monitor.escapes(&sim.state, steps, &mut step_escapes);
        monitor.encounters(&sim.state, steps, &mut step_encounters);

        escapes.extend(
            step_escapes
                .iter()
                .filter(|e: &&Escape| !escaping.contains(&e.index))
                .copied(),
        );
        encounters.extend(
            step_encounters
                .iter()
                .filter(|e: &&Encounter| !close.contains(&e.pair))
                .copied(),
        );
        escaping = step_escapes.iter().map(|e| e.index).collect();
        close = step_encounters.iter().map(|e| e.pair).collect();

        let event = Event {
            step: steps,
            state: &sim.state,
            escapes: &step_escapes,
            encounters: &step_encounters,
        };
        if let Some(Action::StopEarly) = observer.observe(&event) {
            stopped = true;
        }
    }

    sim.integrator.synchronize(&mut sim.state);
    sim.state.dt = dt_last_done;
    Hooks::run(&mut sim.hooks.finished, &mut sim.state);

    let reached = sim.state.time * direction >= t_max * direction;
    let status = if no_particles {
        Status::NoParticles
    } else if !escapes.is_empty() {
        Status::Escape
    } else if !encounters.is_empty() {
        Status::CloseEncounter
    } else if !reached {
        Status::Cancelled
    } else {
        Status::Complete
    };

    let runtime = start.elapsed();
    info!(
        ?status,
        steps,
        time = sim.state.time,
        runtime_s = runtime.as_secs_f64(),
        "integration finished"
    );

    Solution {
        status,
        steps,
        escapes,
        encounters,
        runtime,
    }
}

/// Integrates `sim` without observation.
///
/// This is a convenience wrapper around [`integrate`] that discards events.
pub fn integrate_unobserved(sim: &mut Simulation, t_max: f64, monitor: &Monitor) -> Solution {
    integrate(sim, t_max, monitor, ())
}

/// Whether exact finish is on and the next step would reach or pass `t_max`.
fn overshoots(state: &State, t_max: f64, direction: f64) -> bool {
    state.exact_finish_time && (state.time + state.dt) * direction >= t_max * direction
}
