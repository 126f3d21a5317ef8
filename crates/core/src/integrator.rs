use crate::State;

/// An operator-split integrator backend.
///
/// A step is split around force evaluation: [`Integrator::part1`] applies the
/// opening sub-operation (typically a drift), the orchestrator then computes
/// accelerations at the new positions, and [`Integrator::part2`] completes the
/// step. Together the two parts advance `state.time` by `state.dt`.
///
/// Some backends defer work between steps and leave the particle data in a
/// state that is not externally consistent. [`Integrator::synchronize`]
/// completes any deferred work; the orchestrator calls it before handing
/// particles to user hooks, before collision detection, and at the end of a
/// run.
pub trait Integrator {
    /// Applies the first half of a step.
    ///
    /// Requires at least one particle.
    fn part1(&mut self, state: &mut State);

    /// Completes the step after accelerations have been written.
    ///
    /// `forces` re-evaluates the full force path at the particles' current
    /// positions and velocities. Single-stage schemes never call it; multi-stage
    /// schemes call it once per extra stage.
    fn part2(&mut self, state: &mut State, forces: &mut dyn FnMut(&mut State));

    /// Brings particle positions and velocities to a consistent state.
    ///
    /// Calling this twice without an intervening step must leave the state
    /// unchanged the second time.
    fn synchronize(&mut self, state: &mut State);

    /// Whether particle data currently reflects a fully completed step.
    fn is_synchronized(&self) -> bool;

    /// Marks any internal coordinate representation as stale so it is rebuilt
    /// from the particle data on the next step.
    ///
    /// Called after user code may have modified particles.
    fn reset_coordinates(&mut self);
}
