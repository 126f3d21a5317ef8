use std::fmt;

use crate::State;

/// A user callback with full mutable access to the simulation state.
pub type Hook = Box<dyn FnMut(&mut State) + Send>;

/// Optional user callbacks, each invoked only when registered.
///
/// | Hook | Called | May mutate |
/// |---|---|---|
/// | `additional_forces` | every force evaluation, after gravity | accelerations |
/// | `post_timestep_modifications` | after `part2`, on synchronized data | anything; internal coordinates are rebuilt afterwards |
/// | `post_timestep` | once before the first step of a run, then after every step | anything, including `exit_requested` |
/// | `finished` | once when a run ends, after the final synchronization | anything |
#[derive(Default)]
pub struct Hooks {
    pub additional_forces: Option<Hook>,
    pub post_timestep: Option<Hook>,
    pub post_timestep_modifications: Option<Hook>,
    pub finished: Option<Hook>,
}

impl Hooks {
    /// Runs `hook` if it is registered, returning whether it ran.
    pub fn run(hook: &mut Option<Hook>, state: &mut State) -> bool {
        match hook {
            Some(hook) => {
                hook(state);
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("additional_forces", &self.additional_forces.is_some())
            .field("post_timestep", &self.post_timestep.is_some())
            .field(
                "post_timestep_modifications",
                &self.post_timestep_modifications.is_some(),
            )
            .field("finished", &self.finished.is_some())
            .finish()
    }
}
