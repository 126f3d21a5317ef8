/// Control actions supported by the integration loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// End the run after the current step, as if `exit_requested` were set.
    StopEarly,
}
