use std::time::Duration;

/// Indicates how an integration run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Reached the target time.
    Complete,

    /// Stopped by `exit_requested` or an observer before reaching the target.
    Cancelled,

    /// Aborted because no particles were left.
    NoParticles,

    /// At least one particle moved beyond the escape radius.
    Escape,

    /// At least one pair came closer than the encounter distance, and no
    /// escape was seen.
    CloseEncounter,
}

impl Status {
    /// The numeric result code: 0 clean, 1 no particles, 2 escape, 3 close
    /// encounter.
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            Self::Complete | Self::Cancelled => 0,
            Self::NoParticles => 1,
            Self::Escape => 2,
            Self::CloseEncounter => 3,
        }
    }
}

/// A real particle found beyond the escape radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Escape {
    pub step: usize,
    pub time: f64,
    pub index: usize,

    /// Distance from the coordinate origin.
    pub distance: f64,
}

/// A pair of real particles found closer than the encounter distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Encounter {
    pub step: usize,
    pub time: f64,

    /// Particle indices, lower first.
    pub pair: (usize, usize),
    pub distance: f64,
}

/// The result of an integration run.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// How the run ended.
    pub status: Status,

    /// Number of steps taken.
    pub steps: usize,

    /// Escapes in step order, one per entry of a particle into the flagged
    /// region. A particle that stays beyond the radius is recorded once.
    pub escapes: Vec<Escape>,

    /// Close encounters in step order, one per entry of a pair into the
    /// flagged region.
    pub encounters: Vec<Encounter>,

    /// Wall-clock duration of the run.
    pub runtime: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_the_result_convention() {
        assert_eq!(Status::Complete.code(), 0);
        assert_eq!(Status::Cancelled.code(), 0);
        assert_eq!(Status::NoParticles.code(), 1);
        assert_eq!(Status::Escape.code(), 2);
        assert_eq!(Status::CloseEncounter.code(), 3);
    }
}
