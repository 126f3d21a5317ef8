use orrery_core::State;

use super::{Encounter, Escape};

/// Escape and close-encounter thresholds checked after every step.
///
/// Only real particles are monitored. Signals are collected; they never stop
/// the run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Monitor {
    /// Flag real particles farther than this from the origin.
    pub escape_radius: Option<f64>,

    /// Flag pairs of real particles closer than this to each other.
    pub encounter_distance: Option<f64>,
}

impl Monitor {
    /// Creates a monitor from raw thresholds, where zero (or any non-positive
    /// value) disables a check.
    #[must_use]
    pub fn new(max_r: f64, min_d: f64) -> Self {
        Self {
            escape_radius: (max_r > 0.0).then_some(max_r),
            encounter_distance: (min_d > 0.0).then_some(min_d),
        }
    }

    /// Whether any check is enabled.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.escape_radius.is_some() || self.encounter_distance.is_some()
    }

    /// Appends the escapes in `state` to `out`.
    pub fn escapes(&self, state: &State, step: usize, out: &mut Vec<Escape>) {
        let Some(radius) = self.escape_radius else {
            return;
        };
        let limit = radius * radius;

        out.extend(
            state
                .real_particles()
                .iter()
                .enumerate()
                .map(|(index, p)| (index, p.distance_squared_from_origin()))
                .filter(|&(_, r2)| r2 > limit)
                .map(|(index, r2)| Escape {
                    step,
                    time: state.time,
                    index,
                    distance: r2.sqrt(),
                }),
        );
    }

    /// Appends the close encounters in `state` to `out`.
    ///
    /// This is an O(N²) scan over all real pairs.
    pub fn encounters(&self, state: &State, step: usize, out: &mut Vec<Encounter>) {
        let Some(distance) = self.encounter_distance else {
            return;
        };
        let limit = distance * distance;
        let real = state.real_particles();

        for (i, a) in real.iter().enumerate() {
            for (j, b) in real.iter().enumerate().take(i) {
                let r2 = a.distance_squared_to(b);
                if r2 < limit {
                    out.push(Encounter {
                        step,
                        time: state.time,
                        pair: (j, i),
                        distance: r2.sqrt(),
                    });
                }
            }
        }
    }
}
