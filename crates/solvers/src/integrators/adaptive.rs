use nalgebra::Vector3;
use orrery_core::{Integrator, State};
use tracing::warn;

/// Embedded Runge-Kutta-Fehlberg 4(5) with adaptive sub-stepping.
///
/// Each step of size `dt` is covered by as many accepted sub-steps as the
/// error tolerance requires, so `time` always advances by exactly `dt`. The
/// fifth-order solution is propagated; the difference to the fourth-order
/// solution drives the sub-step size.
///
/// `part1` does nothing. The accelerations computed by the orchestrator seed
/// the first stage; every further stage calls back into the force path.
#[derive(Debug, Clone)]
pub struct Adaptive {
    /// Relative error tolerance per sub-step.
    pub epsilon: f64,

    /// Smallest sub-step size; steps at this size are accepted regardless of
    /// their error. Zero disables the floor.
    pub min_dt: f64,

    /// Normalize errors by the largest position and velocity in the system
    /// (`true`) or by each particle's own, floored by a small share of the
    /// system scale (`false`).
    pub global_error: bool,

    /// Sub-step attempts allowed within one step before the rest is accepted
    /// without error control.
    pub max_attempts: usize,

    iterations_max_exceeded: usize,
    substep: Option<f64>,
}

impl Default for Adaptive {
    fn default() -> Self {
        Self {
            epsilon: 1e-9,
            min_dt: 0.0,
            global_error: true,
            max_attempts: 10_000,
            iterations_max_exceeded: 0,
            substep: None,
        }
    }
}

// Fehlberg tableau.
const C: [f64; 6] = [0.0, 1.0 / 4.0, 3.0 / 8.0, 12.0 / 13.0, 1.0, 1.0 / 2.0];
const A: [[f64; 5]; 6] = [
    [0.0, 0.0, 0.0, 0.0, 0.0],
    [1.0 / 4.0, 0.0, 0.0, 0.0, 0.0],
    [3.0 / 32.0, 9.0 / 32.0, 0.0, 0.0, 0.0],
    [1932.0 / 2197.0, -7200.0 / 2197.0, 7296.0 / 2197.0, 0.0, 0.0],
    [439.0 / 216.0, -8.0, 3680.0 / 513.0, -845.0 / 4104.0, 0.0],
    [-8.0 / 27.0, 2.0, -3544.0 / 2565.0, 1859.0 / 4104.0, -11.0 / 40.0],
];
const B5: [f64; 6] = [
    16.0 / 135.0,
    0.0,
    6656.0 / 12825.0,
    28561.0 / 56430.0,
    -9.0 / 50.0,
    2.0 / 55.0,
];
const B4: [f64; 6] = [
    25.0 / 216.0,
    0.0,
    1408.0 / 2565.0,
    2197.0 / 4104.0,
    -1.0 / 5.0,
    0.0,
];

const SAFETY: f64 = 0.9;
const MAX_SHRINK: f64 = 0.2;
const MAX_GROWTH: f64 = 5.0;

/// Share of the system scale added to each particle's own scale when errors
/// are normalized per particle.
const LOCAL_FLOOR: f64 = 1e-6;

/// Stage derivatives: `(velocity, acceleration)` per particle.
type Stage = Vec<(Vector3<f64>, Vector3<f64>)>;

impl Adaptive {
    /// Number of steps that ran out of sub-step attempts.
    #[must_use]
    pub fn iterations_max_exceeded(&self) -> usize {
        self.iterations_max_exceeded
    }

    /// The last accepted, unclipped sub-step size.
    #[must_use]
    pub fn substep(&self) -> Option<f64> {
        self.substep
    }

    /// Attempts one sub-step of size `h` starting at `time`.
    ///
    /// On return the particles hold the fifth-order solution and the returned
    /// value is the scaled error norm (accept when at most one).
    fn attempt(
        &self,
        state: &mut State,
        base: &[(Vector3<f64>, Vector3<f64>)],
        first: Stage,
        time: f64,
        h: f64,
        forces: &mut dyn FnMut(&mut State),
    ) -> f64 {
        let mut stages: Vec<Stage> = Vec::with_capacity(6);
        stages.push(first);

        for s in 1..6 {
            set_combination(state, base, &stages, &A[s][..s], h);
            state.time = time + C[s] * h;
            forces(state);
            stages.push(read_stage(state));
        }

        set_combination(state, base, &stages, &B5, h);
        state.time = time + h;

        let real = state.real_count();
        let errors: Vec<(Vector3<f64>, Vector3<f64>)> = (0..real)
            .map(|i| {
                stages.iter().zip(B5.iter().zip(&B4)).fold(
                    (Vector3::<f64>::zeros(), Vector3::<f64>::zeros()),
                    |(dx, dv), (stage, (b5, b4))| {
                        let (k_x, k_v) = stage[i];
                        let w = (b5 - b4) * h;
                        (dx + k_x * w, dv + k_v * w)
                    },
                )
            })
            .collect();

        self.error_norm(&base[..real], &stages[0][..real], &errors, h)
    }

    /// Largest error relative to the tolerance, over all real particles.
    ///
    /// A particle's scale is its position (velocity) magnitude or the distance
    /// its velocity (acceleration) carries it over the sub-step, whichever is
    /// larger, so particles at rest at the origin still have a finite scale.
    /// Local normalization adds a small share of the system scale.
    fn error_norm(
        &self,
        base: &[(Vector3<f64>, Vector3<f64>)],
        first: &[(Vector3<f64>, Vector3<f64>)],
        errors: &[(Vector3<f64>, Vector3<f64>)],
        h: f64,
    ) -> f64 {
        let tiny = f64::MIN_POSITIVE;
        let scales: Vec<(f64, f64)> = base
            .iter()
            .zip(first)
            .map(|((x, v), (_, a))| {
                (
                    x.norm().max(v.norm() * h.abs()),
                    v.norm().max(a.norm() * h.abs()),
                )
            })
            .collect();
        let global = scales
            .iter()
            .fold((0.0_f64, 0.0_f64), |(gx, gv), (sx, sv)| (gx.max(*sx), gv.max(*sv)));

        scales
            .iter()
            .zip(errors)
            .map(|((sx, sv), (dx, dv))| {
                let (sx, sv) = if self.global_error {
                    global
                } else {
                    (sx + LOCAL_FLOOR * global.0, sv + LOCAL_FLOOR * global.1)
                };
                let ex = dx.norm() / (self.epsilon * sx).max(tiny);
                let ev = dv.norm() / (self.epsilon * sv).max(tiny);
                ex.max(ev)
            })
            .fold(0.0, f64::max)
    }
}

fn snapshot(state: &State) -> Vec<(Vector3<f64>, Vector3<f64>)> {
    state
        .particles()
        .iter()
        .map(|p| (p.position, p.velocity))
        .collect()
}

fn restore(state: &mut State, base: &[(Vector3<f64>, Vector3<f64>)]) {
    for (p, (x, v)) in state.particles_mut().iter_mut().zip(base) {
        p.position = *x;
        p.velocity = *v;
    }
}

fn read_stage(state: &State) -> Stage {
    state
        .particles()
        .iter()
        .map(|p| (p.velocity, p.acceleration))
        .collect()
}

/// Sets particles to `base + h * sum(weights[j] * stages[j])`.
fn set_combination(
    state: &mut State,
    base: &[(Vector3<f64>, Vector3<f64>)],
    stages: &[Stage],
    weights: &[f64],
    h: f64,
) {
    for (i, p) in state.particles_mut().iter_mut().enumerate() {
        let (mut x, mut v) = base[i];
        for (stage, w) in stages.iter().zip(weights) {
            if *w != 0.0 {
                let (k_x, k_v) = stage[i];
                x += k_x * (w * h);
                v += k_v * (w * h);
            }
        }
        p.position = x;
        p.velocity = v;
    }
}

impl Integrator for Adaptive {
    fn part1(&mut self, _state: &mut State) {}

    fn part2(&mut self, state: &mut State, forces: &mut dyn FnMut(&mut State)) {
        let total = state.dt;
        let start = state.time;
        if total == 0.0 {
            return;
        }

        let mut h = match self.substep {
            Some(h) if h.signum() == total.signum() && h.abs() < total.abs() => h,
            _ => total,
        };
        let mut done = 0.0;
        let mut attempts = 0;
        let mut fresh = true;
        let mut uncontrolled = false;

        loop {
            let remaining = total - done;
            let last = uncontrolled || h.abs() >= remaining.abs();
            if last {
                h = remaining;
            }

            if !fresh {
                state.time = start + done;
                forces(state);
            }
            let base = snapshot(state);
            let first = read_stage(state);
            let error = self.attempt(state, &base, first, start + done, h, forces);
            fresh = false;
            attempts += 1;

            let floor = self.min_dt > 0.0 && h.abs() <= self.min_dt;
            if error <= 1.0 || floor || uncontrolled {
                if last {
                    break;
                }
                self.substep = Some(h);
                done += h;
            } else if attempts >= self.max_attempts {
                self.iterations_max_exceeded += 1;
                warn!(
                    time = start + done,
                    substep = h,
                    "adaptive integrator exceeded its sub-step attempts"
                );
                restore(state, &base);
                uncontrolled = true;
                continue;
            } else {
                restore(state, &base);
            }

            let factor = if error > 0.0 {
                (SAFETY * error.powf(-0.2)).clamp(MAX_SHRINK, MAX_GROWTH)
            } else {
                MAX_GROWTH
            };
            h *= factor;
            if self.min_dt > 0.0 && h.abs() < self.min_dt {
                h = self.min_dt.copysign(total);
            }
        }

        state.time = start + total;
    }

    fn synchronize(&mut self, _state: &mut State) {}

    fn is_synchronized(&self) -> bool {
        true
    }

    fn reset_coordinates(&mut self) {}
}
