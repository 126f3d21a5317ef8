//! Force evaluation.
//!
//! Both evaluators overwrite every acceleration: real particles feel the
//! active sources, variational particles start at zero until
//! [`Gravity::evaluate_variational`](orrery_core::Gravity::evaluate_variational)
//! writes their linearised accelerations.

mod direct;
mod tree;

pub use direct::DirectGravity;
pub use tree::TreeGravity;

use orrery_core::{Particle, State, Vector3};

/// Softened field (per unit G) at `position` from `sources`, skipping the
/// source at index `skip`.
fn field_at(
    sources: &[Particle],
    position: &Vector3<f64>,
    skip: usize,
    eps2: f64,
) -> Vector3<f64> {
    sources
        .iter()
        .enumerate()
        .filter(|&(j, _)| j != skip)
        .fold(Vector3::<f64>::zeros(), |acc, (_, source)| {
            let r = source.position - position;
            let s2 = r.norm_squared() + eps2;
            if s2 == 0.0 {
                return acc;
            }
            acc + r * (source.mass / (s2 * s2.sqrt()))
        })
}

/// Linearised field change for a displacement `delta` at `position`, holding
/// every source other than `skip` fixed.
fn tidal_at(
    sources: &[Particle],
    position: &Vector3<f64>,
    delta: &Vector3<f64>,
    skip: usize,
    eps2: f64,
) -> Vector3<f64> {
    sources
        .iter()
        .enumerate()
        .filter(|&(j, _)| j != skip)
        .fold(Vector3::<f64>::zeros(), |acc, (_, source)| {
            let r = source.position - position;
            let s2 = r.norm_squared() + eps2;
            if s2 == 0.0 {
                return acc;
            }
            let s3 = s2 * s2.sqrt();
            let s5 = s3 * s2;
            acc + (r * (3.0 * r.dot(delta) / s5) - delta / s3) * source.mass
        })
}

/// Writes variational accelerations. Variational particle `k` is the
/// displacement of real particle `k`; unpaired ones get zero.
fn accelerate_variational(state: &mut State) {
    let real = state.real_count();
    let active = state.active_count();
    let g = state.gravity_constant;
    let eps2 = state.softening * state.softening;

    let tidal: Vec<Vector3<f64>> = {
        let particles = state.particles();
        let sources = &particles[..active];
        particles[real..]
            .iter()
            .enumerate()
            .map(|(k, v)| match particles[..real].get(k) {
                Some(base) => tidal_at(sources, &base.position, &v.position, k, eps2) * g,
                None => Vector3::zeros(),
            })
            .collect()
    };

    for (p, a) in state.particles_mut()[real..].iter_mut().zip(tidal) {
        p.acceleration = a;
    }
}
