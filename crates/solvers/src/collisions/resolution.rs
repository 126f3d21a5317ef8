use orrery_core::{Particle, State};

use super::Contact;

/// What happens to two particles in contact.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Resolution {
    /// Replace the pair with one particle that conserves mass, momentum, and
    /// volume. The survivor takes the lower index.
    #[default]
    Merge,

    /// Reflect the normal component of the relative velocity of an
    /// approaching pair, scaled by the coefficient of restitution.
    HardSphere { coefficient_of_restitution: f64 },
}

impl Resolution {
    /// Resolves `contacts` in order and returns how many were acted on.
    ///
    /// A particle takes part in at most one resolution per call; later
    /// contacts involving it are skipped.
    pub(crate) fn apply(self, state: &mut State, contacts: &[Contact]) -> usize {
        let real = state.real_count();
        let mut touched = vec![false; real];
        let mut removed = Vec::new();
        let mut resolved = 0;

        for &Contact { first, second } in contacts {
            if first >= real || second >= real || touched[first] || touched[second] {
                continue;
            }

            let particles = state.particles_mut();
            let (a, b) = (particles[first], particles[second]);
            let acted = match self {
                Self::Merge => {
                    let (keep, drop) = (first.min(second), first.max(second));
                    particles[keep] = merge(&a, &b);
                    removed.push(drop);
                    true
                }
                Self::HardSphere {
                    coefficient_of_restitution,
                } => match bounce(&a, &b, coefficient_of_restitution) {
                    Some((a, b)) => {
                        particles[first] = a;
                        particles[second] = b;
                        true
                    }
                    None => false,
                },
            };

            if acted {
                touched[first] = true;
                touched[second] = true;
                resolved += 1;
            }
        }

        removed.sort_unstable_by(|a, b| b.cmp(a));
        for index in removed {
            state.remove(index);
        }

        resolved
    }
}

/// Perfect merger at the centre of mass.
fn merge(a: &Particle, b: &Particle) -> Particle {
    let mass = a.mass + b.mass;
    let (position, velocity) = if mass > 0.0 {
        (
            (a.position * a.mass + b.position * b.mass) / mass,
            (a.momentum() + b.momentum()) / mass,
        )
    } else {
        (
            0.5 * (a.position + b.position),
            0.5 * (a.velocity + b.velocity),
        )
    };

    Particle {
        position,
        velocity,
        acceleration: a.acceleration,
        mass,
        radius: (a.radius.powi(3) + b.radius.powi(3)).cbrt(),
    }
}

/// Updated velocities of an approaching pair, or `None` if the pair is
/// already separating.
fn bounce(a: &Particle, b: &Particle, restitution: f64) -> Option<(Particle, Particle)> {
    let offset = b.position - a.position;
    let distance = offset.norm();
    if distance == 0.0 {
        return None;
    }
    let normal = offset / distance;
    let approach = (b.velocity - a.velocity).dot(&normal);
    if approach >= 0.0 {
        return None;
    }

    let mass = a.mass + b.mass;
    let (share_a, share_b) = if mass > 0.0 {
        (b.mass / mass, a.mass / mass)
    } else {
        (0.5, 0.5)
    };
    let impulse = (1.0 + restitution) * approach;

    let mut a = *a;
    let mut b = *b;
    a.velocity += normal * (impulse * share_a);
    b.velocity -= normal * (impulse * share_b);
    Some((a, b))
}
