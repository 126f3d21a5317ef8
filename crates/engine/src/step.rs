use orrery_core::{Gravity, Hook, Hooks, Integrator, SpatialIndex, State};
use tracing::trace;

use crate::{Simulation, Subsystems};

/// Advances the simulation by one step of `state.dt`.
///
/// Phases run in this order, each skipped when its capability or hook is
/// absent:
///
/// 1. integrator `part1`
/// 2. boundary check
/// 3. spatial index update, then particle exchange and a second update
/// 4. index moments and essential tree exchange, then force evaluation:
///    gravity, variational accelerations, `additional_forces`
/// 5. integrator `part2`, which may re-run the force path for extra stages
/// 6. `post_timestep_modifications` on synchronized data, after which the
///    integrator rebuilds its internal coordinates
/// 7. boundary check
/// 8. collision search and resolution on synchronized data
///
/// Requires at least one particle. The particle count may shrink but never
/// grows.
pub fn step(sim: &mut Simulation) {
    let Simulation {
        state,
        integrator,
        subsystems,
        hooks,
    } = sim;
    let Subsystems {
        boundary,
        gravity,
        index,
        collisions,
        exchange,
    } = subsystems;

    integrator.part1(state);
    trace!(time = state.time, "part1");

    boundary.check(state);

    if let Some(index) = index.as_deref_mut() {
        index.update(state);
    }
    if let Some(exchange) = exchange.as_deref_mut() {
        exchange.distribute_particles(state);
        if let Some(index) = index.as_deref_mut() {
            index.update(state);
        }
    }

    if let Some(index) = index.as_deref_mut() {
        index.update_gravity_data(state);
        if let Some(exchange) = exchange.as_deref_mut() {
            index.prepare_essential_tree(state);
            exchange.distribute_essential_tree(state, index);
        }
    }

    accelerate(
        state,
        &mut **gravity,
        as_index(index),
        &mut hooks.additional_forces,
    );
    trace!(particles = state.particle_count(), "forces evaluated");

    integrator.part2(state, &mut |state: &mut State| {
        if let Some(index) = index.as_deref_mut() {
            index.update(state);
            index.update_gravity_data(state);
        }
        accelerate(
            state,
            &mut **gravity,
            as_index(index),
            &mut hooks.additional_forces,
        );
    });
    trace!(time = state.time, "part2");

    if hooks.post_timestep_modifications.is_some() {
        integrator.synchronize(state);
        Hooks::run(&mut hooks.post_timestep_modifications, state);
        integrator.reset_coordinates();
    }

    boundary.check(state);

    if let Some(collisions) = collisions.as_deref_mut() {
        integrator.synchronize(state);
        collisions.search(state);
        let resolved = collisions.resolve(state);
        if resolved > 0 {
            trace!(resolved, particles = state.particle_count(), "collisions");
            integrator.reset_coordinates();
        }
    }
}

fn as_index(index: &Option<Box<dyn SpatialIndex + Send>>) -> Option<&dyn SpatialIndex> {
    index.as_deref().map(|index| index as &dyn SpatialIndex)
}

/// Writes every acceleration for the current positions.
fn accelerate(
    state: &mut State,
    gravity: &mut (dyn Gravity + Send),
    index: Option<&dyn SpatialIndex>,
    additional_forces: &mut Option<Hook>,
) {
    gravity.evaluate(state, index);
    if state.variational_count() > 0 {
        gravity.evaluate_variational(state);
    }
    Hooks::run(additional_forces, state);
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use orrery_core::{Config, IntegratorKind, Particle, Vector3};
    use orrery_solvers::{DirectCollisions, Octree, Resolution, Scheme, TreeGravity};

    use crate::initialize;

    fn sim(kind: IntegratorKind) -> Simulation {
        initialize(&Config {
            show_banner: false,
            seed: Some(3),
            dt: 0.01,
            integrator: kind,
            ..Config::default()
        })
        .expect("valid config")
    }

    #[test]
    fn advances_time_by_one_step() {
        for kind in [
            IntegratorKind::Adaptive,
            IntegratorKind::Symplectic,
            IntegratorKind::Leapfrog,
        ] {
            let mut sim = sim(kind);
            sim.state
                .add(Particle::new(1.0, Vector3::zeros(), Vector3::zeros()))
                .unwrap();

            for _ in 0..7 {
                step(&mut sim);
            }

            assert_relative_eq!(sim.state.time, 0.07, epsilon = 1e-14);
        }
    }

    #[test]
    fn additional_forces_are_added_after_gravity() {
        let mut sim = sim(IntegratorKind::Leapfrog);
        sim.state
            .add(Particle::massless(Vector3::zeros(), Vector3::zeros()))
            .unwrap();
        sim.hooks.additional_forces = Some(Box::new(|state: &mut State| {
            for p in state.particles_mut() {
                p.acceleration.x += 2.0;
            }
        }));

        step(&mut sim);

        let p = sim.state.particles()[0];
        assert_relative_eq!(p.velocity.x, 0.02, epsilon = 1e-15);
        assert_relative_eq!(p.position.x, 0.5 * 2.0 * 0.01 * 0.01, epsilon = 1e-15);
    }

    #[test]
    fn tree_force_path_matches_direct_for_a_pair() {
        let mut direct = sim(IntegratorKind::Leapfrog);
        direct
            .state
            .add(Particle::new(1.0, Vector3::zeros(), Vector3::zeros()))
            .unwrap();
        direct
            .state
            .add(Particle::new(1.0, Vector3::x(), Vector3::zeros()))
            .unwrap();
        let mut tree = sim(IntegratorKind::Leapfrog);
        tree.state = direct.state.clone();
        tree.subsystems.gravity = Box::new(TreeGravity::new(0.5));
        tree.subsystems.index = Some(Box::new(Octree::new()));

        step(&mut direct);
        step(&mut tree);

        for (a, b) in direct.state.particles().iter().zip(tree.state.particles()) {
            assert_relative_eq!(a.position, b.position, epsilon = 1e-14);
        }
    }

    #[test]
    fn modification_hook_sees_synchronized_particles() {
        let mut sim = sim(IntegratorKind::Symplectic);
        if let Scheme::Symplectic(inner) = &mut sim.integrator {
            inner.safe_mode = false;
        }
        sim.state
            .add(Particle::new(1.0, Vector3::zeros(), Vector3::zeros()))
            .unwrap();
        sim.state
            .add(Particle::new(1e-3, Vector3::x(), Vector3::y()))
            .unwrap();
        sim.hooks.post_timestep_modifications = Some(Box::new(|state: &mut State| {
            state.particles_mut()[1].mass = 2e-3;
        }));

        step(&mut sim);

        assert!(sim.integrator.is_synchronized());
        assert_eq!(sim.state.particles()[1].mass, 2e-3);
    }

    #[test]
    fn collisions_shrink_the_particle_count() {
        let mut sim = sim(IntegratorKind::Leapfrog);
        sim.state
            .add(Particle::new(1.0, Vector3::zeros(), Vector3::x()).with_radius(0.1))
            .unwrap();
        sim.state
            .add(Particle::new(1.0, Vector3::new(0.15, 0.0, 0.0), -Vector3::x()).with_radius(0.1))
            .unwrap();
        sim.subsystems.collisions = Some(Box::new(DirectCollisions::new(Resolution::Merge)));

        step(&mut sim);

        assert_eq!(sim.state.particle_count(), 1);
        assert_relative_eq!(sim.state.particles()[0].mass, 2.0);
        assert_relative_eq!(sim.state.momentum(), Vector3::zeros(), epsilon = 1e-12);
    }
}
