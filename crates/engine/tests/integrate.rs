use approx::assert_relative_eq;
use orrery::{
    Config, Event, Integrator, IntegratorKind, Monitor, Particle, Scheme, Simulation, State,
    Status, Vector3, initialize, integrate, integrate_unobserved, step,
};
use orrery_solvers::{DirectCollisions, Resolution, Symplectic};

fn simulation(kind: IntegratorKind, dt: f64) -> Simulation {
    initialize(&Config {
        show_banner: false,
        seed: Some(2024),
        dt,
        integrator: kind,
        ..Config::default()
    })
    .expect("valid config")
}

/// Particles that feel no force.
fn force_free(dt: f64, particles: &[Particle]) -> Simulation {
    let mut sim = simulation(IntegratorKind::Leapfrog, dt);
    sim.state.gravity_constant = 0.0;
    for &p in particles {
        sim.state.add(p).expect("real particle");
    }
    sim
}

fn at(x: f64, vx: f64) -> Particle {
    Particle::new(1.0, Vector3::new(x, 0.0, 0.0), Vector3::new(vx, 0.0, 0.0))
}

#[test]
fn time_advances_by_whole_steps() {
    let mut sim = force_free(0.125, &[at(0.0, 1.0)]);

    let solution = integrate_unobserved(&mut sim, 1.0, &Monitor::default());

    assert_eq!(solution.status, Status::Complete);
    assert_eq!(solution.steps, 8);
    assert_relative_eq!(sim.state.time, 8.0 * 0.125);
    assert_relative_eq!(sim.state.particles()[0].position.x, 1.0, epsilon = 1e-12);
}

#[test]
fn without_exact_finish_the_last_step_may_overshoot() {
    let mut sim = force_free(0.1, &[at(0.0, 0.0)]);

    let solution = integrate_unobserved(&mut sim, 0.35, &Monitor::default());

    assert_eq!(solution.steps, 4);
    assert_relative_eq!(sim.state.time, 0.4, epsilon = 1e-12);
    assert_eq!(sim.state.dt, 0.1);
}

#[test]
fn exact_finish_lands_on_target_and_restores_dt() {
    let mut sim = force_free(0.1, &[at(0.0, 1.0)]);
    sim.state.exact_finish_time = true;

    let solution = integrate_unobserved(&mut sim, 0.35, &Monitor::default());

    assert_eq!(solution.status, Status::Complete);
    assert_eq!(solution.steps, 4);
    assert_eq!(sim.state.time, 0.35);
    assert_eq!(sim.state.dt, 0.1);
    assert_relative_eq!(sim.state.particles()[0].position.x, 0.35, epsilon = 1e-12);
}

#[test]
fn exact_finish_with_a_first_step_past_the_target() {
    let mut sim = force_free(1.0, &[at(0.0, 2.0)]);
    sim.state.exact_finish_time = true;

    let solution = integrate_unobserved(&mut sim, 0.25, &Monitor::default());

    assert_eq!(solution.steps, 1);
    assert_eq!(sim.state.time, 0.25);
    assert_eq!(sim.state.dt, 1.0);
    assert_relative_eq!(sim.state.particles()[0].position.x, 0.5, epsilon = 1e-12);
}

#[test]
fn no_particles_is_fatal_and_leaves_time_alone() {
    let mut sim = simulation(IntegratorKind::Adaptive, 0.01);
    sim.state.time = 3.0;
    sim.state.exact_finish_time = true;
    let finished = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
    let flag = std::sync::Arc::clone(&finished);
    sim.hooks.finished = Some(Box::new(move |_: &mut State| {
        flag.store(true, std::sync::atomic::Ordering::SeqCst);
    }));

    let solution = integrate_unobserved(&mut sim, 3.005, &Monitor::default());

    assert_eq!(solution.status, Status::NoParticles);
    assert_eq!(solution.status.code(), 1);
    assert_eq!(solution.steps, 0);
    assert_eq!(sim.state.time, 3.0);
    assert_eq!(sim.state.dt, 0.01);
    assert!(finished.load(std::sync::atomic::Ordering::SeqCst));
}

#[test]
fn escape_is_detected_and_named() {
    let d = 4.0;
    let mut sim = force_free(0.1, &[at(0.0, 0.0), at(d, 0.0)]);
    sim.state.exact_finish_time = true;

    let solution = integrate_unobserved(&mut sim, 0.1, &Monitor::new(d / 2.0, 0.0));

    assert_eq!(solution.status, Status::Escape);
    assert_eq!(solution.status.code(), 2);
    assert_eq!(solution.steps, 1);
    assert_eq!(solution.escapes.len(), 1);
    assert_eq!(solution.escapes[0].index, 1);
    assert_relative_eq!(solution.escapes[0].distance, d);
}

#[test]
fn escape_does_not_stop_the_run() {
    let mut sim = force_free(0.1, &[at(0.0, 0.0), at(5.0, 1.0)]);
    sim.state.exact_finish_time = true;

    let solution = integrate_unobserved(&mut sim, 1.0, &Monitor::new(1.0, 0.0));

    assert_eq!(solution.status, Status::Escape);
    assert_eq!(sim.state.time, 1.0);
    assert_eq!(solution.steps, 10);
    assert_eq!(solution.escapes.len(), 1);
    assert_eq!(solution.escapes[0].step, 1);
}

#[test]
fn escapes_are_recorded_once_per_entry() {
    let mut sim = force_free(0.5, &[at(-3.0, 2.0)]);
    sim.state.exact_finish_time = true;
    let mut flagged = Vec::new();

    let solution = integrate(&mut sim, 3.0, &Monitor::new(1.0, 0.0), |event: &Event<'_>| {
        flagged.push(event.escapes.len());
        None
    });

    assert_eq!(flagged, vec![0, 1, 0, 0, 0, 1, 1]);
    let steps: Vec<_> = solution.escapes.iter().map(|e| e.step).collect();
    assert_eq!(steps, vec![1, 5]);
}

#[test]
fn a_lingering_pair_is_one_encounter() {
    let mut sim = force_free(0.1, &[at(0.0, 0.0), at(0.05, 0.0)]);
    sim.state.exact_finish_time = true;

    let solution = integrate_unobserved(&mut sim, 10.0, &Monitor::new(0.0, 0.1));

    assert_eq!(solution.status, Status::CloseEncounter);
    assert!(solution.steps >= 100);
    assert_eq!(solution.encounters.len(), 1);
}

#[test]
fn monitoring_sees_synchronized_particles() {
    let min_d = 1.0;
    let mut sim = simulation(IntegratorKind::Symplectic, 0.2);
    sim.integrator = Scheme::from(Symplectic::unsafe_mode());
    sim.state.gravity_constant = 0.0;
    sim.state.add(at(-min_d, 3.0)).unwrap();
    sim.state.add(at(min_d, -3.0)).unwrap();
    let mut separations = Vec::new();

    let solution = integrate(&mut sim, 0.2, &Monitor::new(0.0, min_d), |event: &Event<'_>| {
        let p = event.state.particles();
        separations.push(p[0].distance_squared_to(&p[1]).sqrt());
        None
    });

    assert_eq!(solution.status, Status::CloseEncounter);
    assert_eq!(solution.encounters.len(), 1);
    assert_relative_eq!(solution.encounters[0].distance, 0.8, epsilon = 1e-12);
    assert_relative_eq!(separations[1], 0.8, epsilon = 1e-12);
}

#[test]
fn close_encounter_is_detected() {
    let min_d = 1.0;
    let mut sim = force_free(0.2, &[at(-min_d, 3.0), at(min_d, -3.0)]);
    sim.state.exact_finish_time = true;

    let solution = integrate_unobserved(&mut sim, 0.2, &Monitor::new(0.0, min_d));

    assert_eq!(solution.status, Status::CloseEncounter);
    assert_eq!(solution.status.code(), 3);
    assert_eq!(solution.encounters[0].pair, (0, 1));
    assert_relative_eq!(solution.encounters[0].distance, 0.8, epsilon = 1e-12);
}

#[test]
fn separating_pair_never_encounters() {
    let min_d = 1.0;
    let mut sim = force_free(0.2, &[at(-min_d, -3.0), at(min_d, 3.0)]);
    sim.state.exact_finish_time = true;

    let solution = integrate_unobserved(&mut sim, 1.0, &Monitor::new(0.0, min_d));

    assert_eq!(solution.status, Status::Complete);
    assert_eq!(solution.status.code(), 0);
    assert!(solution.encounters.is_empty());
}

#[test]
fn escape_wins_over_close_encounter() {
    let mut sim = force_free(0.1, &[at(10.0, 0.0), at(10.05, 0.0)]);

    let solution = integrate_unobserved(&mut sim, 0.1, &Monitor::new(5.0, 0.1));

    assert_eq!(solution.status, Status::Escape);
    assert_eq!(solution.escapes.len(), 2);
    assert_eq!(solution.encounters.len(), 1);
}

#[test]
fn synchronize_twice_changes_nothing() {
    let mut sim = simulation(IntegratorKind::Symplectic, 0.01);
    sim.integrator = Scheme::from(Symplectic::unsafe_mode());
    sim.state
        .add(Particle::new(1.0, Vector3::zeros(), Vector3::zeros()))
        .unwrap();
    sim.state
        .add(Particle::new(1e-3, Vector3::x(), Vector3::y()))
        .unwrap();
    for _ in 0..25 {
        step(&mut sim);
    }
    assert!(!sim.integrator.is_synchronized());

    sim.integrator.synchronize(&mut sim.state);
    let once = sim.state.clone();
    sim.integrator.synchronize(&mut sim.state);

    assert!(sim.integrator.is_synchronized());
    assert_eq!(sim.state.particles(), once.particles());
    assert_eq!(sim.state.time, once.time);
}

#[test]
fn particle_count_never_grows() {
    let mut sim = force_free(
        0.05,
        &[
            at(0.0, 1.0).with_radius(0.1),
            at(0.5, 0.0).with_radius(0.1),
            at(1.0, -1.0).with_radius(0.1),
            at(4.0, 0.0).with_radius(0.1),
        ],
    );
    sim.subsystems.collisions = Some(Box::new(DirectCollisions::new(Resolution::Merge)));
    let mut counts = Vec::new();

    integrate(&mut sim, 1.0, &Monitor::default(), |event: &Event<'_>| {
        counts.push(event.state.particle_count());
        None
    });

    assert!(counts.windows(2).all(|w| w[1] <= w[0]));
    assert_eq!(counts[0], 4);
    assert!(*counts.last().unwrap() < 4);
}

#[test]
fn backward_integration_mirrors_forward() {
    let mut forward = force_free(0.1, &[at(0.0, 1.0)]);
    let mut backward = force_free(-0.1, &[at(0.0, 1.0)]);
    forward.state.exact_finish_time = true;
    backward.state.exact_finish_time = true;

    let ahead = integrate_unobserved(&mut forward, 0.35, &Monitor::default());
    let behind = integrate_unobserved(&mut backward, -0.35, &Monitor::default());

    assert_eq!(ahead.steps, behind.steps);
    assert_eq!(backward.state.time, -0.35);
    assert_eq!(backward.state.dt, -0.1);
    assert_relative_eq!(
        backward.state.particles()[0].position.x,
        -forward.state.particles()[0].position.x,
        epsilon = 1e-12
    );
}

#[test]
fn backward_orbit_returns_to_its_start() {
    for kind in [
        IntegratorKind::Adaptive,
        IntegratorKind::Symplectic,
        IntegratorKind::Leapfrog,
    ] {
        let mut sim = simulation(kind, 0.01);
        sim.state.exact_finish_time = true;
        sim.state
            .add(Particle::new(1.0, Vector3::zeros(), Vector3::zeros()))
            .unwrap();
        sim.state
            .add(Particle::new(1e-6, Vector3::x(), Vector3::y()))
            .unwrap();
        let start = sim.state.particles()[1];

        integrate_unobserved(&mut sim, 1.234, &Monitor::default());
        sim.state.dt = -sim.state.dt;
        integrate_unobserved(&mut sim, 0.0, &Monitor::default());

        assert_eq!(sim.state.time, 0.0);
        assert_relative_eq!(sim.state.particles()[1].position, start.position, epsilon = 1e-4);
    }
}

#[test]
fn hook_cancellation_is_cooperative() {
    let mut sim = force_free(0.1, &[at(0.0, 1.0)]);
    sim.state.exact_finish_time = true;
    sim.hooks.post_timestep = Some(Box::new(|state: &mut State| {
        if state.time > 0.25 {
            state.exit_requested = true;
        }
    }));

    let solution = integrate_unobserved(&mut sim, 1.0, &Monitor::default());

    assert_eq!(solution.status, Status::Cancelled);
    assert_eq!(solution.status.code(), 0);
    assert_eq!(solution.steps, 3);
    assert_eq!(sim.state.dt, 0.1);
}
