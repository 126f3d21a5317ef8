use std::sync::Once;

use orrery_core::{Config, ConfigError, Hooks, State};
use orrery_solvers::Scheme;
use tracing::info;

use crate::{Simulation, Subsystems};

static BANNER: Once = Once::new();

/// Creates a simulation with default subsystems from `config`.
///
/// The state starts at `time = 0` with no particles, every particle active,
/// and no hooks registered. The integrator is the configured variant with its
/// default scratch state. The banner is logged at most once per process, and
/// only if `config.show_banner` is set.
///
/// # Errors
///
/// Returns a [`ConfigError`] if `config` fails validation.
pub fn initialize(config: &Config) -> Result<Simulation, ConfigError> {
    config.validate()?;

    if config.show_banner {
        BANNER.call_once(|| {
            info!(
                version = env!("CARGO_PKG_VERSION"),
                "orrery: an open source N-body engine"
            );
        });
    }

    let state = State::new(config);
    let [nx, ny, nz] = config.root_boxes;
    info!(
        nx,
        ny,
        nz,
        box_size = ?config.box_size,
        integrator = ?config.integrator,
        "initialized root boxes"
    );

    Ok(Simulation {
        state,
        integrator: Scheme::new(config.integrator),
        subsystems: Subsystems::default(),
        hooks: Hooks::default(),
    })
}
