use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Selects the integrator backend variant.
///
/// Exactly one variant is active per simulation; its scratch state is only
/// meaningful for that variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegratorKind {
    /// High-accuracy embedded Runge-Kutta with adaptive sub-stepping.
    #[default]
    Adaptive,

    /// Drift-kick-drift in barycentric coordinates with lazy synchronization.
    Symplectic,

    /// Plain drift-kick-drift in the inertial frame.
    Leapfrog,
}

/// Initialization parameters for a simulation.
///
/// All fields have defaults, so a partial TOML or JSON document deserializes
/// into a usable config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Emit the identifying banner (at most once per process).
    pub show_banner: bool,

    /// Seed for the simulation's random source. `None` seeds from OS entropy.
    pub seed: Option<u64>,

    /// Side length of one root box. `None` means an unbounded domain.
    pub box_size: Option<f64>,

    /// Number of root boxes along x, y and z. Each must be at least 1.
    pub root_boxes: [usize; 3],

    /// Initial signed step size.
    pub dt: f64,

    pub gravity_constant: f64,
    pub softening: f64,
    pub integrator: IntegratorKind,
}

/// Errors that can occur when validating a [`Config`].
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum ConfigError {
    #[error("number of root boxes must be at least 1 along {axis}, got {value}")]
    RootBoxes { axis: char, value: usize },

    #[error("box size must be finite and positive, got {0}")]
    BoxSize(f64),

    #[error("timestep must be finite and non-zero, got {0}")]
    Timestep(f64),

    #[error("softening must be finite and non-negative, got {0}")]
    Softening(f64),
}

impl Default for Config {
    fn default() -> Self {
        Self {
            show_banner: true,
            seed: None,
            box_size: None,
            root_boxes: [1, 1, 1],
            dt: 0.001,
            gravity_constant: 1.0,
            softening: 0.0,
            integrator: IntegratorKind::default(),
        }
    }
}

impl Config {
    /// Checks that the config describes a usable simulation.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint as a [`ConfigError`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (axis, &value) in ['x', 'y', 'z'].into_iter().zip(&self.root_boxes) {
            if value < 1 {
                return Err(ConfigError::RootBoxes { axis, value });
            }
        }
        if let Some(size) = self.box_size {
            if !size.is_finite() || size <= 0.0 {
                return Err(ConfigError::BoxSize(size));
            }
        }
        if !self.dt.is_finite() || self.dt == 0.0 {
            return Err(ConfigError::Timestep(self.dt));
        }
        if !self.softening.is_finite() || self.softening < 0.0 {
            return Err(ConfigError::Softening(self.softening));
        }
        Ok(())
    }
}
