//! Run-time configuration.
//!
//! All parameters have defaults, so an empty TOML document is a valid
//! Euler configuration:
//!
//! ```toml
//! [equation]
//! type = "shallow_water"
//! gravity = 9.81
//!
//! [hyperbolic]
//! cfl = 0.5
//! id_violation_strategy = "raise_exception"
//!
//! [time]
//! scheme = "ssp_rk3"
//! final_time = 0.2
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Reaction to an invariant-domain or CFL violation detected after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdViolationStrategy {
    /// Log a warning and accept the step
    #[default]
    Warn,
    /// Signal a restart to the caller
    RaiseException,
}

/// Equation family and its constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EquationConfig {
    Euler {
        #[serde(default = "default_gamma")]
        gamma: f64,
    },
    ShallowWater {
        #[serde(default = "default_gravity")]
        gravity: f64,
        #[serde(default = "default_dry_tolerance")]
        dry_tolerance: f64,
    },
}

fn default_gamma() -> f64 {
    1.4
}

fn default_gravity() -> f64 {
    9.81
}

fn default_dry_tolerance() -> f64 {
    1e-6
}

impl Default for EquationConfig {
    fn default() -> Self {
        Self::Euler {
            gamma: default_gamma(),
        }
    }
}

/// Parameters of a single hyperbolic step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HyperbolicConfig {
    /// Courant number in (0, 1]
    pub cfl: f64,
    /// Apply the limited high-order correction
    pub high_order: bool,
    /// Include the consistent-mass correction in the antidiffusive fluxes
    pub mass_correction: bool,
    /// Number of limiter passes (at least 1)
    pub limiter_passes: usize,
    /// Allowed relative excess of τ over tau_max
    pub tau_tolerance: f64,
    /// Reaction to violations
    pub id_violation_strategy: IdViolationStrategy,
    /// Exponent of the smoothness indicator
    pub indicator_power: i32,
}

impl Default for HyperbolicConfig {
    fn default() -> Self {
        Self {
            cfl: 0.9,
            high_order: true,
            mass_correction: true,
            limiter_passes: 2,
            tau_tolerance: 0.1,
            id_violation_strategy: IdViolationStrategy::Warn,
            indicator_power: 2,
        }
    }
}

impl HyperbolicConfig {
    pub fn with_cfl(mut self, cfl: f64) -> Self {
        self.cfl = cfl;
        self
    }

    /// Disable or enable the high-order correction.
    pub fn with_high_order(mut self, high_order: bool) -> Self {
        self.high_order = high_order;
        self
    }

    pub fn with_mass_correction(mut self, mass_correction: bool) -> Self {
        self.mass_correction = mass_correction;
        self
    }

    pub fn with_limiter_passes(mut self, passes: usize) -> Self {
        self.limiter_passes = passes;
        self
    }

    pub fn with_strategy(mut self, strategy: IdViolationStrategy) -> Self {
        self.id_violation_strategy = strategy;
        self
    }
}

/// Limiter line search settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimiterConfig {
    pub newton_max_iter: usize,
    pub newton_tolerance: f64,
    /// Scale of the mesh-dependent bound relaxation (0 = exact local bounds)
    pub relaxation_factor: f64,
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self {
            newton_max_iter: 0,
            newton_tolerance: 1e-10,
            relaxation_factor: 0.0,
        }
    }
}

/// Riemann solver refinement settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiemannConfig {
    pub newton_max_iter: usize,
    pub newton_tolerance: f64,
}

impl Default for RiemannConfig {
    fn default() -> Self {
        Self {
            newton_max_iter: 0,
            newton_tolerance: 1e-10,
        }
    }
}

/// Explicit Runge-Kutta scheme of the time integrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeScheme {
    ForwardEuler,
    SspRk2,
    #[default]
    SspRk3,
    Erk33,
}

/// Time loop settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeConfig {
    pub scheme: TimeScheme,
    /// Attempts with halved τ before giving up on a step
    pub max_restarts: usize,
    pub final_time: f64,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            scheme: TimeScheme::SspRk3,
            max_restarts: 8,
            final_time: 1.0,
        }
    }
}

/// Complete simulation configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub equation: EquationConfig,
    pub hyperbolic: HyperbolicConfig,
    pub limiter: LimiterConfig,
    pub riemann: RiemannConfig,
    pub time: TimeConfig,
}

impl SimulationConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    pub fn with_equation(mut self, equation: EquationConfig) -> Self {
        self.equation = equation;
        self
    }

    pub fn with_hyperbolic(mut self, hyperbolic: HyperbolicConfig) -> Self {
        self.hyperbolic = hyperbolic;
        self
    }

    pub fn with_time(mut self, time: TimeConfig) -> Self {
        self.time = time;
        self
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.equation {
            EquationConfig::Euler { gamma } => {
                if !(gamma > 1.0 && gamma <= 5.0 / 3.0) {
                    return Err(ConfigError::invalid(format!(
                        "gamma must lie in (1, 5/3], got {gamma}"
                    )));
                }
            }
            EquationConfig::ShallowWater {
                gravity,
                dry_tolerance,
            } => {
                if !(gravity > 0.0) {
                    return Err(ConfigError::invalid(format!(
                        "gravity must be positive, got {gravity}"
                    )));
                }
                if !(dry_tolerance >= 0.0) {
                    return Err(ConfigError::invalid(format!(
                        "dry_tolerance must be non-negative, got {dry_tolerance}"
                    )));
                }
            }
        }

        let h = &self.hyperbolic;
        if !(h.cfl > 0.0 && h.cfl <= 1.0) {
            return Err(ConfigError::invalid(format!(
                "cfl must lie in (0, 1], got {}",
                h.cfl
            )));
        }
        if h.limiter_passes == 0 {
            return Err(ConfigError::invalid("limiter_passes must be at least 1"));
        }
        if !(h.tau_tolerance >= 0.0) {
            return Err(ConfigError::invalid("tau_tolerance must be non-negative"));
        }
        if h.indicator_power < 1 {
            return Err(ConfigError::invalid("indicator_power must be at least 1"));
        }
        if !(self.limiter.relaxation_factor >= 0.0) {
            return Err(ConfigError::invalid(
                "relaxation_factor must be non-negative",
            ));
        }
        if !(self.time.final_time >= 0.0) {
            return Err(ConfigError::invalid("final_time must be non-negative"));
        }
        Ok(())
    }
}
