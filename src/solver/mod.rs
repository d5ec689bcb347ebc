//! Invariant-domain preserving explicit step.
//!
//! One call to [`HyperbolicModule::step`] performs:
//!
//! 1. graph viscosity `d_ij` from the wave speed estimator and the CFL
//!    step size `tau_max`
//! 2. the low-order update `U^L`, invariant-domain preserving for
//!    `τ ≤ tau_max`
//! 3. the high-order residual, optionally blended with earlier stages of a
//!    multi-stage method, and the antidiffusive corrections `P_ij`
//! 4. convex limiting of `P_ij` against bounds computed from `U^L`
//! 5. admissibility and CFL checks, reported as a [`StepOutcome`]
//!
//! The module owns its scratch buffers; callers own the states.

mod diagnostics;
mod hyperbolic_module;
mod indicator;
pub(crate) mod parallel;

pub use diagnostics::{conserved_totals, count_inadmissible};
pub use hyperbolic_module::HyperbolicModule;
pub use indicator::smoothness_indicator;

use crate::graph::SparseMatrix;
use crate::types::State;

/// Result of a step that did not fail outright.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StepOutcome {
    /// The new state is valid.
    Accepted { tau: f64, tau_max: f64 },
    /// The step violated admissibility or the CFL tolerance; the output
    /// buffer must be discarded and the step retried with a smaller τ.
    Restart { tau: f64, tau_max: f64 },
}

impl StepOutcome {
    /// Step size used.
    pub fn tau(&self) -> f64 {
        match *self {
            Self::Accepted { tau, .. } | Self::Restart { tau, .. } => tau,
        }
    }

    /// Largest admissible step size of the old state.
    pub fn tau_max(&self) -> f64 {
        match *self {
            Self::Accepted { tau_max, .. } | Self::Restart { tau_max, .. } => tau_max,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

/// An earlier stage of a multi-stage method.
///
/// Its high-order residual `R_i(U^s, d^{H,s})` enters the blended residual
/// with the given weight:
///
/// ```text
/// R̃_i = (1 - Σ_s ω_s) R_i(U, d^H) + Σ_s ω_s R_i(U^s, d^{H,s})
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Stage<'s, const N: usize> {
    pub state: &'s [State<N>],
    /// High-order viscosity recorded when the stage was computed
    pub viscosity: &'s SparseMatrix<f64>,
    pub weight: f64,
}
