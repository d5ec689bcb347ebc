//! Bundles of the capabilities one equation family provides.
//!
//! The time stepper is generic over a single [`Description`] instead of
//! three loosely related type parameters. Concrete bundles are selected
//! from [`EquationConfig`](crate::config::EquationConfig) at start-up.

use super::{Euler, HyperbolicSystem, ShallowWater};
use crate::config::{LimiterConfig, RiemannConfig};
use crate::limiter::{EulerLimiter, Limiter, ShallowWaterLimiter};
use crate::riemann::{EulerRiemannSolver, RiemannSolver, ShallowWaterRiemannSolver};

/// System, wave speed estimator and limiter of one equation family.
pub trait Description<const DIM: usize, const N: usize>: Send + Sync {
    type System: HyperbolicSystem<DIM, N>;
    type RiemannSolver: RiemannSolver<DIM, N>;
    type Limiter: Limiter<DIM, N>;

    fn system(&self) -> &Self::System;
    fn riemann_solver(&self) -> &Self::RiemannSolver;
    fn limiter(&self) -> &Self::Limiter;
}

/// Plain bundle of the three components.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EquationDescription<S, R, L> {
    pub system: S,
    pub riemann_solver: R,
    pub limiter: L,
}

impl<const DIM: usize, const N: usize, S, R, L> Description<DIM, N> for EquationDescription<S, R, L>
where
    S: HyperbolicSystem<DIM, N>,
    R: RiemannSolver<DIM, N>,
    L: Limiter<DIM, N>,
{
    type System = S;
    type RiemannSolver = R;
    type Limiter = L;

    fn system(&self) -> &S {
        &self.system
    }

    fn riemann_solver(&self) -> &R {
        &self.riemann_solver
    }

    fn limiter(&self) -> &L {
        &self.limiter
    }
}

/// Compressible Euler equations of a polytropic gas.
pub type EulerDescription<const DIM: usize> =
    EquationDescription<Euler<DIM>, EulerRiemannSolver<DIM>, EulerLimiter<DIM>>;

/// Shallow water equations over a flat bottom.
pub type ShallowWaterDescription<const DIM: usize> = EquationDescription<
    ShallowWater<DIM>,
    ShallowWaterRiemannSolver<DIM>,
    ShallowWaterLimiter<DIM>,
>;

impl<const DIM: usize> EulerDescription<DIM> {
    /// Closed-form Riemann solver and limiter for the given gas.
    pub fn new(system: Euler<DIM>) -> Self {
        Self {
            system,
            riemann_solver: EulerRiemannSolver::new(system),
            limiter: EulerLimiter::new(system),
        }
    }

    /// Apply refinement settings from the configuration.
    pub fn from_config(system: Euler<DIM>, riemann: &RiemannConfig, limiter: &LimiterConfig) -> Self {
        Self {
            system,
            riemann_solver: EulerRiemannSolver::new(system)
                .with_newton(riemann.newton_max_iter, riemann.newton_tolerance),
            limiter: EulerLimiter::new(system)
                .with_newton(limiter.newton_max_iter, limiter.newton_tolerance),
        }
    }
}

impl<const DIM: usize> ShallowWaterDescription<DIM> {
    pub fn new(system: ShallowWater<DIM>) -> Self {
        Self {
            system,
            riemann_solver: ShallowWaterRiemannSolver::new(system),
            limiter: ShallowWaterLimiter::new(system),
        }
    }

    /// Apply refinement settings from the configuration.
    pub fn from_config(
        system: ShallowWater<DIM>,
        riemann: &RiemannConfig,
        limiter: &LimiterConfig,
    ) -> Self {
        Self {
            system,
            riemann_solver: ShallowWaterRiemannSolver::new(system)
                .with_newton(riemann.newton_max_iter, riemann.newton_tolerance),
            limiter: ShallowWaterLimiter::new(system)
                .with_newton(limiter.newton_max_iter, limiter.newton_tolerance),
        }
    }
}
