//! Multi-stage time integration on top of the hyperbolic module.
//!
//! Every scheme is built from module steps that share one step size `τ`:
//!
//! | Scheme | Stages | Order | Δt per step |
//! |--------|--------|-------|-------------|
//! | [`TimeScheme::ForwardEuler`] | 1 | 1 | τ |
//! | [`TimeScheme::SspRk2`] | 2 | 2 | τ |
//! | [`TimeScheme::SspRk3`] | 3 | 3 | τ |
//! | [`TimeScheme::Erk33`] | 3 | 3 | 3τ |
//!
//! The SSP schemes take convex combinations of full module steps, so the
//! invariant domain is kept stage by stage. `Erk33` chains three module
//! steps and feeds the earlier stages into the blended high-order residual
//! instead.
//!
//! A stage that reports [`StepOutcome::Restart`] discards the whole step,
//! which is then retried with half the step size.

use tracing::{debug, info, warn};

use crate::config::{TimeConfig, TimeScheme};
use crate::equations::Description;
use crate::error::HyperbolicError;
use crate::graph::{GraphOperators, SparseMatrix};
use crate::solver::parallel::for_each_node;
use crate::solver::{HyperbolicModule, Stage, StepOutcome};
use crate::types::State;

// =============================================================================
// Scheme properties
// =============================================================================

impl TimeScheme {
    /// Human-readable name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ForwardEuler => "forward_euler",
            Self::SspRk2 => "ssp_rk2",
            Self::SspRk3 => "ssp_rk3",
            Self::Erk33 => "erk33",
        }
    }

    /// Order of accuracy.
    pub fn order(&self) -> usize {
        match self {
            Self::ForwardEuler => 1,
            Self::SspRk2 => 2,
            Self::SspRk3 | Self::Erk33 => 3,
        }
    }

    /// Number of module steps per time step.
    pub fn n_stages(&self) -> usize {
        match self {
            Self::ForwardEuler => 1,
            Self::SspRk2 => 2,
            Self::SspRk3 | Self::Erk33 => 3,
        }
    }

    /// Ratio of the time step `Δt` to the module step size `τ`.
    pub fn step_multiplier(&self) -> f64 {
        match self {
            Self::Erk33 => 3.0,
            _ => 1.0,
        }
    }
}

// =============================================================================
// Integrator
// =============================================================================

/// Summary of a [`TimeIntegrator::run`] call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunSummary {
    pub n_steps: usize,
    pub final_time: f64,
    /// Step attempts discarded and retried
    pub n_restarts: usize,
    /// Steps accepted despite a violation
    pub n_warnings: usize,
}

/// Explicit time integrator driving a [`HyperbolicModule`].
pub struct TimeIntegrator<'a, D, G, const DIM: usize, const N: usize>
where
    D: Description<DIM, N>,
    G: GraphOperators<DIM>,
{
    module: HyperbolicModule<'a, D, G, DIM, N>,
    scheme: TimeScheme,
    max_restarts: usize,
    stage_states: [Vec<State<N>>; 3],
    viscosities: [SparseMatrix<f64>; 2],
}

impl<'a, D, G, const DIM: usize, const N: usize> TimeIntegrator<'a, D, G, DIM, N>
where
    D: Description<DIM, N>,
    G: GraphOperators<DIM>,
{
    /// Wrap `module`, preparing it if needed.
    pub fn new(mut module: HyperbolicModule<'a, D, G, DIM, N>, config: &TimeConfig) -> Self {
        if !module.is_prepared() {
            module.prepare();
        }
        let graph = module.graph();
        let n = graph.n_nodes();
        let pattern = graph.sparsity().clone();

        Self {
            module,
            scheme: config.scheme,
            max_restarts: config.max_restarts,
            stage_states: std::array::from_fn(|_| vec![State::zero(); n]),
            viscosities: std::array::from_fn(|_| SparseMatrix::new(pattern.clone(), 0.0)),
        }
    }

    pub fn scheme(&self) -> TimeScheme {
        self.scheme
    }

    pub fn module(&self) -> &HyperbolicModule<'a, D, G, DIM, N> {
        &self.module
    }

    pub fn module_mut(&mut self) -> &mut HyperbolicModule<'a, D, G, DIM, N> {
        &mut self.module
    }

    /// Advance `u` from `t` by the largest admissible step.
    ///
    /// Returns the time step `Δt` actually taken.
    pub fn step(&mut self, u: &mut [State<N>], t: f64) -> Result<f64, HyperbolicError> {
        self.step_with_tau(u, t, 0.0)
    }

    /// Advance `u` from `t` with module step size `tau` (`0` selects
    /// `tau_max`), halving it on every restart.
    ///
    /// `u` is only modified by an accepted step.
    ///
    /// # Errors
    /// [`HyperbolicError::RestartLimitExceeded`] once `max_restarts` retries
    /// have been discarded, or any error of [`HyperbolicModule::step`].
    pub fn step_with_tau(
        &mut self,
        u: &mut [State<N>],
        t: f64,
        tau: f64,
    ) -> Result<f64, HyperbolicError> {
        let n = self.module.graph().n_nodes();
        if u.len() != n {
            return Err(HyperbolicError::size_mismatch(n, u.len()));
        }

        let multiplier = self.scheme.step_multiplier();
        let mut tau = tau;
        for attempt in 0..=self.max_restarts {
            match self.try_step(u, t, tau)? {
                StepOutcome::Accepted { tau, .. } => {
                    let dt = multiplier * tau;
                    self.module.apply_boundary_conditions(u, t + dt);
                    return Ok(dt);
                }
                StepOutcome::Restart { tau: rejected, tau_max } => {
                    tau = 0.5 * rejected;
                    debug!(attempt, rejected, tau_max, tau, "restarting step");
                }
            }
        }

        warn!(attempts = self.max_restarts + 1, t, "giving up on step");
        Err(HyperbolicError::RestartLimitExceeded {
            attempts: self.max_restarts + 1,
        })
    }

    /// Integrate `u` from `t_start` to `t_final`.
    ///
    /// The last step is shortened to land on `t_final`.
    pub fn run(
        &mut self,
        u: &mut [State<N>],
        t_start: f64,
        t_final: f64,
    ) -> Result<RunSummary, HyperbolicError> {
        let multiplier = self.scheme.step_multiplier();
        let restarts_before = self.module.n_restarts();
        let warnings_before = self.module.n_warnings();

        info!(
            scheme = self.scheme.name(),
            t_start,
            t_final,
            n_nodes = u.len(),
            "starting time integration"
        );

        let mut t = t_start;
        let mut n_steps = 0;
        while t < t_final {
            let tau_max = self.module.compute_tau_max(u)?;
            let remaining = (t_final - t) / multiplier;
            let tau = tau_max.min(remaining);
            if !(tau > 0.0) {
                return Err(HyperbolicError::InvalidTimeStep(tau));
            }

            let dt = self.step_with_tau(u, t, tau)?;
            t += dt;
            if (t_final - t).abs() <= 1e-12 * t_final.abs().max(1.0) {
                t = t_final;
            }
            n_steps += 1;
            debug!(step = n_steps, t, dt, "step accepted");
        }

        let summary = RunSummary {
            n_steps,
            final_time: t,
            n_restarts: self.module.n_restarts() - restarts_before,
            n_warnings: self.module.n_warnings() - warnings_before,
        };
        info!(
            n_steps,
            final_time = t,
            n_restarts = summary.n_restarts,
            n_warnings = summary.n_warnings,
            "time integration finished"
        );
        Ok(summary)
    }

    /// One attempt at a full step; `u` is overwritten only on acceptance.
    fn try_step(
        &mut self,
        u: &mut [State<N>],
        t: f64,
        tau: f64,
    ) -> Result<StepOutcome, HyperbolicError> {
        let Self {
            module,
            scheme,
            stage_states,
            viscosities,
            ..
        } = self;
        let [s1, s2, s3] = stage_states;

        // Stage 1 fixes τ for the remaining stages.
        let first = module.step(u, [], s1, tau)?;
        let StepOutcome::Accepted { tau, .. } = first else {
            return Ok(first);
        };

        match scheme {
            TimeScheme::ForwardEuler => {
                u.copy_from_slice(s1);
            }
            TimeScheme::SspRk2 => {
                module.apply_boundary_conditions(s1, t + tau);
                let outcome = module.step(s1, [], s2, tau)?;
                if !outcome.is_accepted() {
                    return Ok(outcome);
                }
                blend(u, 0.5, s2);
                u.copy_from_slice(s2);
            }
            TimeScheme::SspRk3 => {
                module.apply_boundary_conditions(s1, t + tau);
                let outcome = module.step(s1, [], s2, tau)?;
                if !outcome.is_accepted() {
                    return Ok(outcome);
                }
                blend(u, 0.25, s2);

                module.apply_boundary_conditions(s2, t + 0.5 * tau);
                let outcome = module.step(s2, [], s3, tau)?;
                if !outcome.is_accepted() {
                    return Ok(outcome);
                }
                blend(u, 2.0 / 3.0, s3);
                u.copy_from_slice(s3);
            }
            TimeScheme::Erk33 => {
                let [v0, v1] = viscosities;
                if let Some(viscosity) = module.high_order_viscosity() {
                    v0.copy_from(viscosity);
                }
                module.apply_boundary_conditions(s1, t + tau);

                let stage0 = Stage {
                    state: u,
                    viscosity: v0,
                    weight: -1.0,
                };
                let outcome = module.step(s1, [stage0], s2, tau)?;
                if !outcome.is_accepted() {
                    return Ok(outcome);
                }
                if let Some(viscosity) = module.high_order_viscosity() {
                    v1.copy_from(viscosity);
                }
                module.apply_boundary_conditions(s2, t + 2.0 * tau);

                let stages = [
                    Stage {
                        state: u,
                        viscosity: v0,
                        weight: 0.75,
                    },
                    Stage {
                        state: s1,
                        viscosity: v1,
                        weight: -2.0,
                    },
                ];
                let outcome = module.step(s2, stages, s3, tau)?;
                if !outcome.is_accepted() {
                    return Ok(outcome);
                }
                u.copy_from_slice(s3);
            }
        }

        Ok(first)
    }
}

/// `stage ← (1 - weight) · old + weight · stage`
fn blend<const N: usize>(old: &[State<N>], weight: f64, stage: &mut [State<N>]) {
    for_each_node(stage, |i, s| *s = old[i] * (1.0 - weight) + *s * weight);
}
