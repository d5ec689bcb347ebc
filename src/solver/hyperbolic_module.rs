//! The explicit hyperbolic update.
//!
//! # Low-order update
//!
//! ```text
//! U_i^L = U_i + τ/m_i Σ_j [ -(f(U_i) + f(U_j))·c_ij + d_ij (U_j - U_i) ]
//! d_ij  = max(λ(U_i, U_j, n_ij) |c_ij|, λ(U_j, U_i, n_ji) |c_ji|),   d_ii = -Σ_{j≠i} d_ij
//! τ_max = cfl · min_i m_i / (-2 d_ii)
//! ```
//!
//! Sums run over the full row, diagonal included. `U^L` is a convex
//! combination of bar states for `τ ≤ τ_max` and therefore admissible.
//!
//! # High-order correction
//!
//! With the blended residual `R̃_i` and the consistent-mass factors
//! `b_ij = δ_ij - m_ij / m_j`:
//!
//! ```text
//! A_ij = F^H_ij - F^L_ij + b_ij R̃_j - b_ji R̃_i
//! P_ij = τ A_ij / (m_i λ_i),   λ_i = 1 / |I(i)|
//! U_i^{n+1} = U_i^L + Σ_j λ_i l_ij P_ij
//! ```
//!
//! `A_ij = -A_ji` on interior edges and `l_ij = l_ji`, so the correction
//! conserves `Σ m_i U_i`.

use tracing::{debug, warn};

use super::indicator::smoothness_indicator;
use super::parallel::{for_each_node, for_each_row, min_over_nodes};
use super::{Stage, StepOutcome};
use crate::boundary::{self, BoundaryConditions};
use crate::config::{HyperbolicConfig, IdViolationStrategy, SimulationConfig};
use crate::equations::{Description, HyperbolicSystem};
use crate::error::HyperbolicError;
use crate::graph::{GraphOperators, SparseMatrix};
use crate::limiter::Limiter;
use crate::riemann::RiemannSolver;
use crate::types::{FluxTensor, Point, State, contract};

type Bounds<D, const DIM: usize, const N: usize> =
    <<D as Description<DIM, N>>::Limiter as Limiter<DIM, N>>::Bounds;

/// Stage flux slots allocated by `prepare`; the time integrators blend at
/// most this many earlier stages. More stages grow the cache on first use.
const PREPARED_STAGES: usize = 2;

/// Scratch storage, allocated once by [`HyperbolicModule::prepare`].
struct StepBuffers<B, const DIM: usize, const N: usize> {
    flux: Vec<FluxTensor<DIM, N>>,
    /// Fluxes of the blended stages, one vector per stage slot.
    stage_flux: Vec<Vec<FluxTensor<DIM, N>>>,
    alpha: Vec<f64>,
    /// Edge viscosity, written for `j > i` only.
    edge_speeds: SparseMatrix<f64>,
    dij: SparseMatrix<f64>,
    dij_high: SparseMatrix<f64>,
    low_order: Vec<State<N>>,
    residual: Vec<State<N>>,
    pij: SparseMatrix<State<N>>,
    lij_raw: SparseMatrix<f64>,
    lij: SparseMatrix<f64>,
    bounds: Vec<B>,
}

/// Time-stepping orchestrator for one equation family on one graph.
///
/// Lifecycle: [`new`](Self::new) → [`prepare`](Self::prepare) → any number
/// of [`step`](Self::step) calls. Calling `step` before `prepare` returns
/// [`HyperbolicError::NotPrepared`].
///
/// # Example
///
/// ```
/// use idp_rs::config::HyperbolicConfig;
/// use idp_rs::equations::{Euler, EulerDescription};
/// use idp_rs::graph::OfflineData;
/// use idp_rs::initial_state::{Contrast, InitialState};
/// use idp_rs::mesh::SimplexMesh;
/// use idp_rs::solver::HyperbolicModule;
///
/// let graph = OfflineData::assemble(&SimplexMesh::interval(0.0, 1.0, 50)).unwrap();
/// let euler = Euler::<1>::air();
/// let description = EulerDescription::new(euler);
///
/// let mut module = HyperbolicModule::new(&description, &graph, HyperbolicConfig::default());
/// module.prepare();
///
/// let sod: Contrast<1, 3> = Contrast::sod(&euler);
/// let old = sod.interpolate(&graph, 0.0);
/// let mut new = old.clone();
/// let outcome = module.step(&old, [], &mut new, 0.0).unwrap();
/// assert!(outcome.is_accepted());
/// ```
pub struct HyperbolicModule<'a, D, G, const DIM: usize, const N: usize>
where
    D: Description<DIM, N>,
    G: GraphOperators<DIM>,
{
    description: &'a D,
    graph: &'a G,
    config: HyperbolicConfig,
    relaxation_factor: f64,
    boundary_conditions: Option<&'a dyn BoundaryConditions<DIM, N>>,
    buffers: Option<StepBuffers<Bounds<D, DIM, N>, DIM, N>>,
    measure: f64,
    n_restarts: usize,
    n_warnings: usize,
}

impl<'a, D, G, const DIM: usize, const N: usize> HyperbolicModule<'a, D, G, DIM, N>
where
    D: Description<DIM, N>,
    G: GraphOperators<DIM>,
{
    /// Create an unprepared module.
    ///
    /// # Arguments
    /// * `description` - System, Riemann solver and limiter
    /// * `graph` - Graph operators, read-only for the lifetime of the module
    /// * `config` - Step parameters
    pub fn new(description: &'a D, graph: &'a G, config: HyperbolicConfig) -> Self {
        Self {
            description,
            graph,
            config,
            relaxation_factor: 0.0,
            boundary_conditions: None,
            buffers: None,
            measure: 0.0,
            n_restarts: 0,
            n_warnings: 0,
        }
    }

    /// Create from a full simulation configuration.
    pub fn from_config(description: &'a D, graph: &'a G, config: &SimulationConfig) -> Self {
        Self::new(description, graph, config.hyperbolic)
            .with_relaxation_factor(config.limiter.relaxation_factor)
    }

    /// Widen limiter bounds by `factor · (m_i / |Ω|)^(1.5 / DIM)`.
    pub fn with_relaxation_factor(mut self, factor: f64) -> Self {
        self.relaxation_factor = factor;
        self
    }

    /// Boundary conditions used by [`apply_boundary_conditions`](Self::apply_boundary_conditions).
    pub fn with_boundary_conditions(mut self, conditions: &'a dyn BoundaryConditions<DIM, N>) -> Self {
        self.boundary_conditions = Some(conditions);
        self
    }

    /// Allocate all scratch buffers.
    pub fn prepare(&mut self) {
        let pattern = self.graph.sparsity().clone();
        let n = self.graph.n_nodes();

        self.buffers = Some(StepBuffers {
            flux: vec![[State::zero(); DIM]; n],
            stage_flux: vec![vec![[State::zero(); DIM]; n]; PREPARED_STAGES],
            alpha: vec![0.0; n],
            edge_speeds: SparseMatrix::new(pattern.clone(), 0.0),
            dij: SparseMatrix::new(pattern.clone(), 0.0),
            dij_high: SparseMatrix::new(pattern.clone(), 0.0),
            low_order: vec![State::zero(); n],
            residual: vec![State::zero(); n],
            pij: SparseMatrix::new(pattern.clone(), State::zero()),
            lij_raw: SparseMatrix::new(pattern.clone(), 0.0),
            lij: SparseMatrix::new(pattern, 0.0),
            bounds: vec![Default::default(); n],
        });
        self.measure = self.graph.measure();

        debug!(
            system = self.description.system().name(),
            n_nodes = n,
            n_locally_owned = self.graph.n_locally_owned(),
            "hyperbolic module prepared"
        );
    }

    pub fn is_prepared(&self) -> bool {
        self.buffers.is_some()
    }

    pub fn description(&self) -> &'a D {
        self.description
    }

    pub fn graph(&self) -> &'a G {
        self.graph
    }

    pub fn config(&self) -> &HyperbolicConfig {
        &self.config
    }

    pub fn cfl(&self) -> f64 {
        self.config.cfl
    }

    pub fn set_cfl(&mut self, cfl: f64) {
        self.config.cfl = cfl;
    }

    /// Number of steps that requested a restart.
    pub fn n_restarts(&self) -> usize {
        self.n_restarts
    }

    /// Number of steps accepted despite a violation.
    pub fn n_warnings(&self) -> usize {
        self.n_warnings
    }

    /// Low-order viscosity `d_ij` of the last step.
    pub fn viscosity(&self) -> Option<&SparseMatrix<f64>> {
        self.buffers.as_ref().map(|b| &b.dij)
    }

    /// High-order viscosity `d^H_ij` of the last high-order step, to be fed
    /// back as a [`Stage`] viscosity.
    pub fn high_order_viscosity(&self) -> Option<&SparseMatrix<f64>> {
        self.buffers.as_ref().map(|b| &b.dij_high)
    }

    /// Apply the configured boundary conditions to `state` at time `t`.
    pub fn apply_boundary_conditions(&self, state: &mut [State<N>], t: f64) {
        if let Some(conditions) = self.boundary_conditions {
            boundary::apply_boundary_conditions(conditions, self.graph, state, t);
        }
    }

    /// Partial `tau_max` of the locally owned nodes.
    ///
    /// A distributed caller reduces this with `min` over all ranks and
    /// prescribes the result to [`step`](Self::step).
    pub fn compute_tau_max(&mut self, old: &[State<N>]) -> Result<f64, HyperbolicError> {
        let graph = self.graph;
        let description = self.description;
        let cfl = self.config.cfl;
        let buffers = self.buffers.as_mut().ok_or(HyperbolicError::NotPrepared)?;
        check_size(graph.n_nodes(), old.len())?;

        compute_viscosity(description, graph, old, &mut buffers.edge_speeds, &mut buffers.dij);
        Ok(tau_max_of(graph, &buffers.dij, cfl))
    }

    /// Advance `old` by one explicit step into `new`.
    ///
    /// # Arguments
    /// * `old` - Current state, one entry per graph node
    /// * `stages` - Earlier stages blended into the high-order residual
    /// * `new` - Output buffer; its content is unspecified on `Restart`
    /// * `tau` - Prescribed step size, or `0` for `tau_max`
    ///
    /// # Errors
    /// Misuse only: unprepared module, size mismatch, negative or NaN
    /// `tau`, or no step size constraint at all.
    pub fn step<const S: usize>(
        &mut self,
        old: &[State<N>],
        stages: [Stage<'_, N>; S],
        new: &mut [State<N>],
        tau: f64,
    ) -> Result<StepOutcome, HyperbolicError> {
        let graph = self.graph;
        let description = self.description;
        let config = self.config;
        let relaxation_factor = self.relaxation_factor;
        let measure = self.measure;

        let buffers = self.buffers.as_mut().ok_or(HyperbolicError::NotPrepared)?;
        let n = graph.n_nodes();
        let n_owned = graph.n_locally_owned();
        check_size(n, old.len())?;
        check_size(n, new.len())?;
        for stage in &stages {
            check_size(n, stage.state.len())?;
            check_size(buffers.dij.values().len(), stage.viscosity.values().len())?;
        }
        if !(tau >= 0.0) {
            return Err(HyperbolicError::InvalidTimeStep(tau));
        }

        let system = description.system();
        let limiter = description.limiter();
        let pattern = graph.sparsity().clone();
        let StepBuffers {
            flux,
            stage_flux,
            alpha,
            edge_speeds,
            dij,
            dij_high,
            low_order,
            residual,
            pij,
            lij_raw,
            lij,
            bounds,
        } = buffers;

        // Fluxes, viscosity and step size of the old state
        for_each_node(flux, |i, f| *f = system.flux(&old[i]));
        compute_viscosity(description, graph, old, edge_speeds, dij);
        let tau_max = tau_max_of(graph, dij, config.cfl);

        let tau = if tau == 0.0 { tau_max } else { tau };
        if !tau.is_finite() {
            return Err(HyperbolicError::UnboundedTimeStep);
        }

        // Low-order update
        {
            let flux = &*flux;
            let dij = &*dij;
            for_each_node(low_order, |i, u_l| {
                let mut sum = State::zero();
                for k in pattern.row(i) {
                    let j = pattern.column(k);
                    sum += edge_term(&flux[i], &flux[j], &old[i], &old[j], &graph.c_ij(k), dij[k]);
                }
                *u_l = old[i] + sum * (tau / graph.lumped_mass(i));
            });
        }

        if config.high_order {
            smoothness_indicator(system, graph, old, config.indicator_power, alpha);
            {
                let alpha = &*alpha;
                let dij = &*dij;
                let (_, values) = dij_high.split_mut();
                for_each_row(&pattern, values, |i, row| {
                    let start = pattern.row_start(i);
                    let mut sum = 0.0;
                    for (offset, d) in row.iter_mut().enumerate().skip(1) {
                        let k = start + offset;
                        *d = dij[k] * alpha[i].max(alpha[pattern.column(k)]);
                        sum += *d;
                    }
                    row[0] = -sum;
                });
            }

            if stage_flux.len() < S {
                stage_flux.resize_with(S, || vec![[State::zero(); DIM]; n]);
            }
            for (stage, f) in stages.iter().zip(stage_flux.iter_mut()) {
                for_each_node(f, |i, f_i| *f_i = system.flux(&stage.state[i]));
            }

            let high_order = HighOrderFlux {
                flux: &*flux,
                state: old,
                viscosity: &*dij_high,
                stages: &stages,
                stage_flux: &stage_flux[..S],
                own_weight: 1.0 - stages.iter().map(|s| s.weight).sum::<f64>(),
            };

            // Blended high-order residual
            for_each_node(residual, |i, r| {
                let mut sum = State::zero();
                for k in pattern.row(i) {
                    sum += high_order.edge(i, pattern.column(k), k, &graph.c_ij(k));
                }
                *r = sum;
            });

            // Antidiffusive corrections
            {
                let (flux, dij, residual) = (&*flux, &*dij, &*residual);
                let (_, values) = pij.split_mut();
                for_each_row(&pattern, values, |i, row| {
                    let start = pattern.row_start(i);
                    let m_i = graph.lumped_mass(i);
                    let scale = tau * row.len() as f64 / m_i;

                    for (offset, p) in row.iter_mut().enumerate() {
                        let k = start + offset;
                        let j = pattern.column(k);
                        let c_ij = graph.c_ij(k);

                        let mut a = high_order.edge(i, j, k, &c_ij)
                            - edge_term(&flux[i], &flux[j], &old[i], &old[j], &c_ij, dij[k]);
                        if config.mass_correction {
                            let delta = if i == j { 1.0 } else { 0.0 };
                            let b_ij = delta - graph.consistent_mass(k) / graph.lumped_mass(j);
                            let b_ji = delta - graph.consistent_mass(pattern.transposed(k)) / m_i;
                            a.add_scaled(b_ij, &residual[j]);
                            a.add_scaled(-b_ji, &residual[i]);
                        }
                        *p = a * scale;
                    }
                });
            }

            // Bounds from the low-order state over each row
            {
                let low_order = &*low_order;
                for_each_node(bounds, |i, b| {
                    let neighbors = pattern.columns(i)[1..].iter().map(|&j| &low_order[j]);
                    let local = limiter.compute_bounds(&low_order[i], neighbors);
                    let r = relaxation_factor
                        * (graph.lumped_mass(i) / measure).powf(1.5 / DIM as f64);
                    *b = limiter.relax(&local, r);
                });
            }

            for pass in 0..config.limiter_passes {
                {
                    let (bounds, low_order, pij) = (&*bounds, &*low_order, &*pij);
                    let (_, values) = lij_raw.split_mut();
                    for_each_row(&pattern, values, |i, row| {
                        let start = pattern.row_start(i);
                        for (offset, l) in row.iter_mut().enumerate() {
                            let p = &pij[start + offset];
                            *l = limiter.limit(&bounds[i], &low_order[i], p, 0.0, 1.0).0;
                        }
                    });
                }
                {
                    let lij_raw = &*lij_raw;
                    for_each_node(lij.values_mut(), |k, l| {
                        *l = lij_raw[k].min(lij_raw.transposed(k));
                    });
                }
                {
                    let (lij, pij) = (&*lij, &*pij);
                    for_each_node(low_order, |i, u| {
                        let mut correction = State::zero();
                        for k in pattern.row(i) {
                            correction.add_scaled(lij[k], &pij[k]);
                        }
                        u.add_scaled(1.0 / pattern.row_length(i) as f64, &correction);
                    });
                }
                if pass + 1 < config.limiter_passes {
                    let lij = &*lij;
                    for_each_node(pij.values_mut(), |k, p| *p = *p * (1.0 - lij[k]));
                }
            }
        }

        new[..n_owned].copy_from_slice(&low_order[..n_owned]);
        new[n_owned..].copy_from_slice(&old[n_owned..]);

        let n_inadmissible = new[..n_owned]
            .iter()
            .filter(|u| !system.is_admissible(u))
            .count();
        let cfl_violated = tau > (1.0 + config.tau_tolerance) * tau_max;

        debug!(tau, tau_max, n_stages = S, "hyperbolic step");

        if n_inadmissible == 0 && !cfl_violated {
            return Ok(StepOutcome::Accepted { tau, tau_max });
        }

        match config.id_violation_strategy {
            IdViolationStrategy::Warn => {
                warn!(
                    n_inadmissible,
                    tau,
                    tau_max,
                    "invariant domain or CFL violation, accepting step"
                );
                self.n_warnings += 1;
                Ok(StepOutcome::Accepted { tau, tau_max })
            }
            IdViolationStrategy::RaiseException => {
                debug!(n_inadmissible, tau, tau_max, "requesting restart");
                self.n_restarts += 1;
                Ok(StepOutcome::Restart { tau, tau_max })
            }
        }
    }
}

fn check_size(expected: usize, actual: usize) -> Result<(), HyperbolicError> {
    if expected == actual {
        Ok(())
    } else {
        Err(HyperbolicError::size_mismatch(expected, actual))
    }
}

/// `-(f(U_i) + f(U_j))·c_ij + d_ij (U_j - U_i)`
#[inline]
fn edge_term<const DIM: usize, const N: usize>(
    f_i: &FluxTensor<DIM, N>,
    f_j: &FluxTensor<DIM, N>,
    u_i: &State<N>,
    u_j: &State<N>,
    c_ij: &Point<DIM>,
    d_ij: f64,
) -> State<N> {
    let mut term = -(contract(f_i, c_ij) + contract(f_j, c_ij));
    term.add_scaled(d_ij, &(*u_j - *u_i));
    term
}

/// Fill `dij` with the symmetric graph viscosity of `state`.
///
/// Each undirected edge evaluates its pair of wave speed estimates once,
/// into the upper triangle of `edge_speeds`; both rows of `dij` then read
/// that single value.
fn compute_viscosity<D, G, const DIM: usize, const N: usize>(
    description: &D,
    graph: &G,
    state: &[State<N>],
    edge_speeds: &mut SparseMatrix<f64>,
    dij: &mut SparseMatrix<f64>,
) where
    D: Description<DIM, N>,
    G: GraphOperators<DIM>,
{
    let solver = description.riemann_solver();
    {
        let (pattern, values) = edge_speeds.split_mut();
        for_each_row(pattern, values, |i, row| {
            let start = pattern.row_start(i);
            for (offset, d) in row.iter_mut().enumerate().skip(1) {
                let k = start + offset;
                let j = pattern.column(k);
                if j < i {
                    continue;
                }
                let kt = pattern.transposed(k);
                let d_ij = solver.lambda_max(&state[i], &state[j], &graph.normal(k)) * graph.weight(k);
                let d_ji = solver.lambda_max(&state[j], &state[i], &graph.normal(kt)) * graph.weight(kt);
                *d = d_ij.max(d_ji);
            }
        });
    }

    let edge_speeds = &*edge_speeds;
    let (pattern, values) = dij.split_mut();
    for_each_row(pattern, values, |i, row| {
        let start = pattern.row_start(i);
        let mut sum = 0.0;
        for (offset, d) in row.iter_mut().enumerate().skip(1) {
            let k = start + offset;
            *d = if pattern.column(k) > i {
                edge_speeds[k]
            } else {
                edge_speeds.transposed(k)
            };
            sum += *d;
        }
        row[0] = -sum;
    });
}

fn tau_max_of<G, const DIM: usize>(graph: &G, dij: &SparseMatrix<f64>, cfl: f64) -> f64
where
    G: GraphOperators<DIM>,
{
    let pattern = dij.pattern();
    min_over_nodes(graph.n_locally_owned(), |i| {
        let d_ii = dij[pattern.row_start(i)];
        if d_ii < 0.0 {
            cfl * graph.lumped_mass(i) / (-2.0 * d_ii)
        } else {
            f64::INFINITY
        }
    })
}

/// Edge terms of the blended high-order residual.
struct HighOrderFlux<'s, const DIM: usize, const N: usize, const S: usize> {
    flux: &'s [FluxTensor<DIM, N>],
    state: &'s [State<N>],
    viscosity: &'s SparseMatrix<f64>,
    stages: &'s [Stage<'s, N>; S],
    stage_flux: &'s [Vec<FluxTensor<DIM, N>>],
    own_weight: f64,
}

impl<const DIM: usize, const N: usize, const S: usize> HighOrderFlux<'_, DIM, N, S> {
    fn edge(&self, i: usize, j: usize, k: usize, c_ij: &Point<DIM>) -> State<N> {
        let mut term = edge_term(
            &self.flux[i],
            &self.flux[j],
            &self.state[i],
            &self.state[j],
            c_ij,
            self.viscosity[k],
        ) * self.own_weight;

        for (stage, f) in self.stages.iter().zip(self.stage_flux) {
            let stage_term = edge_term(
                &f[i],
                &f[j],
                &stage.state[i],
                &stage.state[j],
                c_ij,
                stage.viscosity[k],
            );
            term.add_scaled(stage.weight, &stage_term);
        }
        term
    }
}
