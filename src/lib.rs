//! # idp-rs
//!
//! Invariant-domain preserving explicit time stepping for hyperbolic
//! conservation laws on unstructured graphs.
//!
//! This crate provides:
//! - Graph operators (`c_ij`, lumped and consistent mass) assembled from
//!   P1 simplex meshes
//! - Compressible Euler and shallow water equations
//! - Guermond–Popov maximal wave speed estimates
//! - Convex limiting of antidiffusive fluxes against local bounds
//! - A low-order graph viscosity update with high-order correction, CFL
//!   control and restart signalling
//! - Multi-stage time integration (SSP-RK2/3, ERK33)
//! - Initial states, boundary postprocessing and TOML configuration
//!
//! # Example
//!
//! ```
//! use idp_rs::config::TimeConfig;
//! use idp_rs::{
//!     Contrast, Euler, EulerDescription, HyperbolicConfig, HyperbolicModule, InitialState,
//!     OfflineData, SimplexMesh, TimeIntegrator,
//! };
//!
//! let graph = OfflineData::assemble(&SimplexMesh::interval(0.0, 1.0, 100)).unwrap();
//! let euler = Euler::<1>::air();
//! let description = EulerDescription::new(euler);
//!
//! let sod: Contrast<1, 3> = Contrast::sod(&euler);
//! let mut u = sod.interpolate(&graph, 0.0);
//!
//! let module = HyperbolicModule::new(&description, &graph, HyperbolicConfig::default());
//! let mut integrator = TimeIntegrator::new(module, &TimeConfig::default());
//! let summary = integrator.run(&mut u, 0.0, 0.05).unwrap();
//! assert_eq!(summary.final_time, 0.05);
//! ```

pub mod boundary;
pub mod config;
pub mod equations;
pub mod error;
pub mod graph;
pub mod initial_state;
pub mod limiter;
pub mod mesh;
pub mod riemann;
pub mod solver;
pub mod time;
pub mod types;

// Re-export main types for convenience
pub use boundary::{
    BoundaryConditions, DirichletBoundary, NoBoundaryConditions, SlipBoundary,
    apply_boundary_conditions,
};
pub use config::{
    EquationConfig, HyperbolicConfig, IdViolationStrategy, SimulationConfig, TimeScheme,
};
pub use equations::{
    Description, Euler, EulerDescription, HyperbolicSystem, ShallowWater,
    ShallowWaterDescription,
};
pub use error::{AssemblyError, ConfigError, HyperbolicError};
pub use graph::{GraphOperators, OfflineData, SparseMatrix, SparsityPattern};
pub use initial_state::{Contrast, InitialState, LeBlanc, Uniform};
pub use limiter::{EulerLimiter, Limiter, ShallowWaterLimiter};
pub use mesh::SimplexMesh;
pub use riemann::{EulerRiemannSolver, RiemannSolver, ShallowWaterRiemannSolver};
pub use solver::{HyperbolicModule, Stage, StepOutcome, conserved_totals, count_inadmissible};
pub use time::{RunSummary, TimeIntegrator};
pub use types::State;
