//! Time integration.

mod integrator;

pub use integrator::{RunSummary, TimeIntegrator};
