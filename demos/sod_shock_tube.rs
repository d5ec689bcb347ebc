//! Sod shock tube with the invariant-domain preserving stepper.
//!
//! Solves the 1D Euler equations on [0, 1] with
//! - left state (ρ, u, p) = (1, 0, 1), right state (0.125, 0, 0.1)
//! - diaphragm at x = 0.5, γ = 1.4
//!
//! Run with: `cargo run --release --example sod_shock_tube [config.toml]`
//!
//! An optional TOML file overrides the stepper and time settings; its
//! equation section must describe an Euler gas.

use std::error::Error;

use idp_rs::config::{EquationConfig, SimulationConfig, TimeConfig};
use idp_rs::equations::{Euler, EulerDescription, HyperbolicSystem};
use idp_rs::graph::{GraphOperators, OfflineData};
use idp_rs::initial_state::{Contrast, InitialState};
use idp_rs::mesh::SimplexMesh;
use idp_rs::solver::{HyperbolicModule, conserved_totals};
use idp_rs::time::TimeIntegrator;

fn main() -> Result<(), Box<dyn Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => SimulationConfig::from_file(path)?,
        None => SimulationConfig::default().with_time(TimeConfig {
            final_time: 0.2,
            ..Default::default()
        }),
    };
    let EquationConfig::Euler { gamma } = config.equation else {
        return Err("the Sod demo needs an Euler configuration".into());
    };

    let n_cells = 400;
    let t_final = config.time.final_time;

    println!("Sod shock tube");
    println!("==============");
    println!("Cells: {}", n_cells);
    println!("gamma: {}", gamma);
    println!("CFL: {}", config.hyperbolic.cfl);
    println!("Scheme: {}", config.time.scheme.name());
    println!("Final time: {}", t_final);
    println!();

    let graph = OfflineData::assemble(&SimplexMesh::interval(0.0, 1.0, n_cells))?;
    let euler = Euler::<1>::new(gamma);
    let description = EulerDescription::from_config(euler, &config.riemann, &config.limiter);

    let sod: Contrast<1, 3> = Contrast::sod(&euler);
    let mut u = sod.interpolate(&graph, 0.0);
    let initial = conserved_totals(&graph, &u);

    let module = HyperbolicModule::from_config(&description, &graph, &config);
    let mut integrator = TimeIntegrator::new(module, &config.time);
    let summary = integrator.run(&mut u, 0.0, t_final)?;

    println!("Steps: {}", summary.n_steps);
    println!("Restarts: {}", summary.n_restarts);
    println!("Warnings: {}", summary.n_warnings);

    let totals = conserved_totals(&graph, &u);
    println!("Mass change: {:.3e}", totals[0] - initial[0]);
    println!("Energy change: {:.3e}", totals[2] - initial[2]);
    println!();

    println!("{:>8} {:>10} {:>10} {:>10}", "x", "rho", "u", "p");
    for i in (0..graph.n_nodes()).step_by(n_cells / 20) {
        let w = euler.to_primitive(&u[i]);
        println!(
            "{:>8.3} {:>10.5} {:>10.5} {:>10.5}",
            graph.position(i)[0],
            w[0],
            w[1],
            w[2]
        );
    }

    Ok(())
}
