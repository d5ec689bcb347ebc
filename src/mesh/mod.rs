//! Simplex meshes used to derive the computational graph.
//!
//! The time stepper never looks at cells: it only consumes the graph
//! operators assembled from them in [`crate::graph::OfflineData`]. The mesh
//! types here are the minimal input for that assembly.

mod simplex;

pub use simplex::SimplexMesh;
