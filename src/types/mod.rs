//! Small value types shared by every module.
//!
//! - [`State`]: a fixed-size tuple of conserved quantities attached to a node
//! - [`FluxTensor`]: one flux column per spatial direction
//! - [`Point`]: a position or direction in `DIM` dimensions
//!
//! # Example
//!
//! ```
//! use idp_rs::types::{State, contract};
//!
//! let u = State::new([1.0, 2.0, 3.0]);
//! let v = State::new([0.5, 0.5, 0.5]);
//! assert_eq!((u - v)[1], 1.5);
//!
//! // f(U) · c for a 1D flux tensor
//! let flux = [State::new([2.0, 4.0, 6.0])];
//! assert_eq!(contract(&flux, &[0.5]), State::new([1.0, 2.0, 3.0]));
//! ```

mod point;
mod state;

pub use point::{Point, dot, norm, scale, unit};
pub use state::{FluxTensor, State, contract};
