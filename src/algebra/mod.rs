//! Linear algebra used by the constraint handlers and linear solvers.
//!
//! Vectors are plain slices of [`FloatT`], with elementwise operations
//! provided by the [`VectorMath`] trait.  Vectors that need to be
//! shared between a caller and a constraint handler are wrapped as
//! [`SharedVector`].  Operators are stored as [`CscMatrix`].

mod csc;
mod error_types;
mod floats;
mod index_set;
mod math_traits;
mod shared;
mod vecmath;

pub use csc::*;
pub use error_types::*;
pub use floats::*;
pub use index_set::*;
pub use math_traits::*;
pub use shared::*;

#[cfg(test)]
mod tests;
