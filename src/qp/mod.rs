//! The quadratic program container.

mod problem;
pub use problem::*;

#[cfg(feature = "serde")]
mod json;
#[cfg(feature = "serde")]
pub use json::*;
