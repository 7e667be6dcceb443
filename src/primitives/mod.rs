//! Core numeric primitives (Vector, Matrix).
//!
//! Row-major, f32-based containers underlying the detection pipeline.

mod matrix;
mod vector;

pub use matrix::Matrix;
pub use vector::Vector;
