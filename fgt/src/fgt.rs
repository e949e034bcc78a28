//! A fast Gauss transform for kernel density estimation over a uniform grid.
mod builder;
pub mod constants;
pub mod field_translation;
pub mod helpers;
pub mod kernel;
pub mod multi_index;
pub mod types;

mod eval;

pub use types::GaussTransform;
