//! # Trait Definitions
pub mod fgt;
pub mod general;
pub mod kernel;
pub mod types;
