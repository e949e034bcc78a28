//! Field translations of the fast Gauss transform
pub mod source;
pub mod source_to_target;
pub mod target;
