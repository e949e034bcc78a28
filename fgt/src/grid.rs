//! Uniform grid over the reference points, and the binning of points into its boxes.
pub mod assignment;
pub mod constants;
pub mod geometry;
pub mod helpers;
pub mod indexer;
pub mod types;
