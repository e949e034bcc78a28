//! Crate wide constants for grid construction

/// Upper bound on the truncation order search, beyond it the grid is treated as degenerate.
pub const MAX_TRUNCATION_ORDER: usize = 256;

/// The truncation error bound only converges for half box sides strictly below this multiple
/// of the bandwidth.
pub const RADIUS_RATIO_LIMIT: f64 = 0.5;
