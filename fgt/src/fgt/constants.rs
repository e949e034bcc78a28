//! Crate wide constants

/// Minimum number of reference boxes handed to a thread at once during the P2M kernel.
pub(crate) const P2M_MIN_CHUNK_SIZE: usize = 4;

/// Minimum number of query boxes handed to a thread at once during the interaction sweep.
pub(crate) const INTERACTIONS_MIN_CHUNK_SIZE: usize = 1;

/// Minimum number of query boxes handed to a thread at once during the L2P kernel.
pub(crate) const L2P_MIN_CHUNK_SIZE: usize = 4;

/// Coefficient counts `p^d` above which a warning about expansion cost is logged.
pub(crate) const LARGE_EXPANSION_WARN_THRESHOLD: usize = 1 << 20;
