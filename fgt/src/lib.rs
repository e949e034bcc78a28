//! # Fast Gauss Transform (FGT)
//!
//! Kernel density estimation with a fixed bandwidth Gaussian kernel, accelerated by the
//! multidimensional fast Gauss transform of \[1\].
//!
//! Reference points are binned into a uniform grid of roughly bandwidth sized boxes. Each pair
//! of reference and query boxes within the interaction radius is summed either directly, or
//! through truncated Hermite (far-field) and Taylor (local) expansions, chosen per pair by the
//! number of points the two boxes hold. The truncation order is picked so the error of every
//! expansion stays below a requested absolute tolerance.
//!
//! Notable features of this library are:
//! * Any dimension, with coefficients addressed through a multi-index table.
//! * Shared memory parallelism over grid boxes with Rayon.
//! * Flexible trait based interface separating the source, source to target and target stages.
//!
//! ## Example
//! ```
//! use fgt::{Evaluate, GaussTransformBuilder};
//! use fgt::grid::helpers::points_fixture;
//!
//! let references = points_fixture::<f64>(1000, 2, None, None, Some(0));
//! let queries = points_fixture::<f64>(200, 2, None, None, Some(1));
//!
//! let mut fgt = GaussTransformBuilder::new()
//!     .points(&queries, &references)
//!     .unwrap()
//!     .parameters(0.3, 1e-6)
//!     .unwrap()
//!     .build()
//!     .unwrap();
//!
//! fgt.evaluate().unwrap();
//! let densities = fgt.densities().unwrap();
//! assert_eq!(densities.len(), 200);
//! ```
//!
//! ## References
//! \[1\] Greengard, L., & Strain, J. (1991). The fast Gauss transform. SIAM Journal on Scientific and Statistical Computing, 12(1), 79-94.
#![cfg_attr(feature = "strict", deny(warnings))]
#![warn(missing_docs)]

pub mod direct;
pub mod fgt;
pub mod grid;
pub mod traits;

// Public API
#[doc(inline)]
pub use fgt::types::GaussTransform;
#[doc(inline)]
pub use fgt::types::GaussTransformBuilder;
#[doc(inline)]
pub use fgt::kernel::GaussianKernel;
#[doc(inline)]
pub use traits::fgt::Evaluate;
#[doc(inline)]
pub use traits::types::FgtError;
