//! Traits that are useful across modules
use std::fmt::Debug;
use std::iter::Sum;
use std::ops::{AddAssign, DivAssign, MulAssign};

use num::Float;

/// Floating point types the transform can be evaluated in.
pub trait FgtScalar:
    Float + Default + Debug + Sum + AddAssign + MulAssign + DivAssign + Send + Sync + 'static
{
    /// Convert a double precision constant into this type.
    fn from_real(value: f64) -> Self;

    /// Convert a point or coefficient count into this type.
    fn from_count(count: usize) -> Self;

    /// Widen this value to double precision, used for diagnostics.
    fn to_real(self) -> f64;
}

macro_rules! impl_fgt_scalar {
    ($t:ty) => {
        impl FgtScalar for $t {
            fn from_real(value: f64) -> Self {
                value as $t
            }

            fn from_count(count: usize) -> Self {
                count as $t
            }

            fn to_real(self) -> f64 {
                self as f64
            }
        }
    };
}

impl_fgt_scalar!(f32);
impl_fgt_scalar!(f64);
