//! Kernel traits
use crate::traits::general::FgtScalar;

/// A radially symmetric smoothing kernel with a fixed bandwidth.
pub trait Kernel {
    /// Scalar type
    type Scalar: FgtScalar;

    /// The bandwidth h.
    fn bandwidth(&self) -> Self::Scalar;

    /// The squared bandwidth h².
    fn bandwidth_squared(&self) -> Self::Scalar;

    /// Constant the raw kernel sum is divided by so the kernel integrates to one.
    ///
    /// # Arguments
    /// * `dim` - Dimension of the space the kernel is defined over.
    fn normalization_constant(&self, dim: usize) -> Self::Scalar;

    /// Unnormalised kernel value for two points a squared distance `distance_squared` apart.
    fn evaluate_squared_distance(&self, distance_squared: Self::Scalar) -> Self::Scalar;
}
