//! The Gaussian smoothing kernel.
use std::f64::consts::PI;

use crate::traits::{general::FgtScalar, kernel::Kernel};

/// Gaussian kernel `exp(-|x - y|^2 / 2h^2)` with fixed bandwidth `h`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianKernel<T>
where
    T: FgtScalar,
{
    bandwidth: T,
}

impl<T> GaussianKernel<T>
where
    T: FgtScalar,
{
    /// Kernel with bandwidth `bandwidth`, assumed positive and finite.
    pub fn new(bandwidth: T) -> Self {
        Self { bandwidth }
    }

    /// Expansion scale `delta = 2h^2`.
    pub fn delta(&self) -> T {
        T::from_real(2.0) * self.bandwidth_squared()
    }

    /// Length coordinate offsets are divided by before expanding, `sqrt(delta)`.
    pub fn scale(&self) -> T {
        self.delta().sqrt()
    }
}

impl<T> Kernel for GaussianKernel<T>
where
    T: FgtScalar,
{
    type Scalar = T;

    fn bandwidth(&self) -> T {
        self.bandwidth
    }

    fn bandwidth_squared(&self) -> T {
        self.bandwidth * self.bandwidth
    }

    /// `(2 pi h^2)^(d/2)`
    fn normalization_constant(&self, dim: usize) -> T {
        let half_dim = T::from_count(dim) / T::from_real(2.0);
        (T::from_real(2.0 * PI) * self.bandwidth_squared()).powf(half_dim)
    }

    fn evaluate_squared_distance(&self, distance_squared: T) -> T {
        (-distance_squared / self.delta()).exp()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_normalization_constant() {
        let kernel = GaussianKernel::new(0.5f64);
        assert_relative_eq!(kernel.normalization_constant(1), (2.0 * PI * 0.25).sqrt());
        assert_relative_eq!(kernel.normalization_constant(2), 2.0 * PI * 0.25);
        assert_relative_eq!(kernel.normalization_constant(3), (2.0 * PI * 0.25).powf(1.5));
    }

    #[test]
    fn test_kernel_integrates_to_one() {
        // Trapezoid rule in one dimension
        let kernel = GaussianKernel::new(0.7f64);
        let dx = 1e-3;
        let total: f64 = (-10_000..=10_000)
            .map(|i| {
                let x = i as f64 * dx;
                kernel.evaluate_squared_distance(x * x) * dx
            })
            .sum();
        assert_relative_eq!(total / kernel.normalization_constant(1), 1.0, epsilon = 1e-8);
    }

    #[test]
    fn test_scale() {
        let kernel = GaussianKernel::new(2.0f64);
        assert_relative_eq!(kernel.delta(), 8.0);
        assert_relative_eq!(kernel.scale(), 8.0f64.sqrt());
        assert_relative_eq!(kernel.evaluate_squared_distance(8.0), (-1.0f64).exp());
    }
}
