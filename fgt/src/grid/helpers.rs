//! Helper functions used in testing and benchmarking, specifically point generators.
use ndarray::Array2;
use rand::prelude::*;
use rand_distr::StandardNormal;

use crate::traits::general::FgtScalar;

/// Points fixture for testing, uniformly samples in each axis from min to max. Points are
/// stored as columns, shape `[dim, n_points]`.
///
/// # Arguments
/// * `n_points` - The number of points to sample.
/// * `dim` - Dimension of each point.
/// * `min` - The minimum coordinate value along each axis, defaults to 0.
/// * `max` - The maximum coordinate value along each axis, defaults to 1.
/// * `seed` - Random seed, defaults to 0.
pub fn points_fixture<T: FgtScalar + rand::distributions::uniform::SampleUniform>(
    n_points: usize,
    dim: usize,
    min: Option<T>,
    max: Option<T>,
    seed: Option<u64>,
) -> Array2<T> {
    let seed = seed.unwrap_or(0);
    let mut range = StdRng::seed_from_u64(seed);

    let between = if let (Some(min), Some(max)) = (min, max) {
        rand::distributions::Uniform::from(min..max)
    } else {
        rand::distributions::Uniform::from(T::zero()..T::one())
    };

    let mut points = Array2::zeros((dim, n_points));

    for i in 0..n_points {
        for axis in 0..dim {
            points[[axis, i]] = between.sample(&mut range);
        }
    }

    points
}

/// Points fixture for testing, samples `n_clusters` centres uniformly in the unit cube and
/// scatters points normally around them with standard deviation `spread`.
///
/// # Arguments
/// * `n_points` - The number of points to sample.
/// * `dim` - Dimension of each point.
/// * `n_clusters` - Number of cluster centres, at least 1.
/// * `spread` - Standard deviation of each cluster along every axis.
/// * `seed` - Random seed, defaults to 0.
pub fn points_fixture_clustered<T: FgtScalar>(
    n_points: usize,
    dim: usize,
    n_clusters: usize,
    spread: T,
    seed: Option<u64>,
) -> Array2<T> {
    let seed = seed.unwrap_or(0);
    let mut range = StdRng::seed_from_u64(seed);
    let n_clusters = n_clusters.max(1);

    let centres: Vec<Vec<f64>> = (0..n_clusters)
        .map(|_| (0..dim).map(|_| range.gen::<f64>()).collect())
        .collect();

    let mut points = Array2::zeros((dim, n_points));

    for i in 0..n_points {
        let centre = &centres[i % n_clusters];
        for axis in 0..dim {
            let normal: f64 = range.sample(StandardNormal);
            points[[axis, i]] = T::from_real(centre[axis]) + spread * T::from_real(normal);
        }
    }

    points
}
