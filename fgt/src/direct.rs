//! Brute force kernel density estimation, the reference the fast transform is checked against.
use ndarray::{Array1, ArrayView2};
use rayon::prelude::*;

use crate::traits::{general::FgtScalar, kernel::Kernel};

/// Normalised density at every query, summing the kernel over every reference point.
///
/// # Arguments
/// * `kernel` - The kernel being summed.
/// * `queries` - Query coordinates, shape `[dim, n_queries]`.
/// * `references` - Reference coordinates, shape `[dim, n_references]`.
pub fn direct_density<K>(
    kernel: &K,
    queries: ArrayView2<K::Scalar>,
    references: ArrayView2<K::Scalar>,
) -> Array1<K::Scalar>
where
    K: Kernel + Sync,
{
    let n_references = references.ncols();
    let constant = kernel.normalization_constant(queries.nrows())
        * <K::Scalar as FgtScalar>::from_count(n_references);

    let densities = (0..queries.ncols())
        .into_par_iter()
        .map(|q| {
            let query = queries.column(q);
            let sum = references
                .columns()
                .into_iter()
                .map(|reference| {
                    let distance_squared = query
                        .iter()
                        .zip(reference.iter())
                        .map(|(&a, &b)| (a - b) * (a - b))
                        .sum();
                    kernel.evaluate_squared_distance(distance_squared)
                })
                .sum::<K::Scalar>();
            sum / constant
        })
        .collect::<Vec<_>>();

    Array1::from_vec(densities)
}
