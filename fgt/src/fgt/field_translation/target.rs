//! Evaluation of expansions and direct sums at query points
use ndarray::{Array1, ArrayView2};
use rayon::prelude::*;

use crate::{
    fgt::{
        constants::L2P_MIN_CHUNK_SIZE,
        helpers::{fill_tensor_product, hermite_functions, monomials, scaled_offset},
        multi_index::MultiIndexTable,
        types::GaussTransform,
    },
    traits::{
        fgt::TargetTranslation,
        general::FgtScalar,
        kernel::Kernel,
        types::FgtError,
    },
};

/// Add the far-field expansion `sum_alpha A_alpha h_alpha((q - c) / s)` of a reference box
/// to the potential of each query in `indices` (M2P).
///
/// # Arguments
/// * `queries` - All query coordinates, shape `[dim, n_queries]`.
/// * `indices` - The queries being evaluated, aligned with `potentials`.
/// * `centroid` - Centre of the reference box.
/// * `scale` - Expansion scale `s`.
/// * `table` - Multi-index table for the truncation order.
/// * `moments` - Far-field moments of the reference box.
/// * `potentials` - Raw sums of the queries in `indices`.
pub fn evaluate_far_field<T: FgtScalar>(
    queries: ArrayView2<T>,
    indices: &[usize],
    centroid: &[T],
    scale: T,
    table: &MultiIndexTable<T>,
    moments: &[T],
    potentials: &mut [T],
) {
    let order = table.order;
    let mut offset = vec![T::zero(); table.dim];
    let mut hermite = vec![T::zero(); table.dim * order];
    let mut basis = vec![T::zero(); table.n_coeffs];

    for (&q, potential) in indices.iter().zip(potentials.iter_mut()) {
        scaled_offset(queries.column(q), centroid, scale, &mut offset);
        for (axis, &u) in offset.iter().enumerate() {
            hermite_functions(u, &mut hermite[axis * order..(axis + 1) * order]);
        }
        fill_tensor_product(&hermite, order, &mut basis);

        *potential += basis.iter().zip(moments.iter()).map(|(&h, &a)| h * a).sum::<T>();
    }
}

/// Add the local expansion `sum_beta B_beta ((q - c) / s)^beta` of a query box to the potential
/// of each query in `indices` (L2P).
///
/// # Arguments
/// * `queries` - All query coordinates, shape `[dim, n_queries]`.
/// * `indices` - The queries held by the box, aligned with `potentials`.
/// * `centroid` - Centre of the query box.
/// * `scale` - Expansion scale `s`.
/// * `table` - Multi-index table for the truncation order.
/// * `local` - Local coefficients of the query box.
/// * `potentials` - Raw sums of the queries in `indices`.
pub fn evaluate_local<T: FgtScalar>(
    queries: ArrayView2<T>,
    indices: &[usize],
    centroid: &[T],
    scale: T,
    table: &MultiIndexTable<T>,
    local: &[T],
    potentials: &mut [T],
) {
    let order = table.order;
    let mut offset = vec![T::zero(); table.dim];
    let mut powers = vec![T::zero(); table.dim * order];
    let mut basis = vec![T::zero(); table.n_coeffs];

    for (&q, potential) in indices.iter().zip(potentials.iter_mut()) {
        scaled_offset(queries.column(q), centroid, scale, &mut offset);
        for (axis, &x) in offset.iter().enumerate() {
            monomials(x, &mut powers[axis * order..(axis + 1) * order]);
        }
        fill_tensor_product(&powers, order, &mut basis);

        *potential += basis.iter().zip(local.iter()).map(|(&m, &b)| m * b).sum::<T>();
    }
}

/// Add the kernel evaluated between every query in `query_indices` and every reference in
/// `reference_indices` to the query potentials (P2P).
///
/// # Arguments
/// * `kernel` - The kernel being summed.
/// * `queries` - All query coordinates, shape `[dim, n_queries]`.
/// * `query_indices` - The queries being evaluated, aligned with `potentials`.
/// * `references` - All reference coordinates, shape `[dim, n_references]`.
/// * `reference_indices` - The contributing references.
/// * `potentials` - Raw sums of the queries in `query_indices`.
pub fn direct<K: Kernel>(
    kernel: &K,
    queries: ArrayView2<K::Scalar>,
    query_indices: &[usize],
    references: ArrayView2<K::Scalar>,
    reference_indices: &[usize],
    potentials: &mut [K::Scalar],
) {
    for (&q, potential) in query_indices.iter().zip(potentials.iter_mut()) {
        let query = queries.column(q);
        for &r in reference_indices.iter() {
            let distance_squared = query
                .iter()
                .zip(references.column(r).iter())
                .map(|(&a, &b)| (a - b) * (a - b))
                .sum();
            *potential += kernel.evaluate_squared_distance(distance_squared);
        }
    }
}

impl<T> TargetTranslation for GaussTransform<T>
where
    T: FgtScalar,
{
    fn l2p(&mut self) -> Result<(), FgtError> {
        let Some(grid) = self.grid.as_ref() else {
            return Err(FgtError::Failed(
                "L2P failed, grid has not been built".to_string(),
            ));
        };

        let targets = grid
            .boxes
            .iter()
            .filter(|b| !self.locals[b.index].is_empty())
            .map(|b| b.index)
            .collect::<Vec<_>>();

        if targets.is_empty() {
            return Ok(());
        }

        let Some(table) = self.multi_indices.as_ref() else {
            return Err(FgtError::Failed(
                "L2P failed, local expansions exist without a multi-index table".to_string(),
            ));
        };

        let scale = self.kernel.scale();
        let queries = self.queries.view();
        let locals = &self.locals;

        let contributions = targets
            .par_iter()
            .with_min_len(L2P_MIN_CHUNK_SIZE)
            .map(|&index| {
                // Queries clamped in from outside the box were summed without the local
                let (interior, _) = grid.partition_queries(index, queries);
                let mut potentials = vec![T::zero(); interior.len()];
                evaluate_local(
                    queries,
                    &interior,
                    &grid.boxes[index].centroid,
                    scale,
                    table,
                    &locals[index],
                    &mut potentials,
                );
                (interior, potentials)
            })
            .collect::<Vec<_>>();

        self.interaction_counts.l2p += targets.len();

        for (interior, potentials) in contributions {
            for (q, p) in interior.into_iter().zip(potentials) {
                self.potentials[q] += p;
            }
        }

        Ok(())
    }

    fn normalise(&mut self) -> Result<(), FgtError> {
        let n_references = self.references.ncols();

        if n_references == 0 || self.potentials.len() != self.queries.ncols() {
            return Err(FgtError::Failed(
                "Normalisation failed, raw sums do not match the point sets".to_string(),
            ));
        }

        let constant =
            self.kernel.normalization_constant(self.dim) * T::from_count(n_references);

        let densities = self
            .potentials
            .par_iter()
            .map(|&p| p / constant)
            .collect::<Vec<_>>();

        self.densities = Some(Array1::from_vec(densities));

        Ok(())
    }
}
