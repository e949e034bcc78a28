//! Interactions between reference boxes and the query boxes in their range
use ndarray::ArrayView2;
use rayon::prelude::*;

use crate::{
    fgt::{
        constants::INTERACTIONS_MIN_CHUNK_SIZE,
        field_translation::target::{direct, evaluate_far_field},
        helpers::{fill_tensor_product, hermite_functions, scaled_offset},
        multi_index::MultiIndexTable,
        types::{GaussTransform, InteractionCounts, InteractionKind},
    },
    grid::indexer::neighbours,
    traits::{fgt::SourceToTargetTranslation, general::FgtScalar, types::FgtError},
};

/// Everything one query box gathers from the reference boxes in its range. Queries inside the
/// box and queries clamped into it from outside keep separate potentials.
struct TargetContribution<T> {
    index: usize,
    local: Vec<T>,
    interior: Vec<usize>,
    interior_potentials: Vec<T>,
    exterior: Vec<usize>,
    exterior_potentials: Vec<T>,
    counts: InteractionCounts,
}

/// Add the Taylor expansion about the query box centre of the Gaussians centred at each
/// reference in `indices` to `local` (P2L),
/// `B_beta += (-1)^|beta| / beta! sum_r h_beta((c - r) / s)`.
///
/// # Arguments
/// * `references` - All reference coordinates, shape `[dim, n_references]`.
/// * `indices` - The contributing references.
/// * `centroid` - Centre of the query box.
/// * `scale` - Expansion scale `s`.
/// * `table` - Multi-index table for the truncation order.
/// * `local` - Local coefficients of the query box.
pub fn accumulate_direct_local<T: FgtScalar>(
    references: ArrayView2<T>,
    indices: &[usize],
    centroid: &[T],
    scale: T,
    table: &MultiIndexTable<T>,
    local: &mut [T],
) {
    let order = table.order;
    let mut offset = vec![T::zero(); table.dim];
    let mut hermite = vec![T::zero(); table.dim * order];
    let mut basis = vec![T::zero(); table.n_coeffs];
    let mut sum = vec![T::zero(); table.n_coeffs];

    for &r in indices.iter() {
        // (r - c) / s, flipped below
        scaled_offset(references.column(r), centroid, scale, &mut offset);
        for (axis, &u) in offset.iter().enumerate() {
            hermite_functions(-u, &mut hermite[axis * order..(axis + 1) * order]);
        }
        fill_tensor_product(&hermite, order, &mut basis);

        for (s, &b) in sum.iter_mut().zip(basis.iter()) {
            *s += b;
        }
    }

    for ((l, &s), &w) in local
        .iter_mut()
        .zip(sum.iter())
        .zip(table.signed_inv_factorials.iter())
    {
        *l += w * s;
    }
}

/// Translate the far-field moments of a reference box into a local expansion about the
/// centre of a query box and add it to `local` (M2L),
/// `B_beta += (-1)^|beta| / beta! sum_alpha A_alpha h_(alpha + beta)((c_Q - c_R) / s)`.
///
/// The sum over `alpha` factorises across axes, so it is reduced one axis at a time along the
/// multi-index strides, at a cost of `d p^(d+1)` rather than `p^(2d)`.
///
/// # Arguments
/// * `moments` - Far-field moments of the reference box.
/// * `source_centroid` - Centre of the reference box.
/// * `target_centroid` - Centre of the query box.
/// * `scale` - Expansion scale `s`.
/// * `table` - Multi-index table for the truncation order.
/// * `local` - Local coefficients of the query box.
pub fn translate_far_field_to_local<T: FgtScalar>(
    moments: &[T],
    source_centroid: &[T],
    target_centroid: &[T],
    scale: T,
    table: &MultiIndexTable<T>,
    local: &mut [T],
) {
    let order = table.order;
    let n_coeffs = table.n_coeffs;

    // Hermite functions up to index 2p - 2 per axis
    let n_hermite = 2 * order - 1;
    let mut hermite = vec![T::zero(); table.dim * n_hermite];
    for axis in 0..table.dim {
        let t = (target_centroid[axis] - source_centroid[axis]) / scale;
        hermite_functions(t, &mut hermite[axis * n_hermite..(axis + 1) * n_hermite]);
    }

    let mut current = moments.to_vec();
    let mut next = vec![T::zero(); n_coeffs];

    for (axis, &stride) in table.strides.iter().enumerate() {
        let h = &hermite[axis * n_hermite..(axis + 1) * n_hermite];
        next.iter_mut().for_each(|x| *x = T::zero());

        for (id, &weight) in current.iter().enumerate() {
            let alpha = (id / stride) % order;
            let base = id - alpha * stride;
            for beta in 0..order {
                next[base + beta * stride] += weight * h[alpha + beta];
            }
        }

        std::mem::swap(&mut current, &mut next);
    }

    for ((l, &c), &w) in local
        .iter_mut()
        .zip(current.iter())
        .zip(table.signed_inv_factorials.iter())
    {
        *l += w * c;
    }
}

fn required_table<T: FgtScalar>(
    table: Option<&MultiIndexTable<T>>,
) -> Result<&MultiIndexTable<T>, FgtError> {
    table.ok_or_else(|| {
        FgtError::Failed("Expansion requested without a multi-index table".to_string())
    })
}

impl<T> SourceToTargetTranslation for GaussTransform<T>
where
    T: FgtScalar,
{
    fn interactions(&mut self) -> Result<(), FgtError> {
        let Some(grid) = self.grid.as_ref() else {
            return Err(FgtError::Failed(
                "Interactions failed, grid has not been built".to_string(),
            ));
        };

        let Some(parameters) = self.parameters else {
            return Err(FgtError::Failed(
                "Interactions failed, interaction parameters have not been computed".to_string(),
            ));
        };

        let table = self.multi_indices.as_ref();
        let kernel = &self.kernel;
        let scale = kernel.scale();
        let queries = self.queries.view();
        let references = self.references.view();
        let multipoles = &self.multipoles;
        let n_boxes_axis = &grid.geometry.n_boxes_axis;

        let targets = grid
            .boxes
            .iter()
            .filter(|b| !b.queries.is_empty())
            .map(|b| b.index)
            .collect::<Vec<_>>();

        // Neighbourhoods are symmetric, so sweeping query boxes over the reference boxes in
        // their range visits every in-range pair exactly once, and each query box owns all the
        // data it writes
        let contributions = targets
            .par_iter()
            .with_min_len(INTERACTIONS_MIN_CHUNK_SIZE)
            .map(|&index| {
                let target_box = &grid.boxes[index];
                let n_queries = target_box.queries.len();

                // Local expansions diverge away from the box, so queries clamped in from
                // outside take the direct or far-field path of each pair instead
                let (interior, exterior) = grid.partition_queries(index, queries);
                let mut interior_potentials = vec![T::zero(); interior.len()];
                let mut exterior_potentials = vec![T::zero(); exterior.len()];
                let mut local = Vec::new();
                let mut counts = InteractionCounts::default();

                for source in neighbours(index, n_boxes_axis, parameters.kdis) {
                    let source_box = &grid.boxes[source];
                    if source_box.references.is_empty() {
                        continue;
                    }

                    let kind = parameters.classify(source_box.references.len(), n_queries);

                    match kind {
                        InteractionKind::Direct => {
                            direct(
                                kernel,
                                queries,
                                &interior,
                                references,
                                &source_box.references,
                                &mut interior_potentials,
                            );
                            direct(
                                kernel,
                                queries,
                                &exterior,
                                references,
                                &source_box.references,
                                &mut exterior_potentials,
                            );
                        }

                        InteractionKind::DirectLocal => {
                            let table = required_table(table)?;
                            if !interior.is_empty() {
                                if local.is_empty() {
                                    local = vec![T::zero(); table.n_coeffs];
                                }
                                accumulate_direct_local(
                                    references,
                                    &source_box.references,
                                    &target_box.centroid,
                                    scale,
                                    table,
                                    &mut local,
                                );
                            }
                            direct(
                                kernel,
                                queries,
                                &exterior,
                                references,
                                &source_box.references,
                                &mut exterior_potentials,
                            );
                        }

                        InteractionKind::FarField => {
                            let table = required_table(table)?;
                            let Some(moments) = multipoles[source].coefficients() else {
                                return Err(FgtError::Failed(format!(
                                    "M2P failed, far-field moments of box {source} have not been computed"
                                )));
                            };
                            evaluate_far_field(
                                queries,
                                &interior,
                                &source_box.centroid,
                                scale,
                                table,
                                moments,
                                &mut interior_potentials,
                            );
                            evaluate_far_field(
                                queries,
                                &exterior,
                                &source_box.centroid,
                                scale,
                                table,
                                moments,
                                &mut exterior_potentials,
                            );
                        }

                        InteractionKind::Translation => {
                            let table = required_table(table)?;
                            let Some(moments) = multipoles[source].coefficients() else {
                                return Err(FgtError::Failed(format!(
                                    "M2L failed, far-field moments of box {source} have not been computed"
                                )));
                            };
                            if !interior.is_empty() {
                                if local.is_empty() {
                                    local = vec![T::zero(); table.n_coeffs];
                                }
                                translate_far_field_to_local(
                                    moments,
                                    &source_box.centroid,
                                    &target_box.centroid,
                                    scale,
                                    table,
                                    &mut local,
                                );
                            }
                            evaluate_far_field(
                                queries,
                                &exterior,
                                &source_box.centroid,
                                scale,
                                table,
                                moments,
                                &mut exterior_potentials,
                            );
                        }
                    }

                    counts.record(kind);
                }

                Ok(TargetContribution {
                    index,
                    local,
                    interior,
                    interior_potentials,
                    exterior,
                    exterior_potentials,
                    counts,
                })
            })
            .collect::<Result<Vec<_>, FgtError>>()?;

        for contribution in contributions {
            let interior = contribution.interior.iter().zip(contribution.interior_potentials);
            let exterior = contribution.exterior.iter().zip(contribution.exterior_potentials);
            for (&q, p) in interior.chain(exterior) {
                self.potentials[q] += p;
            }
            self.locals[contribution.index] = contribution.local;
            self.interaction_counts += contribution.counts;
        }

        Ok(())
    }
}
