//! Far-field (Hermite) moment computation
use ndarray::ArrayView2;
use rayon::prelude::*;

use crate::{
    fgt::{
        constants::P2M_MIN_CHUNK_SIZE,
        helpers::{fill_tensor_product, monomials, scaled_offset},
        multi_index::MultiIndexTable,
        types::{GaussTransform, MultipoleExpansion},
    },
    traits::{fgt::SourceTranslation, general::FgtScalar, types::FgtError},
};

/// Far-field moments `A_alpha = 1/alpha! sum_r ((r - c) / s)^alpha` of the reference points
/// `indices` about `centroid`.
///
/// # Arguments
/// * `references` - All reference coordinates, shape `[dim, n_references]`.
/// * `indices` - The references held by the box.
/// * `centroid` - Box centre.
/// * `scale` - Expansion scale `s = sqrt(2h^2)`.
/// * `table` - Multi-index table for the truncation order.
pub fn compute_far_field_moments<T: FgtScalar>(
    references: ArrayView2<T>,
    indices: &[usize],
    centroid: &[T],
    scale: T,
    table: &MultiIndexTable<T>,
) -> Vec<T> {
    let order = table.order;
    let dim = table.dim;

    let mut moments = vec![T::zero(); table.n_coeffs];
    moments[0] = T::from_count(indices.len());

    if order == 1 {
        return moments;
    }

    let mut offset = vec![T::zero(); dim];
    let mut powers = vec![T::zero(); dim * order];
    let mut basis = vec![T::zero(); table.n_coeffs];

    for &r in indices.iter() {
        scaled_offset(references.column(r), centroid, scale, &mut offset);
        for (axis, &x) in offset.iter().enumerate() {
            monomials(x, &mut powers[axis * order..(axis + 1) * order]);
        }
        fill_tensor_product(&powers, order, &mut basis);

        for (m, &b) in moments.iter_mut().skip(1).zip(basis.iter().skip(1)) {
            *m += b;
        }
    }

    for (m, &w) in moments.iter_mut().zip(table.inv_factorials.iter()) {
        *m *= w;
    }

    moments
}

impl<T> SourceTranslation for GaussTransform<T>
where
    T: FgtScalar,
{
    fn p2m(&mut self) -> Result<(), FgtError> {
        let Some(grid) = self.grid.as_ref() else {
            return Err(FgtError::Failed(
                "P2M failed, grid has not been built".to_string(),
            ));
        };

        let Some(parameters) = self.parameters else {
            return Err(FgtError::Failed(
                "P2M failed, interaction parameters have not been computed".to_string(),
            ));
        };

        let pending = grid
            .boxes
            .iter()
            .filter(|b| {
                b.references.len() > parameters.nfmax && !self.multipoles[b.index].is_computed()
            })
            .map(|b| b.index)
            .collect::<Vec<_>>();

        if pending.is_empty() {
            return Ok(());
        }

        let Some(table) = self.multi_indices.as_ref() else {
            return Err(FgtError::Failed(
                "P2M failed, no multi-index table for boxes above the far-field threshold"
                    .to_string(),
            ));
        };

        let scale = self.kernel.scale();
        let references = self.references.view();

        let moments = pending
            .par_iter()
            .with_min_len(P2M_MIN_CHUNK_SIZE)
            .map(|&index| {
                let source_box = &grid.boxes[index];
                compute_far_field_moments(
                    references,
                    &source_box.references,
                    &source_box.centroid,
                    scale,
                    table,
                )
            })
            .collect::<Vec<_>>();

        self.interaction_counts.p2m += pending.len();

        for (index, coefficients) in pending.into_iter().zip(moments) {
            self.multipoles[index] = MultipoleExpansion::Computed(coefficients);
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        fgt::types::GaussTransformBuilder,
        grid::helpers::points_fixture,
        traits::fgt::Evaluate,
    };
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_moments_by_hand() {
        let references = array![[0.5, 1.5], [1.0, 0.0]];
        let centroid = [1.0, 0.5];
        let scale = 2.0;
        let table = MultiIndexTable::<f64>::new(3, 2).unwrap();

        let moments =
            compute_far_field_moments(references.view(), &[0, 1], &centroid, scale, &table);

        // Scaled offsets (-0.25, 0.25) and (0.25, -0.25)
        let offsets: [[f64; 2]; 2] = [[-0.25, 0.25], [0.25, -0.25]];
        for id in 0..table.n_coeffs {
            let alpha = table.multi_index(id);
            let expected: f64 = offsets
                .iter()
                .map(|x| x[0].powi(alpha[0] as i32) * x[1].powi(alpha[1] as i32))
                .sum::<f64>()
                * table.inv_factorials[id];
            assert_relative_eq!(moments[id], expected, epsilon = 1e-15);
        }
        assert_relative_eq!(moments[0], 2.0);
    }

    #[test]
    fn test_single_term_moments() {
        let references = array![[0.5, 1.5, 3.0]];
        let table = MultiIndexTable::<f64>::new(1, 1).unwrap();
        let moments = compute_far_field_moments(references.view(), &[0, 2], &[1.0], 1.0, &table);
        assert_eq!(moments, vec![2.0]);
    }

    #[test]
    fn test_p2m_is_idempotent() {
        let references = points_fixture::<f64>(200, 2, Some(0.0), Some(2.2), Some(0));
        let queries = points_fixture::<f64>(20, 2, Some(0.0), Some(2.2), Some(1));

        let mut fgt = GaussTransformBuilder::new()
            .points(&queries, &references)
            .unwrap()
            .parameters(1.0, 1e-3)
            .unwrap()
            .thresholds(0, 0)
            .build()
            .unwrap();

        fgt.evaluate_grid().unwrap();
        fgt.p2m().unwrap();

        let once = fgt.multipoles.clone();
        let count = fgt.interaction_counts.p2m;
        assert!(count > 0);

        fgt.p2m().unwrap();
        assert_eq!(fgt.multipoles, once);
        assert_eq!(fgt.interaction_counts.p2m, count);

        let grid = fgt.grid().unwrap();
        for b in grid.boxes.iter() {
            match &fgt.multipoles[b.index] {
                MultipoleExpansion::Computed(moments) => {
                    assert_relative_eq!(moments[0], b.references.len() as f64)
                }
                MultipoleExpansion::Uncomputed => assert!(b.references.is_empty()),
            }
        }
    }

    #[test]
    fn test_p2m_requires_grid() {
        let references = array![[0.0, 1.0]];
        let mut fgt = GaussTransformBuilder::new()
            .points(&references, &references)
            .unwrap()
            .parameters(1.0, 1e-3)
            .unwrap()
            .build()
            .unwrap();
        assert!(fgt.p2m().is_err());
    }
}
