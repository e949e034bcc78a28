//! Constructor for the grid geometry, and selection of the truncation order.
use itertools::{Itertools, MinMaxResult};
use ndarray::ArrayView2;

use crate::{
    grid::{
        constants::{MAX_TRUNCATION_ORDER, RADIUS_RATIO_LIMIT},
        types::GridGeometry,
    },
    traits::{general::FgtScalar, types::FgtError},
};

impl<T> GridGeometry<T>
where
    T: FgtScalar,
{
    /// Lay a uniform grid over the bounding box of a set of reference points, with roughly one
    /// box per bandwidth along each axis, and pick the smallest truncation order whose error
    /// bound for boxes of this size is below the tolerance.
    ///
    /// # Arguments
    /// * `references` - Reference coordinates, shape `[dim, n_references]`.
    /// * `bandwidth` - Kernel bandwidth `h`.
    /// * `tolerance` - Absolute error tolerance `tau`, in (0, 1).
    pub fn new(references: ArrayView2<T>, bandwidth: T, tolerance: T) -> Result<Self, FgtError> {
        let dim = references.nrows();

        if dim == 0 || references.ncols() == 0 {
            return Err(FgtError::InvalidConfiguration(
                "Grid requires a non-empty reference set of positive dimension".to_string(),
            ));
        }

        // Each row holds one axis of every point
        let (min_coordinates, max_coordinates): (Vec<T>, Vec<T>) = references
            .rows()
            .into_iter()
            .map(|axis| match axis.iter().copied().minmax() {
                MinMaxResult::MinMax(min, max) => (min, max),
                MinMaxResult::OneElement(x) => (x, x),
                MinMaxResult::NoElements => (T::zero(), T::zero()),
            })
            .unzip();

        let two = T::from_real(2.0);
        let mut n_boxes_axis = Vec::with_capacity(dim);
        let mut side_length = Vec::with_capacity(dim);
        let mut n_boxes = 1usize;
        let mut radius_ratio = T::zero();

        for axis in 0..dim {
            let extent = max_coordinates[axis] - min_coordinates[axis];

            let n_axis = (extent / bandwidth)
                .floor()
                .to_usize()
                .and_then(|n| n.checked_add(1))
                .ok_or_else(|| {
                    FgtError::InvalidConfiguration(format!(
                        "Axis {axis} with extent {:?} cannot be split into bandwidth sized boxes",
                        extent
                    ))
                })?;

            n_boxes = n_boxes.checked_mul(n_axis).ok_or_else(|| {
                FgtError::InvalidConfiguration(
                    "Total number of grid boxes overflows".to_string(),
                )
            })?;

            let n_axis_real = T::from_count(n_axis);
            radius_ratio = radius_ratio.max(extent / (n_axis_real * two * bandwidth));
            side_length.push(extent / n_axis_real);
            n_boxes_axis.push(n_axis);
        }

        let truncation_order = truncation_order(radius_ratio, dim, tolerance)?;
        let interaction_radius = (-two * bandwidth * bandwidth * tolerance.ln()).sqrt();

        Ok(GridGeometry {
            dim,
            n_boxes_axis,
            side_length,
            min_coordinates,
            n_boxes,
            radius_ratio,
            truncation_order,
            interaction_radius,
        })
    }
}

/// Greengard-Strain bound on the error of truncating the Hermite and Taylor series of the
/// Gaussian after `order` terms per axis, for boxes whose half side is `radius_ratio`
/// bandwidths.
///
/// # Arguments
/// * `radius_ratio` - Half box side over bandwidth.
/// * `dim` - Dimension of the point data.
/// * `order` - Number of expansion terms per axis.
pub fn truncation_error_bound<T>(radius_ratio: T, dim: usize, order: usize) -> T
where
    T: FgtScalar,
{
    let one = T::one();
    let two = T::from_real(2.0);
    let dim = dim as i32;

    let two_r = two * radius_ratio;
    let one_minus_two_r = one - two_r;
    let scale = one / (one_minus_two_r * one_minus_two_r).powi(dim);

    let mut factorial = one;
    let mut two_r_pow = one;
    for k in 1..=order {
        factorial *= T::from_count(k);
        two_r_pow *= two_r;
    }

    let first = (one - two_r_pow) * (one - two_r_pow);
    let second = two_r_pow * (two - two_r_pow) / factorial.sqrt();

    scale * ((first + second).powi(dim) - first.powi(dim))
}

/// Smallest number of expansion terms per axis whose truncation error bound is at most
/// `tolerance`.
///
/// # Arguments
/// * `radius_ratio` - Half box side over bandwidth, must be below 0.5.
/// * `dim` - Dimension of the point data.
/// * `tolerance` - Absolute error tolerance.
pub fn truncation_order<T>(radius_ratio: T, dim: usize, tolerance: T) -> Result<usize, FgtError>
where
    T: FgtScalar,
{
    let degenerate = FgtError::DegenerateGridError {
        ratio: radius_ratio.to_real(),
    };

    // Also rejects NaN
    if !(radius_ratio >= T::zero() && radius_ratio < T::from_real(RADIUS_RATIO_LIMIT)) {
        return Err(degenerate);
    }

    (1..=MAX_TRUNCATION_ORDER)
        .find(|&order| truncation_error_bound(radius_ratio, dim, order) <= tolerance)
        .ok_or(degenerate)
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_box_counts_and_sides() {
        let references = array![[0.0, 2.5, 1.0], [0.0, 1.0, 0.5]];
        let geometry = GridGeometry::<f64>::new(references.view(), 1.0, 1e-3).unwrap();

        assert_eq!(geometry.dim, 2);
        assert_eq!(geometry.n_boxes_axis, vec![3, 2]);
        assert_eq!(geometry.n_boxes, 6);
        assert_relative_eq!(geometry.side_length[0], 2.5 / 3.0);
        assert_relative_eq!(geometry.side_length[1], 0.5);
        assert_relative_eq!(geometry.min_coordinates[0], 0.0);
        assert_relative_eq!(geometry.min_coordinates[1], 0.0);
        assert_relative_eq!(geometry.radius_ratio, 2.5 / 6.0);
    }

    #[test]
    fn test_truncation_order_is_minimal() {
        let references = array![[0.0, 2.5, 1.0], [0.0, 1.0, 0.5]];

        for &tolerance in [1e-2, 1e-3, 1e-6, 1e-9].iter() {
            let geometry = GridGeometry::<f64>::new(references.view(), 1.0, tolerance).unwrap();
            let p = geometry.truncation_order;

            assert!(truncation_error_bound(geometry.radius_ratio, 2, p) <= tolerance);
            if p > 1 {
                assert!(truncation_error_bound(geometry.radius_ratio, 2, p - 1) > tolerance);
            }
        }
    }

    #[test]
    fn test_tighter_tolerance_needs_more_terms() {
        let p_loose = truncation_order(0.3f64, 3, 1e-2).unwrap();
        let p_tight = truncation_order(0.3f64, 3, 1e-10).unwrap();
        assert!(p_tight > p_loose);
    }

    #[test]
    fn test_bound_decreases_with_order() {
        let mut previous = f64::INFINITY;
        for order in 1..30 {
            let bound = truncation_error_bound(0.35f64, 2, order);
            assert!(bound <= previous);
            previous = bound;
        }
        assert!(previous < 1e-10);
    }

    #[test]
    fn test_degenerate_radius_ratio() {
        assert_eq!(
            truncation_order(0.5f64, 2, 1e-3),
            Err(FgtError::DegenerateGridError { ratio: 0.5 })
        );
        assert!(truncation_order(0.75f64, 2, 1e-3).is_err());
        assert!(truncation_order(f64::NAN, 2, 1e-3).is_err());
        assert!(truncation_order(0.49f64, 2, 1e-3).is_ok());
    }

    #[test]
    fn test_single_reference_point() {
        let references = array![[1.0], [-2.0], [3.0]];
        let geometry = GridGeometry::<f64>::new(references.view(), 0.5, 1e-6).unwrap();

        assert_eq!(geometry.n_boxes, 1);
        assert_eq!(geometry.n_boxes_axis, vec![1, 1, 1]);
        assert_relative_eq!(geometry.radius_ratio, 0.0);
        assert_eq!(geometry.truncation_order, 1);
    }

    #[test]
    fn test_interaction_radius() {
        let references = array![[0.0, 1.0]];
        let tolerance = (-2.0f64).exp();
        let geometry = GridGeometry::<f64>::new(references.view(), 2.0, tolerance).unwrap();
        assert_relative_eq!(geometry.interaction_radius, 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_references() {
        let references = ndarray::Array2::<f64>::zeros((2, 0));
        assert!(GridGeometry::<f64>::new(references.view(), 1.0, 1e-3).is_err());
    }

    #[test]
    fn test_grid_too_fine_for_extent() {
        // Bandwidth so small relative to the extent that the box count is not representable
        let references = array![[0.0, 1e300]];
        assert!(matches!(
            GridGeometry::<f64>::new(references.view(), 1e-300, 1e-3),
            Err(FgtError::InvalidConfiguration(_))
        ));

        // Box count per axis fits, the total over all axes does not
        let references = array![[0.0, 1e6], [0.0, 1e6], [0.0, 1e6], [0.0, 1e6]];
        assert!(matches!(
            GridGeometry::<f64>::new(references.view(), 1e-3, 1e-3),
            Err(FgtError::InvalidConfiguration(_))
        ));
    }
}
