//! Builder object to construct fast Gauss transforms
use ndarray::{Array2, ShapeBuilder};

use crate::{
    fgt::{
        kernel::GaussianKernel,
        types::{GaussTransform, GaussTransformBuilder, InteractionCounts},
    },
    traits::{general::FgtScalar, types::FgtError},
};

impl<T> Default for GaussTransformBuilder<T>
where
    T: FgtScalar,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> GaussTransformBuilder<T>
where
    T: FgtScalar,
{
    /// Initialise an empty fast Gauss transform builder
    pub fn new() -> Self {
        Self {
            queries: None,
            references: None,
            bandwidth: None,
            tolerance: None,
            far_field_threshold: None,
            local_threshold: None,
            timed: false,
        }
    }

    /// Associate the builder with query and reference points
    ///
    /// # Arguments
    /// * `queries` - Query coordinates, shape `[dim, n_queries]`, one point per column.
    /// * `references` - Reference coordinates, shape `[dim, n_references]`, one point per column.
    pub fn points(mut self, queries: &Array2<T>, references: &Array2<T>) -> Result<Self, FgtError> {
        let dim = references.nrows();

        if dim == 0 {
            Err(FgtError::InvalidConfiguration(
                "Points must have a positive dimension".to_string(),
            ))
        } else if queries.nrows() != dim {
            Err(FgtError::InvalidConfiguration(format!(
                "Query dimension {} does not match reference dimension {}",
                queries.nrows(),
                dim
            )))
        } else if queries.ncols() == 0 || references.ncols() == 0 {
            Err(FgtError::InvalidConfiguration(
                "Must have a positive number of query and reference points".to_string(),
            ))
        } else {
            self.queries = Some(queries.clone());
            self.references = Some(references.clone());
            Ok(self)
        }
    }

    /// Associate the builder with query and reference points stored as flat slices, the
    /// coordinates of each point contiguous.
    ///
    /// # Arguments
    /// * `dim` - Dimension of the points.
    /// * `queries` - Query coordinates, `dim` values per point.
    /// * `references` - Reference coordinates, `dim` values per point.
    pub fn points_from_slices(
        self,
        dim: usize,
        queries: &[T],
        references: &[T],
    ) -> Result<Self, FgtError> {
        if dim == 0 || queries.len() % dim != 0 || references.len() % dim != 0 {
            return Err(FgtError::InvalidConfiguration(format!(
                "Coordinate slices of length {} and {} are not a whole number of {dim} dimensional points",
                queries.len(),
                references.len()
            )));
        }

        let to_matrix = |coordinates: &[T]| {
            Array2::from_shape_vec((dim, coordinates.len() / dim).f(), coordinates.to_vec())
                .map_err(|e| FgtError::InvalidConfiguration(e.to_string()))
        };

        let queries = to_matrix(queries)?;
        let references = to_matrix(references)?;

        self.points(&queries, &references)
    }

    /// Specify the kernel bandwidth and error tolerance
    ///
    /// # Arguments
    /// * `bandwidth` - Gaussian kernel bandwidth `h`, positive and finite.
    /// * `tolerance` - Absolute error tolerance `tau`, in (0, 1).
    pub fn parameters(mut self, bandwidth: T, tolerance: T) -> Result<Self, FgtError> {
        if !(bandwidth.is_finite() && bandwidth > T::zero()) {
            Err(FgtError::InvalidConfiguration(format!(
                "Bandwidth must be positive and finite, found {:?}",
                bandwidth
            )))
        } else if !(tolerance > T::zero() && tolerance < T::one()) {
            Err(FgtError::InvalidConfiguration(format!(
                "Tolerance must lie in (0, 1), found {:?}",
                tolerance
            )))
        } else {
            self.bandwidth = Some(bandwidth);
            self.tolerance = Some(tolerance);
            Ok(self)
        }
    }

    /// Replace the default box size thresholds `nfmax` and `nlmax` above which reference and
    /// query boxes use expansions. `usize::MAX` for both forces direct evaluation everywhere,
    /// zero forces expansions for every occupied box.
    ///
    /// # Arguments
    /// * `far_field_threshold` - Replacement for `nfmax`.
    /// * `local_threshold` - Replacement for `nlmax`.
    pub fn thresholds(mut self, far_field_threshold: usize, local_threshold: usize) -> Self {
        self.far_field_threshold = Some(far_field_threshold);
        self.local_threshold = Some(local_threshold);
        self
    }

    /// Record the wall time of each stage of the evaluation.
    pub fn timed(mut self, timed: bool) -> Self {
        self.timed = timed;
        self
    }

    /// Finalize and build the fast Gauss transform
    pub fn build(self) -> Result<GaussTransform<T>, FgtError> {
        let (Some(queries), Some(references)) = (self.queries, self.references) else {
            return Err(FgtError::InvalidConfiguration(
                "Must supply query and reference points before building".to_string(),
            ));
        };

        let (Some(bandwidth), Some(tolerance)) = (self.bandwidth, self.tolerance) else {
            return Err(FgtError::InvalidConfiguration(
                "Must supply a bandwidth and tolerance before building".to_string(),
            ));
        };

        let dim = references.nrows();
        let n_queries = queries.ncols();

        Ok(GaussTransform {
            queries,
            references,
            kernel: GaussianKernel::new(bandwidth),
            tolerance,
            dim,
            far_field_threshold: self.far_field_threshold,
            local_threshold: self.local_threshold,
            timed: self.timed,
            grid: None,
            parameters: None,
            multi_indices: None,
            multipoles: Vec::new(),
            locals: Vec::new(),
            potentials: vec![T::zero(); n_queries],
            densities: None,
            operator_times: Vec::new(),
            interaction_counts: InteractionCounts::default(),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_builder_validation() {
        let references = array![[0.0, 1.0], [0.0, 1.0]];
        let queries = array![[0.5], [0.5]];

        let bad_dim = array![[0.5], [0.5], [0.5]];
        assert!(matches!(
            GaussTransformBuilder::new().points(&bad_dim, &references),
            Err(FgtError::InvalidConfiguration(_))
        ));

        let empty = Array2::<f64>::zeros((2, 0));
        assert!(GaussTransformBuilder::new().points(&empty, &references).is_err());
        assert!(GaussTransformBuilder::new().points(&queries, &empty).is_err());

        let zero_dim = Array2::<f64>::zeros((0, 3));
        assert!(GaussTransformBuilder::new().points(&zero_dim, &zero_dim).is_err());

        let builder = GaussTransformBuilder::new().points(&queries, &references).unwrap();
        assert!(builder.clone().parameters(0.0, 1e-3).is_err());
        assert!(builder.clone().parameters(-1.0, 1e-3).is_err());
        assert!(builder.clone().parameters(f64::INFINITY, 1e-3).is_err());
        assert!(builder.clone().parameters(f64::NAN, 1e-3).is_err());
        assert!(builder.clone().parameters(1.0, 0.0).is_err());
        assert!(builder.clone().parameters(1.0, 1.0).is_err());
        assert!(builder.clone().parameters(1.0, f64::NAN).is_err());
        assert!(builder.parameters(1.0, 1e-3).is_ok());
    }

    #[test]
    fn test_build_requires_everything() {
        let references = array![[0.0, 1.0]];

        assert!(GaussTransformBuilder::<f64>::new().build().is_err());
        assert!(GaussTransformBuilder::new()
            .points(&references, &references)
            .unwrap()
            .build()
            .is_err());
        assert!(GaussTransformBuilder::new()
            .parameters(1.0, 1e-3)
            .unwrap()
            .build()
            .is_err());
    }

    #[test]
    fn test_points_from_slices() {
        let queries = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        let references = [1.0, 1.0, 2.0, 2.0];

        let fgt = GaussTransformBuilder::new()
            .points_from_slices(2, &queries, &references)
            .unwrap()
            .parameters(1.0, 1e-3)
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(fgt.queries.shape(), &[2, 3]);
        assert_eq!(fgt.queries[[0, 1]], 2.0);
        assert_eq!(fgt.queries[[1, 1]], 3.0);
        assert_eq!(fgt.references[[1, 1]], 2.0);
        assert_eq!(fgt.dim, 2);

        assert!(GaussTransformBuilder::new()
            .points_from_slices(2, &queries[..5], &references)
            .is_err());
        assert!(GaussTransformBuilder::new()
            .points_from_slices(0, &queries, &references)
            .is_err());
    }
}
