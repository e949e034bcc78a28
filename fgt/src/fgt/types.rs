//! Data structures for the fast Gauss transform
use std::ops::AddAssign;

use ndarray::{Array1, Array2};

use crate::{
    fgt::{kernel::GaussianKernel, multi_index::MultiIndexTable},
    grid::types::Grid,
    traits::{
        general::FgtScalar,
        types::{FgtError, OperatorTime},
    },
};

/// Holds all required data and metadata for evaluating a fast Gauss transform kernel density
/// estimate over a uniform grid.
#[derive(Debug, Clone)]
pub struct GaussTransform<T>
where
    T: FgtScalar,
{
    /// Query coordinates, shape `[dim, n_queries]`.
    pub(crate) queries: Array2<T>,

    /// Reference coordinates, shape `[dim, n_references]`.
    pub(crate) references: Array2<T>,

    /// The Gaussian kernel being summed.
    pub(crate) kernel: GaussianKernel<T>,

    /// Absolute error tolerance.
    pub(crate) tolerance: T,

    /// Dimension of the point data.
    pub(crate) dim: usize,

    /// User supplied replacement for the far-field threshold `nfmax`.
    pub(crate) far_field_threshold: Option<usize>,

    /// User supplied replacement for the local threshold `nlmax`.
    pub(crate) local_threshold: Option<usize>,

    /// Whether stage timings are recorded.
    pub(crate) timed: bool,

    /// Grid built over the reference points, set by `evaluate_grid`.
    pub(crate) grid: Option<Grid<T>>,

    /// Interaction range and thresholds, set by `evaluate_grid`.
    pub(crate) parameters: Option<InteractionParameters>,

    /// Multi-index table, only built when some box is large enough to use an expansion.
    pub(crate) multi_indices: Option<MultiIndexTable<T>>,

    /// Far-field moments indexed by box id.
    pub(crate) multipoles: Vec<MultipoleExpansion<T>>,

    /// Local coefficients indexed by box id, empty for boxes evaluated point by point.
    pub(crate) locals: Vec<Vec<T>>,

    /// Raw, unnormalised kernel sums per query.
    pub(crate) potentials: Vec<T>,

    /// Normalised densities, set by `normalise`.
    pub(crate) densities: Option<Array1<T>>,

    /// Stage timings.
    pub(crate) operator_times: Vec<OperatorTime>,

    /// Interaction path statistics.
    pub(crate) interaction_counts: InteractionCounts,
}

/// Builder for [`GaussTransform`].
///
/// # Example
/// ```
/// use fgt::{Evaluate, GaussTransformBuilder};
/// use fgt::grid::helpers::points_fixture;
///
/// let references = points_fixture::<f64>(500, 2, None, None, Some(0));
/// let queries = points_fixture::<f64>(100, 2, None, None, Some(1));
///
/// let mut fgt = GaussTransformBuilder::new()
///     .points(&queries, &references)
///     .unwrap()
///     .parameters(0.3, 1e-4)
///     .unwrap()
///     .build()
///     .unwrap();
///
/// fgt.evaluate().unwrap();
/// assert_eq!(fgt.densities().unwrap().len(), 100);
/// ```
#[derive(Debug, Clone)]
pub struct GaussTransformBuilder<T>
where
    T: FgtScalar,
{
    pub(crate) queries: Option<Array2<T>>,
    pub(crate) references: Option<Array2<T>>,
    pub(crate) bandwidth: Option<T>,
    pub(crate) tolerance: Option<T>,
    pub(crate) far_field_threshold: Option<usize>,
    pub(crate) local_threshold: Option<usize>,
    pub(crate) timed: bool,
}

/// Far-field (Hermite) moments of a reference box.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum MultipoleExpansion<T> {
    /// Moments have not been formed, either because the box is below the far-field threshold
    /// or because `p2m` has not run yet.
    #[default]
    Uncomputed,

    /// Moments about the box centroid, of length `p^d`. Entry 0 is the number of reference
    /// points in the box.
    Computed(Vec<T>),
}

impl<T> MultipoleExpansion<T> {
    /// Whether the moments have been formed.
    pub fn is_computed(&self) -> bool {
        matches!(self, MultipoleExpansion::Computed(_))
    }

    /// The moments, if formed.
    pub fn coefficients(&self) -> Option<&[T]> {
        match self {
            MultipoleExpansion::Computed(coefficients) => Some(coefficients),
            MultipoleExpansion::Uncomputed => None,
        }
    }
}

/// The four ways a (reference box, query box) pair can interact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionKind {
    /// Pairwise kernel evaluation (P2P).
    Direct,

    /// Reference points injected straight into the query box's local expansion (P2L).
    DirectLocal,

    /// Far-field expansion evaluated at each query point (M2P).
    FarField,

    /// Far-field expansion translated into the query box's local expansion (M2L).
    Translation,
}

/// Interaction radius and box size thresholds that drive the choice of interaction path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteractionParameters {
    /// Interaction radius in boxes, `ceil(sqrt(-2 ln tau)) + 1`.
    pub kdis: usize,

    /// Reference boxes holding more points than this use a far-field expansion.
    pub nfmax: usize,

    /// Query boxes holding more points than this use a local expansion.
    pub nlmax: usize,
}

impl InteractionParameters {
    /// Derive the interaction radius from the tolerance and the thresholds from the
    /// truncation order, `nfmax = nlmax = p^(d-1) + 2`, unless overridden.
    ///
    /// # Arguments
    /// * `tolerance` - Absolute error tolerance.
    /// * `order` - Truncation order `p`.
    /// * `dim` - Dimension of the point data.
    /// * `far_field_threshold` - Optional replacement for `nfmax`.
    /// * `local_threshold` - Optional replacement for `nlmax`.
    pub fn new<T: FgtScalar>(
        tolerance: T,
        order: usize,
        dim: usize,
        far_field_threshold: Option<usize>,
        local_threshold: Option<usize>,
    ) -> Result<Self, FgtError> {
        let two = T::from_real(2.0);

        let kdis = (-two * tolerance.ln())
            .sqrt()
            .ceil()
            .to_usize()
            .and_then(|k| k.checked_add(1))
            .ok_or_else(|| {
                FgtError::InvalidConfiguration(format!(
                    "Tolerance {:?} does not give a finite interaction radius",
                    tolerance
                ))
            })?;

        // Past usize::MAX no box can hold enough points to need an expansion anyway
        let threshold = u32::try_from(dim.saturating_sub(1))
            .ok()
            .and_then(|exponent| order.checked_pow(exponent))
            .map_or(usize::MAX, |n| n.saturating_add(2));

        Ok(Self {
            kdis,
            nfmax: far_field_threshold.unwrap_or(threshold),
            nlmax: local_threshold.unwrap_or(threshold),
        })
    }

    /// Interaction path for a reference box holding `n_references` points and a query box
    /// holding `n_queries` points.
    pub fn classify(&self, n_references: usize, n_queries: usize) -> InteractionKind {
        match (n_references > self.nfmax, n_queries > self.nlmax) {
            (false, false) => InteractionKind::Direct,
            (false, true) => InteractionKind::DirectLocal,
            (true, false) => InteractionKind::FarField,
            (true, true) => InteractionKind::Translation,
        }
    }
}

/// Number of box pairs handled by each interaction path, plus the number of expansions formed
/// and evaluated, during the last evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InteractionCounts {
    /// Box pairs summed pairwise (P2P).
    pub direct: usize,

    /// Box pairs injected into a local expansion (P2L).
    pub direct_local: usize,

    /// Box pairs evaluated from a far-field expansion (M2P).
    pub far_field: usize,

    /// Box pairs translated far-field to local (M2L).
    pub translation: usize,

    /// Far-field expansions formed (P2M).
    pub p2m: usize,

    /// Query boxes whose local expansion was evaluated (L2P).
    pub l2p: usize,
}

impl InteractionCounts {
    /// Count one box pair handled by `kind`.
    pub fn record(&mut self, kind: InteractionKind) {
        match kind {
            InteractionKind::Direct => self.direct += 1,
            InteractionKind::DirectLocal => self.direct_local += 1,
            InteractionKind::FarField => self.far_field += 1,
            InteractionKind::Translation => self.translation += 1,
        }
    }

    /// Total number of box pairs visited.
    pub fn n_pairs(&self) -> usize {
        self.direct + self.direct_local + self.far_field + self.translation
    }
}

impl AddAssign for InteractionCounts {
    fn add_assign(&mut self, other: Self) {
        self.direct += other.direct;
        self.direct_local += other.direct_local;
        self.far_field += other.far_field;
        self.translation += other.translation;
        self.p2m += other.p2m;
        self.l2p += other.l2p;
    }
}
