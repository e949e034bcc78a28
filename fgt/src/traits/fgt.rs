//! Fast Gauss transform traits
use ndarray::Array1;

use crate::{
    fgt::types::InteractionCounts,
    grid::types::Grid,
    traits::{
        general::FgtScalar,
        kernel::Kernel as KernelTrait,
        types::{FgtError, OperatorTime},
    },
};

/// Interface for source field translations.
pub trait SourceTranslation {
    /// Particle to multipole translations. Computes the far-field (Hermite) moments of every
    /// reference box holding more than `nfmax` points, each box at most once.
    fn p2m(&mut self) -> Result<(), FgtError>;
}

/// Interface for the translations between a reference box and the query boxes in its
/// interaction range.
pub trait SourceToTargetTranslation {
    /// Visit every (reference box, query box) pair within the interaction radius and apply
    /// exactly one of the direct (P2P), direct local accumulation (P2L), far-field evaluation
    /// (M2P) or far-field to local translation (M2L) paths, chosen by the point counts of the
    /// two boxes.
    fn interactions(&mut self) -> Result<(), FgtError>;
}

/// Interface for target field translations.
pub trait TargetTranslation {
    /// Local to particle translations, evaluates the local (Taylor) expansion accumulated at each
    /// query box holding more than `nlmax` points at each of its query points.
    fn l2p(&mut self) -> Result<(), FgtError>;

    /// Divide the raw kernel sums by the kernel normalisation constant times the number of
    /// reference points. Runs exactly once per evaluation.
    fn normalise(&mut self) -> Result<(), FgtError>;
}

/// Interface for evaluating a fast Gauss transform.
pub trait Evaluate
where
    Self::Scalar: FgtScalar,
{
    /// Scalar type
    type Scalar;

    /// Kernel associated with this transform
    type Kernel: KernelTrait<Scalar = Self::Scalar>;

    /// Compute the grid geometry, truncation order and interaction parameters, and bin all
    /// points into grid boxes.
    fn evaluate_grid(&mut self) -> Result<(), FgtError>;

    /// Compute all far-field moments.
    fn evaluate_sources(&mut self) -> Result<(), FgtError>;

    /// Run the box pair interaction sweep.
    fn evaluate_interactions(&mut self) -> Result<(), FgtError>;

    /// Evaluate local expansions and normalise.
    fn evaluate_targets(&mut self) -> Result<(), FgtError>;

    /// Run the full pipeline.
    fn evaluate(&mut self) -> Result<(), FgtError>;

    /// Normalised density estimate at each query point, in input order.
    fn densities(&self) -> Result<&Array1<Self::Scalar>, FgtError>;

    /// The kernel this transform sums.
    fn kernel(&self) -> &Self::Kernel;

    /// Dimension of the point data.
    fn dim(&self) -> usize;

    /// The grid built by the last evaluation.
    fn grid(&self) -> Option<&Grid<Self::Scalar>>;

    /// Number of expansion terms per axis, `p`.
    fn truncation_order(&self) -> Option<usize>;

    /// Number of multipole/local coefficients per box, `p^d`.
    fn n_coeffs(&self) -> Option<usize>;

    /// Stage timings of the last evaluation, empty unless the transform was built as timed.
    fn operator_times(&self) -> &[OperatorTime];

    /// Interaction path statistics of the last evaluation.
    fn interaction_counts(&self) -> &InteractionCounts;
}
