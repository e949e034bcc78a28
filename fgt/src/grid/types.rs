//! Data structures for the uniform grid the fast Gauss transform is computed over.
use crate::traits::general::FgtScalar;

/// Shape of the uniform grid laid over the reference points, together with the truncation
/// order that keeps the expansion error below the requested tolerance for boxes of this size.
#[derive(Debug, Clone, PartialEq)]
pub struct GridGeometry<T>
where
    T: FgtScalar,
{
    /// Dimension of the point data.
    pub dim: usize,

    /// Number of boxes along each axis.
    pub n_boxes_axis: Vec<usize>,

    /// Side length of a box along each axis.
    pub side_length: Vec<T>,

    /// Minimum reference coordinate along each axis, the grid origin.
    pub min_coordinates: Vec<T>,

    /// Total number of boxes, the product of `n_boxes_axis`.
    pub n_boxes: usize,

    /// Half box side over bandwidth, maximised over all axes.
    pub radius_ratio: T,

    /// Number of expansion terms per axis, `p`.
    pub truncation_order: usize,

    /// Distance beyond which a single kernel contribution drops below the tolerance,
    /// `h sqrt(-2 ln tau)`.
    pub interaction_radius: T,
}

/// A single box of the grid, owns the indices of the points binned into it.
#[derive(Debug, Clone, PartialEq)]
pub struct GridBox<T>
where
    T: FgtScalar,
{
    /// Linear id of this box.
    pub index: usize,

    /// Per axis box coordinates.
    pub coordinates: Vec<usize>,

    /// Centre of the box.
    pub centroid: Vec<T>,

    /// Indices of the query points in this box.
    pub queries: Vec<usize>,

    /// Indices of the reference points in this box.
    pub references: Vec<usize>,
}

/// Arena of grid boxes indexed by linear box id.
#[derive(Debug, Clone)]
pub struct Grid<T>
where
    T: FgtScalar,
{
    /// Geometry shared by all boxes.
    pub geometry: GridGeometry<T>,

    /// All boxes, `boxes[i].index == i`.
    pub boxes: Vec<GridBox<T>>,
}
