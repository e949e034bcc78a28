//! Binning of query and reference points into grid boxes.
use ndarray::{ArrayView1, ArrayView2};
use rayon::prelude::*;

use crate::{
    grid::{
        indexer::decode,
        types::{Grid, GridBox, GridGeometry},
    },
    traits::{general::FgtScalar, types::FgtError},
};

impl<T> GridGeometry<T>
where
    T: FgtScalar,
{
    /// Bin of coordinate `x` along `axis`, clamped to the grid. Points outside the reference
    /// bounding box land in the edge bins, NaN lands in bin 0.
    pub fn bin_index(&self, axis: usize, x: T) -> usize {
        let n = self.n_boxes_axis[axis];
        let side = self.side_length[axis];

        if side <= T::zero() {
            return 0;
        }

        let t = (x - self.min_coordinates[axis]) / side;
        if !(t > T::zero()) {
            return 0;
        }

        t.floor().to_usize().map_or(n - 1, |bin| bin.min(n - 1))
    }

    /// Linear id of the box containing `point`.
    pub fn box_index(&self, point: ArrayView1<T>) -> usize {
        // Horner over axes from last to first, so the first axis is the fastest varying digit
        (0..self.dim)
            .rev()
            .fold(0, |id, axis| id * self.n_boxes_axis[axis] + self.bin_index(axis, point[axis]))
    }

    /// Centre of the box with per axis coordinates `coordinates`.
    pub fn centroid(&self, coordinates: &[usize]) -> Vec<T> {
        let half = T::from_real(0.5);
        coordinates
            .iter()
            .enumerate()
            .map(|(axis, &c)| {
                self.min_coordinates[axis] + (T::from_count(c) + half) * self.side_length[axis]
            })
            .collect()
    }

    /// Whether `point` lies within half a box side of `centroid` on every axis. Queries
    /// clamped into an edge box from outside the reference bounding box do not.
    pub fn contains(&self, centroid: &[T], point: ArrayView1<T>) -> bool {
        let half = T::from_real(0.5);
        centroid
            .iter()
            .zip(self.side_length.iter())
            .zip(point.iter())
            .all(|((&c, &side), &x)| (x - c).abs() <= half * side)
    }

    /// Box ids of every column of `points`, computed in parallel.
    pub fn box_indices(&self, points: ArrayView2<T>) -> Vec<usize> {
        (0..points.ncols())
            .into_par_iter()
            .map(|i| self.box_index(points.column(i)))
            .collect()
    }
}

impl<T> Grid<T>
where
    T: FgtScalar,
{
    /// Bin every query and reference point into exactly one box of `geometry`, and compute
    /// the centroids of all boxes.
    ///
    /// Box ids are computed in parallel, points are then appended to their boxes in input
    /// order so each box lists its points in ascending index order.
    ///
    /// # Arguments
    /// * `geometry` - Grid laid over the reference points.
    /// * `queries` - Query coordinates, shape `[dim, n_queries]`.
    /// * `references` - Reference coordinates, shape `[dim, n_references]`.
    pub fn new(
        geometry: GridGeometry<T>,
        queries: ArrayView2<T>,
        references: ArrayView2<T>,
    ) -> Result<Self, FgtError> {
        if queries.nrows() != geometry.dim || references.nrows() != geometry.dim {
            return Err(FgtError::InvalidConfiguration(format!(
                "Point dimensions {} (queries) and {} (references) do not match grid dimension {}",
                queries.nrows(),
                references.nrows(),
                geometry.dim
            )));
        }

        let query_ids = geometry.box_indices(queries);
        let reference_ids = geometry.box_indices(references);

        let mut boxes = (0..geometry.n_boxes)
            .into_par_iter()
            .map(|index| {
                let coordinates = decode(index, &geometry.n_boxes_axis);
                let centroid = geometry.centroid(&coordinates);
                GridBox {
                    index,
                    coordinates,
                    centroid,
                    queries: Vec::new(),
                    references: Vec::new(),
                }
            })
            .collect::<Vec<_>>();

        for (i, &id) in query_ids.iter().enumerate() {
            boxes[id].queries.push(i);
        }

        for (i, &id) in reference_ids.iter().enumerate() {
            boxes[id].references.push(i);
        }

        Ok(Grid { geometry, boxes })
    }

    /// Split the queries of box `index` into those inside the box and those clamped into it
    /// from outside, both in ascending index order. Local expansions about the box centre only
    /// converge for the former.
    ///
    /// # Arguments
    /// * `index` - Linear id of the box.
    /// * `queries` - Query coordinates, shape `[dim, n_queries]`.
    pub fn partition_queries(
        &self,
        index: usize,
        queries: ArrayView2<T>,
    ) -> (Vec<usize>, Vec<usize>) {
        let grid_box = &self.boxes[index];
        grid_box
            .queries
            .iter()
            .copied()
            .partition(|&q| self.geometry.contains(&grid_box.centroid, queries.column(q)))
    }

    /// Number of boxes holding at least one reference point.
    pub fn n_occupied_reference_boxes(&self) -> usize {
        self.boxes.iter().filter(|b| !b.references.is_empty()).count()
    }

    /// Number of boxes holding at least one query point.
    pub fn n_occupied_query_boxes(&self) -> usize {
        self.boxes.iter().filter(|b| !b.queries.is_empty()).count()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::grid::{helpers::points_fixture, indexer::encode};
    use approx::assert_relative_eq;
    use ndarray::array;

    fn unit_grid() -> GridGeometry<f64> {
        // 3 boxes of side 1 along x, 2 boxes of side 1 along y
        let references = array![[0.0, 3.0, 1.5], [0.0, 2.0, 0.5]];
        GridGeometry::new(references.view(), 1.4, 1e-3).unwrap()
    }

    #[test]
    fn test_bins_and_clamping() {
        let geometry = unit_grid();
        assert_eq!(geometry.n_boxes_axis, vec![3, 2]);

        assert_eq!(geometry.bin_index(0, 0.0), 0);
        assert_eq!(geometry.bin_index(0, 0.99), 0);
        assert_eq!(geometry.bin_index(0, 1.0), 1);
        assert_eq!(geometry.bin_index(0, 2.5), 2);

        // Upper edge of the bounding box sits exactly on the end of the last box
        assert_eq!(geometry.bin_index(0, 3.0), 2);
        assert_eq!(geometry.bin_index(1, 2.0), 1);

        // Outside the bounding box
        assert_eq!(geometry.bin_index(0, -10.0), 0);
        assert_eq!(geometry.bin_index(0, 1e300), 2);
        assert_eq!(geometry.bin_index(1, f64::NAN), 0);
    }

    #[test]
    fn test_box_index_matches_encode() {
        let geometry = unit_grid();
        let point = array![2.5, 1.5];
        assert_eq!(
            geometry.box_index(point.view()),
            encode(&[2, 1], &geometry.n_boxes_axis)
        );
    }

    #[test]
    fn test_centroids() {
        let geometry = unit_grid();
        let centroid = geometry.centroid(&[2, 1]);
        assert_relative_eq!(centroid[0], 2.5);
        assert_relative_eq!(centroid[1], 1.5);
    }

    #[test]
    fn test_every_point_assigned_once() {
        let references = points_fixture::<f64>(200, 3, None, None, Some(0));
        let queries = points_fixture::<f64>(150, 3, Some(-0.5), Some(1.5), Some(1));
        let geometry = GridGeometry::new(references.view(), 0.3, 1e-4).unwrap();
        let grid = Grid::new(geometry, queries.view(), references.view()).unwrap();

        let mut seen_queries = vec![0; 150];
        let mut seen_references = vec![0; 200];

        for (id, b) in grid.boxes.iter().enumerate() {
            assert_eq!(b.index, id);
            for &q in b.queries.iter() {
                seen_queries[q] += 1;
            }
            for &r in b.references.iter() {
                seen_references[r] += 1;
                assert_eq!(grid.geometry.box_index(references.column(r)), id);
            }
            assert!(b.references.windows(2).all(|w| w[0] < w[1]));
        }

        assert!(seen_queries.iter().all(|&c| c == 1));
        assert!(seen_references.iter().all(|&c| c == 1));
    }

    #[test]
    fn test_single_reference_single_box() {
        let references = array![[0.25], [0.75]];
        let queries = array![[0.0, 1.0], [0.0, 5.0]];
        let geometry = GridGeometry::new(references.view(), 1.0, 1e-3).unwrap();
        let grid = Grid::new(geometry, queries.view(), references.view()).unwrap();

        assert_eq!(grid.boxes.len(), 1);
        assert_eq!(grid.boxes[0].queries, vec![0, 1]);
        assert_eq!(grid.boxes[0].references, vec![0]);
        assert_relative_eq!(grid.boxes[0].centroid[0], 0.25);
        assert_relative_eq!(grid.boxes[0].centroid[1], 0.75);
    }

    #[test]
    fn test_partition_queries() {
        let references = array![[0.0, 3.0, 1.5], [0.0, 2.0, 0.5]];
        let queries = array![
            [0.5, 2.9, 3.0, 3.6, -4.0, 2.5, f64::NAN],
            [0.5, 1.9, 2.0, 1.5, 0.5, 9.0, 0.5]
        ];
        let geometry = GridGeometry::new(references.view(), 1.4, 1e-3).unwrap();
        let grid = Grid::new(geometry, queries.view(), references.view()).unwrap();

        let origin = encode(&[0, 0], &grid.geometry.n_boxes_axis);
        let corner = encode(&[2, 1], &grid.geometry.n_boxes_axis);

        // Inside, clamped from x < 0, and NaN
        assert_eq!(grid.boxes[origin].queries, vec![0, 4, 6]);
        assert_eq!(
            grid.partition_queries(origin, queries.view()),
            (vec![0], vec![4, 6])
        );

        // Inside, on the bounding box corner, clamped from x > 3, clamped from y > 2
        assert_eq!(grid.boxes[corner].queries, vec![1, 2, 3, 5]);
        assert_eq!(
            grid.partition_queries(corner, queries.view()),
            (vec![1, 2], vec![3, 5])
        );

        let mut total = 0;
        for b in grid.boxes.iter() {
            let (inside, outside) = grid.partition_queries(b.index, queries.view());
            total += inside.len() + outside.len();
        }
        assert_eq!(total, 7);
    }

    #[test]
    fn test_dimension_mismatch() {
        let references = array![[0.0, 1.0], [0.0, 1.0]];
        let queries = array![[0.0], [0.0], [0.0]];
        let geometry = GridGeometry::new(references.view(), 1.0, 1e-3).unwrap();
        assert!(Grid::new(geometry, queries.view(), references.view()).is_err());
    }
}
