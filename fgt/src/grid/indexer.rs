//! Mixed radix indexing of grid boxes, the first axis is the fastest varying digit.

/// Linear id of the box with per axis coordinates `coordinates`.
///
/// # Arguments
/// * `coordinates` - Box coordinate along each axis, `coordinates[axis] < n_boxes_axis[axis]`.
/// * `n_boxes_axis` - Number of boxes along each axis.
pub fn encode(coordinates: &[usize], n_boxes_axis: &[usize]) -> usize {
    let mut id = 0;
    let mut stride = 1;
    for (&coordinate, &n) in coordinates.iter().zip(n_boxes_axis) {
        id += coordinate * stride;
        stride *= n;
    }
    id
}

/// Per axis coordinates of the box with linear id `id`, the inverse of [`encode`].
///
/// # Arguments
/// * `id` - Linear box id, less than the product of `n_boxes_axis`.
/// * `n_boxes_axis` - Number of boxes along each axis.
pub fn decode(id: usize, n_boxes_axis: &[usize]) -> Vec<usize> {
    let mut remainder = id;
    n_boxes_axis
        .iter()
        .map(|&n| {
            let coordinate = remainder % n;
            remainder /= n;
            coordinate
        })
        .collect()
}

/// Ids of all boxes whose coordinates differ from those of box `id` by at most `radius` along
/// every axis, including `id` itself.
///
/// Offsets form a radix `2 radius + 1` counter over the axes. The counter is clipped to the
/// grid up front so candidates outside `[0, n_boxes_axis[axis])` are never generated.
///
/// # Arguments
/// * `id` - Linear id of the centre box.
/// * `n_boxes_axis` - Number of boxes along each axis.
/// * `radius` - Neighbourhood half width in boxes.
pub fn neighbours(id: usize, n_boxes_axis: &[usize], radius: usize) -> Vec<usize> {
    let centre = decode(id, n_boxes_axis);

    let lower: Vec<usize> = centre.iter().map(|&c| c.saturating_sub(radius)).collect();
    let window: Vec<usize> = centre
        .iter()
        .zip(n_boxes_axis)
        .zip(&lower)
        .map(|((&c, &n), &l)| c.saturating_add(radius).min(n - 1) - l + 1)
        .collect();
    let n_candidates: usize = window.iter().product();

    let mut candidate = vec![0usize; centre.len()];
    (0..n_candidates)
        .map(|counter| {
            for (axis, offset) in decode(counter, &window).into_iter().enumerate() {
                candidate[axis] = lower[axis] + offset;
            }
            encode(&candidate, n_boxes_axis)
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use itertools::Itertools;

    #[test]
    fn test_encode_decode_round_trip() {
        for n_boxes_axis in [vec![1], vec![5], vec![3, 4], vec![2, 1, 3], vec![4, 3, 2, 2]] {
            let n_boxes: usize = n_boxes_axis.iter().product();
            for id in 0..n_boxes {
                let coordinates = decode(id, &n_boxes_axis);
                assert!(coordinates
                    .iter()
                    .zip(&n_boxes_axis)
                    .all(|(&c, &n)| c < n));
                assert_eq!(encode(&coordinates, &n_boxes_axis), id);
            }
        }
    }

    #[test]
    fn test_first_axis_fastest() {
        let n_boxes_axis = [3, 4];
        assert_eq!(encode(&[1, 0], &n_boxes_axis), 1);
        assert_eq!(encode(&[0, 1], &n_boxes_axis), 3);
        assert_eq!(encode(&[2, 3], &n_boxes_axis), 11);
        assert_eq!(decode(7, &n_boxes_axis), vec![1, 2]);
    }

    #[test]
    fn test_radius_zero() {
        let n_boxes_axis = [3, 4, 2];
        for id in 0..24 {
            assert_eq!(neighbours(id, &n_boxes_axis, 0), vec![id]);
        }
    }

    #[test]
    fn test_one_dimensional_edges() {
        let n_boxes_axis = [5];
        assert_eq!(neighbours(0, &n_boxes_axis, 1).into_iter().sorted().collect_vec(), vec![0, 1]);
        assert_eq!(
            neighbours(2, &n_boxes_axis, 1).into_iter().sorted().collect_vec(),
            vec![1, 2, 3]
        );
        assert_eq!(neighbours(4, &n_boxes_axis, 1).into_iter().sorted().collect_vec(), vec![3, 4]);
        for id in 0..5 {
            assert!(neighbours(id, &n_boxes_axis, 1).len() <= 3);
        }
    }

    #[test]
    fn test_neighbours_match_brute_force() {
        let n_boxes_axis = [4, 3, 5];
        let n_boxes: usize = n_boxes_axis.iter().product();

        for radius in 0..4 {
            for id in 0..n_boxes {
                let centre = decode(id, &n_boxes_axis);
                let expected = (0..n_boxes)
                    .filter(|&other| {
                        decode(other, &n_boxes_axis)
                            .iter()
                            .zip(&centre)
                            .all(|(&a, &b)| a.abs_diff(b) <= radius)
                    })
                    .collect_vec();

                let found = neighbours(id, &n_boxes_axis, radius)
                    .into_iter()
                    .sorted()
                    .collect_vec();

                assert_eq!(found, expected);
            }
        }
    }

    #[test]
    fn test_neighbourhoods_are_symmetric() {
        let n_boxes_axis = [5, 4];
        for a in 0..20 {
            for b in neighbours(a, &n_boxes_axis, 2) {
                assert!(neighbours(b, &n_boxes_axis, 2).contains(&a));
            }
        }
    }
}
