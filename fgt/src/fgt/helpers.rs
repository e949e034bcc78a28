//! Helper functions shared by the expansion kernels
use std::time::{Duration, Instant};

use ndarray::ArrayView1;

use crate::traits::general::FgtScalar;

/// Run `f`, and time it if `timed` is set.
pub fn optionally_time<T, F>(timed: bool, f: F) -> (T, Option<Duration>)
where
    F: FnOnce() -> T,
{
    if timed {
        let start = Instant::now();
        let result = f();
        (result, Some(start.elapsed()))
    } else {
        (f(), None)
    }
}

/// Fill `out` with the Hermite functions `h_k(u) = (-1)^k d^k/du^k exp(-u^2)` for
/// `k < out.len()`, by the three term recurrence
/// `h_(k+1) = 2u h_k - 2k h_(k-1)`.
pub fn hermite_functions<T: FgtScalar>(u: T, out: &mut [T]) {
    if out.is_empty() {
        return;
    }

    let two = T::from_real(2.0);
    let two_u = two * u;

    out[0] = (-u * u).exp();
    if out.len() > 1 {
        out[1] = two_u * out[0];
    }
    for k in 1..out.len().saturating_sub(1) {
        out[k + 1] = two_u * out[k] - two * T::from_count(k) * out[k - 1];
    }
}

/// Fill `out` with the powers `x^k` for `k < out.len()`.
pub fn monomials<T: FgtScalar>(x: T, out: &mut [T]) {
    let mut power = T::one();
    for entry in out.iter_mut() {
        *entry = power;
        power *= x;
    }
}

/// Tensor product of per axis tables in the multi-index layout, the first axis most
/// significant. `per_axis` holds `order` entries per axis, axis by axis, and `out` must hold
/// `order^dim` entries.
///
/// `out[id] = prod_axis per_axis[axis * order + alpha(id)[axis]]`
pub fn fill_tensor_product<T: FgtScalar>(per_axis: &[T], order: usize, out: &mut [T]) {
    let dim = per_axis.len() / order;

    out[0] = T::one();
    let mut len = 1;

    // Prepend one axis at a time, the block for exponent 0 is overwritten last as it is also
    // the source
    for axis in (0..dim).rev() {
        let table = &per_axis[axis * order..(axis + 1) * order];
        for a in (0..order).rev() {
            let factor = table[a];
            for j in 0..len {
                out[a * len + j] = factor * out[j];
            }
        }
        len *= order;
    }
}

/// Scaled offsets `(x - centre) / scale` for every axis.
pub fn scaled_offset<T: FgtScalar>(
    x: ArrayView1<T>,
    centre: &[T],
    scale: T,
    out: &mut [T],
) {
    for ((o, &xi), &ci) in out.iter_mut().zip(x.iter()).zip(centre.iter()) {
        *o = (xi - ci) / scale;
    }
}

/// Largest absolute difference between two equally long vectors.
pub fn max_abs_error<T: FgtScalar>(found: ArrayView1<T>, expected: ArrayView1<T>) -> T {
    found
        .iter()
        .zip(expected.iter())
        .map(|(&a, &b)| (a - b).abs())
        .fold(T::zero(), |acc, e| acc.max(e))
}
