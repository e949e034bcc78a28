//! Multi-index addressing of expansion coefficients.
//!
//! Coefficient `id` in `[0, p^d)` stands for the exponent tuple `alpha` with
//! `id = sum_axis alpha[axis] * p^(d - 1 - axis)`, so the first axis is the most significant
//! digit. Every expansion routine in the crate builds and reads coefficients in this layout.
use crate::traits::{general::FgtScalar, types::FgtError};

/// Precomputed exponent tuples and inverse multi-index factorials for truncation order `p` in
/// dimension `d`.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiIndexTable<T>
where
    T: FgtScalar,
{
    /// Number of terms per axis, `p`.
    pub order: usize,

    /// Dimension, `d`.
    pub dim: usize,

    /// Number of coefficients, `p^d`.
    pub n_coeffs: usize,

    /// Stride of each axis in the coefficient layout, `p^(d - 1 - axis)`.
    pub strides: Vec<usize>,

    /// `1 / alpha!` for every coefficient.
    pub inv_factorials: Vec<T>,

    /// `(-1)^|alpha| / alpha!` for every coefficient.
    pub signed_inv_factorials: Vec<T>,

    /// Exponent tuples, `dim` entries per coefficient.
    multi_indices: Vec<usize>,
}

impl<T> MultiIndexTable<T>
where
    T: FgtScalar,
{
    /// Build the table for `order` terms per axis in `dim` dimensions.
    pub fn new(order: usize, dim: usize) -> Result<Self, FgtError> {
        if order == 0 || dim == 0 {
            return Err(FgtError::InvalidConfiguration(format!(
                "Multi-index table needs a positive order and dimension, found p={order}, d={dim}"
            )));
        }

        let n_coeffs = u32::try_from(dim)
            .ok()
            .and_then(|exponent| order.checked_pow(exponent))
            .ok_or_else(|| {
                FgtError::InvalidConfiguration(format!(
                    "Number of expansion coefficients {order}^{dim} overflows"
                ))
            })?;

        let mut strides = vec![1; dim];
        for axis in (0..dim - 1).rev() {
            strides[axis] = strides[axis + 1] * order;
        }

        // Inverse factorials per axis, built by division so large orders underflow to zero
        // instead of overflowing
        let mut inv_factorial_axis = vec![T::one(); order];
        for k in 1..order {
            inv_factorial_axis[k] = inv_factorial_axis[k - 1] / T::from_count(k);
        }

        let mut multi_indices = vec![0usize; n_coeffs * dim];
        let mut inv_factorials = vec![T::one(); n_coeffs];
        let mut signed_inv_factorials = vec![T::one(); n_coeffs];

        for id in 0..n_coeffs {
            let alpha = &mut multi_indices[id * dim..(id + 1) * dim];
            let mut degree = 0;
            for axis in 0..dim {
                alpha[axis] = (id / strides[axis]) % order;
                degree += alpha[axis];
                inv_factorials[id] *= inv_factorial_axis[alpha[axis]];
            }
            signed_inv_factorials[id] = if degree % 2 == 0 {
                inv_factorials[id]
            } else {
                -inv_factorials[id]
            };
        }

        Ok(Self {
            order,
            dim,
            n_coeffs,
            strides,
            inv_factorials,
            signed_inv_factorials,
            multi_indices,
        })
    }

    /// Exponent tuple of coefficient `id`.
    pub fn multi_index(&self, id: usize) -> &[usize] {
        &self.multi_indices[id * self.dim..(id + 1) * self.dim]
    }

    /// Coefficient id of the exponent tuple `alpha`.
    pub fn encode(&self, alpha: &[usize]) -> usize {
        alpha
            .iter()
            .zip(self.strides.iter())
            .map(|(&a, &s)| a * s)
            .sum()
    }

    /// Total degree `|alpha|` of coefficient `id`.
    pub fn degree(&self, id: usize) -> usize {
        self.multi_index(id).iter().sum()
    }
}
