//! Technical coefficient matrix
//!
//! Dense K×K Leontief matrix per country. Entry `A[i][j]` is the quantity of
//! input commodity `i` required per unit of output commodity `j`.
//!
//! # Critical Invariants
//!
//! - Every entry is non-negative and finite
//! - Every column sum lies in [0, 1): a column sum at or above 1 means the
//!   sector consumes at least as much value as it produces

use crate::models::commodity::{Commodity, COMMODITY_COUNT};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when constructing a coefficient matrix.
#[derive(Debug, Error, PartialEq)]
pub enum CoefficientError {
    #[error("coefficient matrix has {len} entries, expected {expected}")]
    WrongLength { len: usize, expected: usize },

    #[error("coefficient A[{input},{output}] = {value} is negative or non-finite")]
    BadEntry {
        input: usize,
        output: usize,
        value: f64,
    },

    #[error("column {output} sums to {sum}, must be in [0, 1)")]
    ColumnSumOutOfRange { output: usize, sum: f64 },
}

/// Dense K×K technical coefficient matrix, row-major.
///
/// # Example
/// ```
/// use economy_simulator_core_rs::models::coefficients::TechnicalCoefficientMatrix;
/// use economy_simulator_core_rs::models::commodity::{Commodity, COMMODITY_COUNT};
///
/// let mut flat = vec![0.0; COMMODITY_COUNT * COMMODITY_COUNT];
/// // One unit of ConsumerGoods needs 0.1 units of Petroleum.
/// flat[Commodity::Petroleum.index() * COMMODITY_COUNT + Commodity::ConsumerGoods.index()] = 0.1;
/// let a = TechnicalCoefficientMatrix::from_flat(&flat).unwrap();
/// assert_eq!(a.get(Commodity::Petroleum, Commodity::ConsumerGoods), 0.1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalCoefficientMatrix {
    /// Row-major entries, `entries[i * K + j] = A[i][j]`.
    entries: Vec<f64>,
}

impl TechnicalCoefficientMatrix {
    /// The zero matrix (no intermediate inputs required).
    pub fn zero() -> Self {
        Self {
            entries: vec![0.0; COMMODITY_COUNT * COMMODITY_COUNT],
        }
    }

    /// Build from a flattened row-major K×K slice, validating entries and
    /// column sums.
    pub fn from_flat(flat: &[f64]) -> Result<Self, CoefficientError> {
        let expected = COMMODITY_COUNT * COMMODITY_COUNT;
        if flat.len() != expected {
            return Err(CoefficientError::WrongLength {
                len: flat.len(),
                expected,
            });
        }
        for i in 0..COMMODITY_COUNT {
            for j in 0..COMMODITY_COUNT {
                let value = flat[i * COMMODITY_COUNT + j];
                if !value.is_finite() || value < 0.0 {
                    return Err(CoefficientError::BadEntry {
                        input: i,
                        output: j,
                        value,
                    });
                }
            }
        }
        for j in 0..COMMODITY_COUNT {
            let sum: f64 = (0..COMMODITY_COUNT)
                .map(|i| flat[i * COMMODITY_COUNT + j])
                .sum();
            if !(0.0..1.0).contains(&sum) {
                return Err(CoefficientError::ColumnSumOutOfRange { output: j, sum });
            }
        }
        Ok(Self {
            entries: flat.to_vec(),
        })
    }

    /// Input requirement of `input` per unit of `output`.
    #[inline]
    pub fn get(&self, input: Commodity, output: Commodity) -> f64 {
        self.entries[input.index() * COMMODITY_COUNT + output.index()]
    }

    /// Raw indexed access for hot loops.
    #[inline]
    pub fn at(&self, input: usize, output: usize) -> f64 {
        self.entries[input * COMMODITY_COUNT + output]
    }

    /// Iterator over the required inputs (positive coefficients) of an
    /// output commodity, as `(input_index, coefficient)` pairs in index order.
    pub fn required_inputs(&self, output: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        (0..COMMODITY_COUNT).filter_map(move |i| {
            let a = self.entries[i * COMMODITY_COUNT + output];
            if a > 0.0 {
                Some((i, a))
            } else {
                None
            }
        })
    }

    /// Column sum for an output commodity.
    pub fn column_sum(&self, output: usize) -> f64 {
        (0..COMMODITY_COUNT)
            .map(|i| self.entries[i * COMMODITY_COUNT + output])
            .sum()
    }

    /// Flattened row-major view (for snapshots).
    pub fn as_flat(&self) -> &[f64] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_with(entries: &[(usize, usize, f64)]) -> Vec<f64> {
        let mut flat = vec![0.0; COMMODITY_COUNT * COMMODITY_COUNT];
        for &(i, j, v) in entries {
            flat[i * COMMODITY_COUNT + j] = v;
        }
        flat
    }

    #[test]
    fn test_zero_matrix_has_no_required_inputs() {
        let a = TechnicalCoefficientMatrix::zero();
        for j in 0..COMMODITY_COUNT {
            assert_eq!(a.required_inputs(j).count(), 0);
        }
    }

    #[test]
    fn test_from_flat_rejects_wrong_length() {
        let err = TechnicalCoefficientMatrix::from_flat(&[0.0; 100]).unwrap_err();
        assert_eq!(
            err,
            CoefficientError::WrongLength {
                len: 100,
                expected: 144
            }
        );
    }

    #[test]
    fn test_from_flat_rejects_negative_entry() {
        let flat = flat_with(&[(2, 7, -0.1)]);
        assert!(matches!(
            TechnicalCoefficientMatrix::from_flat(&flat),
            Err(CoefficientError::BadEntry {
                input: 2,
                output: 7,
                ..
            })
        ));
    }

    #[test]
    fn test_from_flat_rejects_unprofitable_column() {
        // Column 3 sums to exactly 1.0.
        let flat = flat_with(&[(0, 3, 0.6), (1, 3, 0.4)]);
        assert!(matches!(
            TechnicalCoefficientMatrix::from_flat(&flat),
            Err(CoefficientError::ColumnSumOutOfRange { output: 3, .. })
        ));
    }

    #[test]
    fn test_required_inputs_in_index_order() {
        let flat = flat_with(&[(4, 8, 0.15), (2, 8, 0.10)]);
        let a = TechnicalCoefficientMatrix::from_flat(&flat).unwrap();
        let inputs: Vec<(usize, f64)> = a.required_inputs(8).collect();
        assert_eq!(inputs, vec![(2, 0.10), (4, 0.15)]);
    }
}
