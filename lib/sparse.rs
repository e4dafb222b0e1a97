//! Fixed-capacity coordinate-format storage for the assembled superoperator.

use ndarray as nd;
use num_complex::Complex64 as C64;
use crate::{
    error::{ SleError, SleResult },
    params::AllocationLimits,
};

/// A single stored matrix element.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SparseEntry {
    pub row: usize,
    pub col: usize,
    pub value: C64,
}

/// Append-only triplet buffers with a hard capacity.
///
/// Buffers are allocated once, up front, and never grow past
/// `max_elements - 1` entries. A failed [`push`][Self::push] leaves all
/// previously stored entries in place.
#[derive(Clone, Debug, PartialEq)]
pub struct SparseOutput {
    rows: Vec<usize>,
    cols: Vec<usize>,
    values: Vec<C64>,
    max_elements: usize,
    max_rows: usize,
    n_rows: usize,
}

impl SparseOutput {
    /// Allocate empty buffers for the given limits.
    pub fn new(limits: AllocationLimits) -> Self {
        let AllocationLimits { max_elements, max_rows } = limits;
        Self {
            rows: Vec::with_capacity(max_elements),
            cols: Vec::with_capacity(max_elements),
            values: Vec::with_capacity(max_elements),
            max_elements,
            max_rows,
            n_rows: 0,
        }
    }

    /// Append an element, failing if the element count would reach the
    /// maximum.
    pub fn push(&mut self, row: usize, col: usize, value: C64) -> SleResult<()> {
        if self.values.len() + 1 >= self.max_elements {
            return Err(SleError::ElementCapacity { max: self.max_elements });
        }
        self.rows.push(row);
        self.cols.push(col);
        self.values.push(value);
        Ok(())
    }

    /// Number of stored elements.
    pub fn len(&self) -> usize { self.values.len() }

    pub fn is_empty(&self) -> bool { self.values.is_empty() }

    /// Row indices of all stored elements.
    pub fn rows(&self) -> &[usize] { &self.rows }

    /// Column indices of all stored elements.
    pub fn cols(&self) -> &[usize] { &self.cols }

    /// Values of all stored elements.
    pub fn values(&self) -> &[C64] { &self.values }

    /// Number of rows filled by the last assembly.
    pub fn n_rows(&self) -> usize { self.n_rows }

    pub(crate) fn set_n_rows(&mut self, n_rows: usize) { self.n_rows = n_rows; }

    pub fn max_elements(&self) -> usize { self.max_elements }

    pub fn max_rows(&self) -> usize { self.max_rows }

    /// Iterate over stored elements in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = SparseEntry> + '_ {
        self.rows.iter()
            .zip(&self.cols)
            .zip(&self.values)
            .map(|((&row, &col), &value)| SparseEntry { row, col, value })
    }

    /// Convert to a dense `n_rows × n_rows` matrix, summing duplicate
    /// entries.
    ///
    /// Entries outside the square are dropped.
    pub fn to_dense(&self) -> nd::Array2<C64> {
        let n = self.n_rows;
        let mut dense: nd::Array2<C64> = nd::Array2::zeros((n, n));
        self.iter()
            .filter(|e| e.row < n && e.col < n)
            .for_each(|e| { dense[[e.row, e.col]] += e.value; });
        dense
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn limits(max_elements: usize) -> AllocationLimits {
        AllocationLimits { max_elements, max_rows: 10 }
    }

    #[test]
    fn push_until_full() {
        let mut out = SparseOutput::new(limits(4));
        assert!(out.is_empty());
        assert_eq!(out.max_elements(), 4);
        assert_eq!(out.max_rows(), 10);
        for k in 0..3 {
            out.push(k, k, C64::new(k as f64, 0.0)).unwrap();
        }
        assert_eq!(out.len(), 3);
        let err = out.push(3, 3, C64::new(1.0, 1.0)).unwrap_err();
        assert!(matches!(err, SleError::ElementCapacity { max: 4 }));
        // nothing stored by the failed push
        assert_eq!(out.len(), 3);
        assert_eq!(out.rows(), &[0, 1, 2]);
        assert_eq!(out.cols(), &[0, 1, 2]);
        assert_eq!(out.values()[2], C64::new(2.0, 0.0));
    }

    #[test]
    fn dense_conversion() {
        let mut out = SparseOutput::new(limits(10));
        out.push(0, 1, C64::new(1.0, -2.0)).unwrap();
        out.push(1, 0, C64::new(1.0, -2.0)).unwrap();
        out.push(1, 1, C64::new(3.0, 0.0)).unwrap();
        out.push(1, 1, C64::new(0.5, 0.0)).unwrap();
        out.set_n_rows(2);
        let dense = out.to_dense();
        assert_eq!(dense.dim(), (2, 2));
        assert_eq!(dense[[0, 0]], C64::new(0.0, 0.0));
        assert_eq!(dense[[0, 1]], dense[[1, 0]]);
        assert_eq!(dense[[1, 1]], C64::new(3.5, 0.0));
        assert_eq!(out.iter().count(), 4);
    }
}
