//! Row-major matrices exchanged with collaborators.
//!
//! Every matrix in the pipeline has the same shape contract: `rows` samples,
//! each `cols` wide, stored contiguously in row-major order (the layout of
//! the flat dumps consumed by native implementations).

use crate::error::{HdcError, Result};

/// A dense row-major matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct Matrix<T> {
    data: Vec<T>,
    rows: usize,
    cols: usize,
}

/// Raw (pre-quantization) feature values.
pub type RawMatrix = Matrix<f64>;

/// `n_samples × n_id` quantization levels in `[0, n_lv)`.
pub type FeatureMatrix = Matrix<u32>;

/// `n_samples × n_dim` encoded hypervectors.
pub type EncodedMatrix = Matrix<i32>;

/// `n_class × n_dim` class prototypes.
pub type PrototypeMatrix = Matrix<i64>;

impl<T: Clone + Default> Matrix<T> {
    /// Create a matrix filled with `T::default()`.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![T::default(); rows * cols],
            rows,
            cols,
        }
    }
}

impl<T> Matrix<T> {
    /// Wrap flat row-major data.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<T>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(HdcError::DimensionMismatch {
                expected: rows * cols,
                got: data.len(),
            });
        }
        Ok(Self { data, rows, cols })
    }

    /// Build from nested rows. Every row must have the same width.
    ///
    /// An empty row list yields a `0 × 0` matrix.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self> {
        let n_rows = rows.len();
        let cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(n_rows * cols);

        for row in rows {
            if row.len() != cols {
                return Err(HdcError::DimensionMismatch {
                    expected: cols,
                    got: row.len(),
                });
            }
            data.extend(row);
        }

        Ok(Self {
            data,
            rows: n_rows,
            cols,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Borrow one row.
    pub fn row(&self, index: usize) -> &[T] {
        let start = index * self.cols;
        &self.data[start..start + self.cols]
    }

    /// Mutably borrow one row.
    pub fn row_mut(&mut self, index: usize) -> &mut [T] {
        let start = index * self.cols;
        &mut self.data[start..start + self.cols]
    }

    /// Iterate rows in order.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[T]> {
        (0..self.rows).map(move |i| self.row(i))
    }

    /// Flat row-major data.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }
}

impl<T: Clone> Matrix<T> {
    /// Copy out as nested rows.
    pub fn to_rows(&self) -> Vec<Vec<T>> {
        self.iter_rows().map(<[T]>::to_vec).collect()
    }
}
