//! Hypervector type for memory entries.
//!
//! Identifier and level memories hold bipolar hypervectors with elements in
//! {-1, +1}. Internally stored as i8 for memory efficiency.

use std::ops::Index;

/// A high-dimensional bipolar vector.
///
/// Memory entries are immutable once generated; the only mutating access is
/// crate-internal and used while a memory is being built.
#[derive(Clone, Debug)]
pub struct Hypervector {
    data: Vec<i8>,
}

impl Hypervector {
    /// Create a vector from raw data.
    pub fn from_data(data: Vec<i8>) -> Self {
        Self { data }
    }

    /// Get the dimensionality.
    pub fn dimensions(&self) -> usize {
        self.data.len()
    }

    /// Get the raw data as a slice.
    pub fn data(&self) -> &[i8] {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut [i8] {
        &mut self.data
    }

    /// Compute the L2 norm.
    pub fn norm(&self) -> f64 {
        let sum_sq: i64 = self.data.iter().map(|&v| (v as i64) * (v as i64)).sum();
        (sum_sq as f64).sqrt()
    }

    /// Number of positions where the two vectors disagree.
    pub fn hamming_distance(&self, other: &Hypervector) -> usize {
        assert_eq!(
            self.dimensions(),
            other.dimensions(),
            "Dimension mismatch in hamming distance"
        );

        self.data
            .iter()
            .zip(other.data.iter())
            .filter(|(&x, &y)| x != y)
            .count()
    }

    /// Widen to i32 (the element type of encoded rows).
    pub fn to_i32(&self) -> Vec<i32> {
        self.data.iter().map(|&v| v as i32).collect()
    }
}

impl Index<usize> for Hypervector {
    type Output = i8;

    fn index(&self, index: usize) -> &Self::Output {
        &self.data[index]
    }
}

impl PartialEq for Hypervector {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl Eq for Hypervector {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_norm() {
        let v = Hypervector::from_data(vec![1, -1, 1, -1]);
        assert!((v.norm() - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_hamming_distance() {
        let a = Hypervector::from_data(vec![1, -1, 1, -1]);
        let b = Hypervector::from_data(vec![1, 1, 1, 1]);
        assert_eq!(a.hamming_distance(&b), 2);
        assert_eq!(a.hamming_distance(&a), 0);
    }

    #[test]
    fn test_to_i32() {
        let v = Hypervector::from_data(vec![1, -1]);
        assert_eq!(v.to_i32(), vec![1, -1]);
    }
}
