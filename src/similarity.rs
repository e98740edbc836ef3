//! Similarity metrics.
//!
//! Two families of operands show up in the classifier:
//! - bipolar memory entries ([`Hypervector`]), compared when checking the
//!   level/identifier memory profiles;
//! - integer rows (an encoded sample against a class prototype), compared on
//!   every prediction.
//!
//! When compiled with the `simd` feature, bipolar dot products use simsimd.

use crate::vector::Hypervector;
use serde::{Deserialize, Serialize};

/// Similarity rule used for nearest-prototype lookup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Raw inner product (baseline; exact integer arithmetic)
    #[default]
    Dot,
    /// Cosine similarity (scale-invariant)
    Cosine,
}

/// Similarity computation for hypervectors and integer rows.
pub struct Similarity;

impl Similarity {
    /// Raw dot product of two bipolar vectors.
    #[cfg(feature = "simd")]
    pub fn dot(a: &Hypervector, b: &Hypervector) -> f64 {
        use simsimd::SpatialSimilarity;
        i8::dot(a.data(), b.data()).unwrap_or(0.0)
    }

    #[cfg(not(feature = "simd"))]
    pub fn dot(a: &Hypervector, b: &Hypervector) -> f64 {
        assert_eq!(
            a.dimensions(),
            b.dimensions(),
            "Dimension mismatch in dot product"
        );

        a.data()
            .iter()
            .zip(b.data().iter())
            .map(|(&x, &y)| (x as i64) * (y as i64))
            .sum::<i64>() as f64
    }

    /// Cosine similarity of two bipolar vectors, in [-1, 1].
    pub fn cosine(a: &Hypervector, b: &Hypervector) -> f64 {
        let norm_product = a.norm() * b.norm();
        if norm_product < 1e-10 {
            return 0.0;
        }
        Self::dot(a, b) / norm_product
    }

    /// Exact dot product of an encoded row against a prototype row.
    pub fn dot_row(encoded: &[i32], prototype: &[i64]) -> i64 {
        assert_eq!(
            encoded.len(),
            prototype.len(),
            "Dimension mismatch in dot product"
        );

        encoded
            .iter()
            .zip(prototype.iter())
            .map(|(&x, &y)| (x as i64) * y)
            .sum()
    }

    /// Cosine similarity of an encoded row against a prototype row.
    ///
    /// Returns 0.0 when either row has zero norm.
    pub fn cosine_row(encoded: &[i32], prototype: &[i64]) -> f64 {
        let dot = Self::dot_row(encoded, prototype) as f64;
        let norm_e = encoded
            .iter()
            .map(|&x| (x as f64) * (x as f64))
            .sum::<f64>()
            .sqrt();
        let norm_p = prototype
            .iter()
            .map(|&x| (x as f64) * (x as f64))
            .sum::<f64>()
            .sqrt();

        if norm_e < 1e-10 || norm_p < 1e-10 {
            return 0.0;
        }
        dot / (norm_e * norm_p)
    }

    /// Score an encoded row against a prototype with the given metric.
    pub fn score_row(metric: Metric, encoded: &[i32], prototype: &[i64]) -> f64 {
        match metric {
            Metric::Dot => Self::dot_row(encoded, prototype) as f64,
            Metric::Cosine => Self::cosine_row(encoded, prototype),
        }
    }
}
