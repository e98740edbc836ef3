//! Min-max quantization of raw features into level indices.
//!
//! The range is global (one min and one max over the whole matrix) and is
//! recomputed on every call. Quantizing a train split and a test split
//! separately therefore maps them against *different* ranges; callers that
//! want a shared range can compute a [`QuantizeRange`] once and reuse it.

use crate::error::{HdcError, Result};
use crate::matrix::{FeatureMatrix, Matrix, RawMatrix};

/// Largest supported bit width (levels must fit in `u32`).
pub const MAX_BITS: u32 = 31;

/// Global value range of a raw matrix.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuantizeRange {
    pub min: f64,
    pub max: f64,
}

impl QuantizeRange {
    /// Scan a matrix for its global min and max.
    ///
    /// Fails on an empty matrix or on any NaN/infinite value.
    pub fn of(values: &RawMatrix) -> Result<Self> {
        if values.as_slice().is_empty() {
            return Err(HdcError::EmptyInput("cannot quantize an empty matrix".into()));
        }
        check_finite(values)?;

        let (min, max) = values
            .as_slice()
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        Ok(Self { min, max })
    }

    /// Map one value to a level in `[0, 2^bits - 1]`.
    ///
    /// A degenerate range (`max == min`) maps everything to level 0.
    pub fn level(&self, value: f64, bits: u32) -> u32 {
        let top = max_level(bits);
        if self.max <= self.min {
            return 0;
        }

        // Halved operands keep the span finite for ranges near f64::MAX
        let span = self.max / 2.0 - self.min / 2.0;
        let scaled = ((value / 2.0 - self.min / 2.0) / span * top as f64).round_ties_even();
        scaled.clamp(0.0, top as f64) as u32
    }

    /// Quantize a whole matrix against this range.
    ///
    /// Values outside the range are clamped; NaN or infinite values fail.
    pub fn quantize(&self, values: &RawMatrix, bits: u32) -> Result<FeatureMatrix> {
        check_bits(bits)?;
        check_finite(values)?;

        let levels = values
            .as_slice()
            .iter()
            .map(|&v| self.level(v, bits))
            .collect();
        Matrix::from_vec(values.rows(), values.cols(), levels)
    }
}

fn check_finite(values: &RawMatrix) -> Result<()> {
    match values.as_slice().iter().position(|v| !v.is_finite()) {
        Some(i) => Err(HdcError::NonFiniteValue {
            row: i / values.cols(),
            column: i % values.cols(),
        }),
        None => Ok(()),
    }
}

fn max_level(bits: u32) -> u32 {
    ((1u64 << bits) - 1) as u32
}

fn check_bits(bits: u32) -> Result<()> {
    if bits == 0 || bits > MAX_BITS {
        return Err(HdcError::InvalidConfig(format!(
            "quantization bit width must be in 1..={}, got {}",
            MAX_BITS, bits
        )));
    }
    Ok(())
}

/// Quantize a raw matrix into `2^bits` levels using its own min/max.
///
/// `level = round((value - min) / (max - min) * (2^bits - 1))`, rounding
/// half to even, clamped to the valid range.
pub fn min_max_quantize(values: &RawMatrix, bits: u32) -> Result<FeatureMatrix> {
    check_bits(bits)?;
    QuantizeRange::of(values)?.quantize(values, bits)
}

/// Number of levels produced by a given bit width.
pub fn levels_for_bits(bits: u32) -> usize {
    1usize << bits
}

/// Level memory size paired with a quantizer bit width.
///
/// The memory holds twice the levels the quantizer can emit, so the top
/// quantized level sits half way along the level profile instead of at the
/// negation of level 0 (4 bits pairs with 32 levels).
pub fn level_memory_size(bits: u32) -> usize {
    levels_for_bits(bits) * 2
}
