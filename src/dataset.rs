//! Reader for the row-major text dump shared with native implementations.
//!
//! A dataset directory holds five files:
//!
//! ```text
//! parameters    test_size, train_size, sample_size (one per line)
//! train.val     one sample per line, whitespace-separated values
//! train.label   one integer label per line
//! test.val
//! test.label
//! ```
//!
//! Values are read as `f64` so both integer dumps (already quantized, or
//! raw pixel intensities) and real-valued dumps load the same way;
//! [`Split::to_levels`] decides whether quantization is needed.

use crate::error::{HdcError, Result};
use crate::matrix::{FeatureMatrix, Matrix, RawMatrix};
use crate::quantize::{level_memory_size, min_max_quantize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Modulus of [`Dataset::checksum`].
pub const CHECKSUM_MODULUS: i64 = 1 << 20;

/// One split (train or test) of a dataset.
#[derive(Clone, Debug, PartialEq)]
pub struct Split {
    pub values: RawMatrix,
    pub labels: Vec<usize>,
}

/// A split converted to quantization levels.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelSplit {
    pub features: FeatureMatrix,
    pub labels: Vec<usize>,
    /// Number of levels the features are drawn from
    pub n_lv: usize,
}

impl Split {
    pub fn new(values: RawMatrix, labels: Vec<usize>) -> Result<Self> {
        if values.rows() != labels.len() {
            return Err(HdcError::ShapeMismatch {
                samples: values.rows(),
                labels: labels.len(),
            });
        }
        Ok(Self { values, labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// True when every value is a non-negative integer.
    pub fn is_integral(&self) -> bool {
        self.values
            .as_slice()
            .iter()
            .all(|&v| v >= 0.0 && v.fract() == 0.0 && v <= u32::MAX as f64)
    }

    /// Convert to level indices.
    ///
    /// Integral data is used as-is with `n_lv = max + 1`. Anything else is
    /// min-max quantized into `2^bits` levels against this split's own
    /// range, with `n_lv = 2^(bits + 1)` (see [`level_memory_size`]), so 4
    /// bits yield levels `0..16` drawn from a 32-entry level memory.
    pub fn to_levels(&self, bits: u32) -> Result<LevelSplit> {
        if self.is_integral() {
            let levels: Vec<u32> = self.values.as_slice().iter().map(|&v| v as u32).collect();
            let n_lv = levels.iter().copied().max().map_or(1, |m| m as usize + 1);
            let features = Matrix::from_vec(self.values.rows(), self.values.cols(), levels)?;
            return Ok(LevelSplit {
                features,
                labels: self.labels.clone(),
                n_lv,
            });
        }

        Ok(LevelSplit {
            features: min_max_quantize(&self.values, bits)?,
            labels: self.labels.clone(),
            n_lv: level_memory_size(bits),
        })
    }
}

/// Train and test splits loaded from a dump directory.
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    pub train: Split,
    pub test: Split,
}

impl Dataset {
    pub fn new(train: Split, test: Split) -> Result<Self> {
        if train.values.cols() != test.values.cols() {
            return Err(HdcError::DimensionMismatch {
                expected: train.values.cols(),
                got: test.values.cols(),
            });
        }
        Ok(Self { train, test })
    }

    /// Load a dataset directory.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let params = read_parameters(&dir.join("parameters"))?;

        let train = Split::new(
            read_values(&dir.join("train.val"), params.train_size, params.sample_size)?,
            read_labels(&dir.join("train.label"), params.train_size)?,
        )?;
        let test = Split::new(
            read_values(&dir.join("test.val"), params.test_size, params.sample_size)?,
            read_labels(&dir.join("test.label"), params.test_size)?,
        )?;

        debug!(
            dir = %dir.display(),
            train = params.train_size,
            test = params.test_size,
            width = params.sample_size,
            "loaded dataset"
        );
        Self::new(train, test)
    }

    /// Number of feature columns.
    pub fn sample_size(&self) -> usize {
        self.train.values.cols()
    }

    /// `max(train label) + 1`.
    pub fn n_class(&self) -> usize {
        self.train.labels.iter().copied().max().map_or(0, |m| m + 1)
    }

    /// Sum of every train value then every test value, modulo 2^20.
    ///
    /// Values are truncated toward zero first and the running sum uses a
    /// truncating remainder, the same as the native dump tools, so negative
    /// data yields a result in `(-2^20, 0]`.
    pub fn checksum(&self) -> i64 {
        self.train
            .values
            .as_slice()
            .iter()
            .chain(self.test.values.as_slice())
            .fold(0i64, |acc, &v| (acc + v as i64) % CHECKSUM_MODULUS)
    }
}

struct Parameters {
    test_size: usize,
    train_size: usize,
    sample_size: usize,
}

fn parse_error(path: &Path, line: usize, message: impl Into<String>) -> HdcError {
    HdcError::Parse {
        path: PathBuf::from(path),
        line,
        message: message.into(),
    }
}

fn read_parameters(path: &Path) -> Result<Parameters> {
    let text = fs::read_to_string(path)?;
    let mut numbers = Vec::with_capacity(3);

    for (i, line) in text.lines().enumerate().filter(|(_, l)| !l.trim().is_empty()) {
        let n = line
            .trim()
            .parse::<usize>()
            .map_err(|e| parse_error(path, i + 1, e.to_string()))?;
        numbers.push(n);
    }

    match numbers[..] {
        [test_size, train_size, sample_size, ..] => Ok(Parameters {
            test_size,
            train_size,
            sample_size,
        }),
        _ => Err(parse_error(
            path,
            numbers.len() + 1,
            "expected test_size, train_size and sample_size",
        )),
    }
}

fn read_values(path: &Path, rows: usize, cols: usize) -> Result<RawMatrix> {
    let text = fs::read_to_string(path)?;
    let mut data = Vec::with_capacity(rows * cols);
    let mut seen = 0;

    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let before = data.len();
        for token in line.split_whitespace() {
            let v = token
                .parse::<f64>()
                .map_err(|e| parse_error(path, i + 1, format!("{:?}: {}", token, e)))?;
            data.push(v);
        }
        let width = data.len() - before;
        if width != cols {
            return Err(parse_error(
                path,
                i + 1,
                format!("expected {} values, found {}", cols, width),
            ));
        }
        seen += 1;
    }

    if seen != rows {
        return Err(parse_error(
            path,
            seen,
            format!("expected {} rows, found {}", rows, seen),
        ));
    }
    Matrix::from_vec(rows, cols, data)
}

fn read_labels(path: &Path, rows: usize) -> Result<Vec<usize>> {
    let text = fs::read_to_string(path)?;
    let mut labels = Vec::with_capacity(rows);

    for (i, line) in text.lines().enumerate() {
        let token = line.trim();
        if token.is_empty() {
            continue;
        }
        let label = token
            .parse::<usize>()
            .map_err(|e| parse_error(path, i + 1, format!("{:?}: {}", token, e)))?;
        labels.push(label);
    }

    if labels.len() != rows {
        return Err(parse_error(
            path,
            labels.len(),
            format!("expected {} labels, found {}", rows, labels.len()),
        ));
    }
    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(rows: Vec<Vec<f64>>, labels: Vec<usize>) -> Split {
        Split::new(Matrix::from_rows(rows).unwrap(), labels).unwrap()
    }

    #[test]
    fn test_integral_split_used_directly() {
        let s = split(vec![vec![0.0, 3.0], vec![7.0, 1.0]], vec![0, 1]);
        assert!(s.is_integral());

        let levels = s.to_levels(4).unwrap();
        assert_eq!(levels.n_lv, 8);
        assert_eq!(levels.features.as_slice(), &[0, 3, 7, 1]);
    }

    #[test]
    fn test_real_split_quantized() {
        let s = split(vec![vec![0.0, 0.5], vec![-1.0, 1.0]], vec![0, 1]);
        assert!(!s.is_integral());

        let levels = s.to_levels(2).unwrap();
        assert_eq!(levels.n_lv, 8);
        // range [-1, 1], top 3: 0 -> 1.5 -> 2, 0.5 -> 2.25 -> 2
        assert_eq!(levels.features.as_slice(), &[2, 2, 0, 3]);
    }

    #[test]
    fn test_checksum_wraps() {
        let big = (CHECKSUM_MODULUS - 1) as f64;
        let ds = Dataset::new(
            split(vec![vec![big, 2.0]], vec![0]),
            split(vec![vec![5.0, 0.0]], vec![1]),
        )
        .unwrap();
        assert_eq!(ds.checksum(), 6);
        assert_eq!(ds.n_class(), 1);
    }

    #[test]
    fn test_real_split_level_memory_is_double() {
        let s = split(vec![vec![0.5, 1.5]], vec![0]);
        let levels = s.to_levels(4).unwrap();
        assert_eq!(levels.n_lv, 32);
        assert_eq!(levels.features.as_slice(), &[0, 15]);
    }

    #[test]
    fn test_checksum_keeps_sign_of_negative_data() {
        let ds = Dataset::new(
            split(vec![vec![-3.0, 1.0]], vec![0]),
            split(vec![vec![-2.7, 0.0]], vec![0]),
        )
        .unwrap();
        // -3, -2, then -2.7 truncates to -2: -4
        assert_eq!(ds.checksum(), -4);

        let wrap = Dataset::new(
            split(vec![vec![-((CHECKSUM_MODULUS + 5) as f64)]], vec![0]),
            split(vec![vec![0.0]], vec![0]),
        )
        .unwrap();
        assert_eq!(wrap.checksum(), -5);
    }

    #[test]
    fn test_split_shape_checked() {
        let values = Matrix::from_rows(vec![vec![1.0], vec![2.0]]).unwrap();
        assert!(matches!(
            Split::new(values, vec![0]),
            Err(HdcError::ShapeMismatch { samples: 2, labels: 1 })
        ));
    }
}
