//! Encoder: quantized feature rows to hypervectors.
//!
//! # ID-Level Encoding
//!
//! Each feature column `p` owns an identifier hypervector `ID[p]`; each
//! quantization level `l` owns a level hypervector `LV[l]`. A sample row
//! `x` is encoded by binding every column's identifier with the level it
//! holds and bundling the bound pairs:
//!
//! ```text
//! enc(x) = Σ_p  ID[p] ⊙ LV[x[p]]
//! ```
//!
//! Binding with the identifier keeps columns apart (level 3 in column 0 is
//! unrelated to level 3 in column 1), while the level memory's similarity
//! profile keeps nearby values similar. The sum is left unthresholded.

use crate::error::{HdcError, Result};
use crate::matrix::{EncodedMatrix, FeatureMatrix};
use crate::memory::{seeded_rng, ItemMemory, LevelMemory};
use crate::primitives::Primitives;
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Encoder for converting level matrices to hypervectors.
#[derive(Clone, Debug)]
pub struct Encoder {
    ids: ItemMemory,
    levels: LevelMemory,
}

impl Encoder {
    /// Build both memories from a global seed.
    ///
    /// The identifier memory draws from stream `"id"` and the level memory
    /// from stream `"level"`, so changing `n_id` never perturbs the levels.
    pub fn new(n_id: usize, n_lv: usize, n_dim: usize, seed: u64) -> Result<Self> {
        let ids = ItemMemory::random(n_id, n_dim, &mut seeded_rng(seed, "id"))?;
        let levels = LevelMemory::linear(n_lv, n_dim, &mut seeded_rng(seed, "level"))?;
        Self::from_memories(ids, levels)
    }

    /// Assemble an encoder from prebuilt memories.
    pub fn from_memories(ids: ItemMemory, levels: LevelMemory) -> Result<Self> {
        if ids.is_empty() {
            return Err(HdcError::InvalidConfig(
                "encoder needs at least one identifier".into(),
            ));
        }
        if ids.dimensions() != levels.dimensions() {
            return Err(HdcError::DimensionMismatch {
                expected: ids.dimensions(),
                got: levels.dimensions(),
            });
        }
        Ok(Self { ids, levels })
    }

    /// Output hypervector dimension.
    pub fn dimensions(&self) -> usize {
        self.ids.dimensions()
    }

    /// Number of feature columns (identifier memory size).
    pub fn n_id(&self) -> usize {
        self.ids.len()
    }

    /// Number of quantization levels.
    pub fn n_lv(&self) -> usize {
        self.levels.len()
    }

    pub fn id_memory(&self) -> &ItemMemory {
        &self.ids
    }

    pub fn level_memory(&self) -> &LevelMemory {
        &self.levels
    }

    /// Encode every row of a level matrix.
    ///
    /// The whole matrix is validated first: column count must equal `n_id`
    /// and every level must lie in `[0, n_lv)`. Rows are independent, so the
    /// `parallel` feature encodes them concurrently with identical results.
    pub fn encode(&self, features: &FeatureMatrix) -> Result<EncodedMatrix> {
        if features.cols() != self.n_id() {
            return Err(HdcError::DimensionMismatch {
                expected: self.n_id(),
                got: features.cols(),
            });
        }
        for (row, values) in features.iter_rows().enumerate() {
            self.check_levels(row, values)?;
        }

        let dim = self.dimensions();
        let mut out = EncodedMatrix::zeros(features.rows(), dim);
        debug!(rows = features.rows(), dim, "encoding feature matrix");

        self.fill(features, &mut out);
        Ok(out)
    }

    /// Encode a single row of levels.
    pub fn encode_row(&self, levels: &[u32]) -> Result<Vec<i32>> {
        if levels.len() != self.n_id() {
            return Err(HdcError::DimensionMismatch {
                expected: self.n_id(),
                got: levels.len(),
            });
        }
        self.check_levels(0, levels)?;

        let mut acc = vec![0i32; self.dimensions()];
        self.accumulate(levels, &mut acc);
        Ok(acc)
    }

    fn check_levels(&self, row: usize, levels: &[u32]) -> Result<()> {
        let n_lv = self.n_lv();
        match levels.iter().position(|&l| l as usize >= n_lv) {
            Some(column) => Err(HdcError::LevelOutOfRange {
                row,
                column,
                level: levels[column],
                n_lv,
            }),
            None => Ok(()),
        }
    }

    #[cfg(feature = "parallel")]
    fn fill(&self, features: &FeatureMatrix, out: &mut EncodedMatrix) {
        let dim = self.dimensions();
        out.as_mut_slice()
            .par_chunks_mut(dim)
            .enumerate()
            .for_each(|(row, acc)| self.accumulate(features.row(row), acc));
    }

    #[cfg(not(feature = "parallel"))]
    fn fill(&self, features: &FeatureMatrix, out: &mut EncodedMatrix) {
        for row in 0..features.rows() {
            self.accumulate(features.row(row), out.row_mut(row));
        }
    }

    /// Bind-and-bundle one validated row into `acc`.
    fn accumulate(&self, levels: &[u32], acc: &mut [i32]) {
        for (id, &level) in self.ids.entries().iter().zip(levels) {
            Primitives::bind_into(acc, id, &self.levels.levels()[level as usize]);
        }
    }
}
