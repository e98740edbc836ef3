//! Item memories: the two fixed codebooks the encoder reads from.
//!
//! - [`ItemMemory`] holds `count` independent random bipolar hypervectors.
//!   Used as the identifier memory, one entry per feature column; entries
//!   are near-orthogonal (expected pairwise cosine ≈ 0, spread ≈ 1/√D).
//!
//! - [`LevelMemory`] holds one hypervector per quantization level with a
//!   monotonic similarity profile. Level 0 is random; each following level
//!   negates the next chunk of a random permutation of the dimensions, so
//!   consecutive levels differ by `D / (n_lv - 1)` positions and the last
//!   level is the exact negation of the first.
//!
//! Both are generated from a caller-supplied [`Rng`]. [`seeded_rng`] derives
//! independent reproducible streams from one global seed.

use crate::error::{HdcError, Result};
use crate::vector::Hypervector;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};
use tracing::debug;

/// Derive a deterministic RNG for a named stream.
///
/// Uses SHA-256 of (global_seed || stream) to seed a ChaCha8 RNG, so the
/// same `(seed, stream)` pair always yields the same sequence and different
/// streams are independent.
pub fn seeded_rng(global_seed: u64, stream: &str) -> ChaCha8Rng {
    let mut hasher = Sha256::new();
    hasher.update(global_seed.to_le_bytes());
    hasher.update(stream.as_bytes());
    let hash = hasher.finalize();

    let mut seed = [0u8; 8];
    seed.copy_from_slice(&hash[0..8]);
    ChaCha8Rng::seed_from_u64(u64::from_le_bytes(seed))
}

/// Draw one bipolar hypervector with equiprobable ±1 entries.
fn random_bipolar<R: RngCore + ?Sized>(dimensions: usize, rng: &mut R) -> Hypervector {
    let data: Vec<i8> = (0..dimensions)
        .map(|_| if rng.next_u32() & 1 == 0 { 1 } else { -1 })
        .collect();
    Hypervector::from_data(data)
}

/// Ordered codebook of independent random hypervectors.
#[derive(Clone, Debug)]
pub struct ItemMemory {
    dimensions: usize,
    entries: Vec<Hypervector>,
}

impl ItemMemory {
    /// Generate `count` random hypervectors of length `dimensions`.
    pub fn random<R: Rng + ?Sized>(count: usize, dimensions: usize, rng: &mut R) -> Result<Self> {
        if dimensions == 0 {
            return Err(HdcError::InvalidConfig(
                "hypervector dimension must be positive".into(),
            ));
        }
        if count == 0 {
            return Err(HdcError::InvalidConfig(
                "item memory needs at least one entry".into(),
            ));
        }

        let entries = (0..count)
            .map(|_| random_bipolar(dimensions, &mut *rng))
            .collect();
        debug!(count, dimensions, "generated item memory");

        Ok(Self {
            dimensions,
            entries,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Entry at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&Hypervector> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[Hypervector] {
        &self.entries
    }
}

/// Ordered codebook of quantization-level hypervectors.
#[derive(Clone, Debug)]
pub struct LevelMemory {
    dimensions: usize,
    levels: Vec<Hypervector>,
}

impl LevelMemory {
    /// Generate `count` correlated level hypervectors.
    ///
    /// Level `i` equals level 0 with the first `floor(i * D / (count - 1))`
    /// dimensions of a random permutation negated.
    pub fn linear<R: Rng + ?Sized>(count: usize, dimensions: usize, rng: &mut R) -> Result<Self> {
        if dimensions == 0 {
            return Err(HdcError::InvalidConfig(
                "hypervector dimension must be positive".into(),
            ));
        }
        if count < 2 {
            return Err(HdcError::InvalidConfig(format!(
                "level memory needs at least two levels, got {}",
                count
            )));
        }

        let base = random_bipolar(dimensions, rng);
        let mut order: Vec<usize> = (0..dimensions).collect();
        order.shuffle(rng);

        let steps = count - 1;
        let mut levels = Vec::with_capacity(count);
        levels.push(base);

        let mut flipped = 0;
        for level in 1..count {
            let target = level * dimensions / steps;
            let mut next = levels[level - 1].clone();
            {
                let data = next.data_mut();
                for &d in &order[flipped..target] {
                    data[d] = -data[d];
                }
            }
            flipped = target;
            levels.push(next);
        }
        debug!(count, dimensions, "generated level memory");

        Ok(Self { dimensions, levels })
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Hypervector for `level`, if in range.
    pub fn get(&self, level: usize) -> Option<&Hypervector> {
        self.levels.get(level)
    }

    pub fn levels(&self) -> &[Hypervector] {
        &self.levels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::similarity::Similarity;

    #[test]
    fn test_seeded_rng_deterministic() {
        let a = ItemMemory::random(3, 256, &mut seeded_rng(42, "id")).unwrap();
        let b = ItemMemory::random(3, 256, &mut seeded_rng(42, "id")).unwrap();
        assert_eq!(a.entries(), b.entries());
    }

    #[test]
    fn test_streams_independent() {
        let a = ItemMemory::random(1, 256, &mut seeded_rng(42, "id")).unwrap();
        let b = ItemMemory::random(1, 256, &mut seeded_rng(42, "level")).unwrap();
        assert_ne!(a.entries(), b.entries());
    }

    #[test]
    fn test_item_memory_bipolar() {
        let mem = ItemMemory::random(4, 512, &mut seeded_rng(1, "id")).unwrap();
        assert_eq!(mem.len(), 4);
        for hv in mem.entries() {
            assert_eq!(hv.dimensions(), 512);
            assert!(hv.data().iter().all(|&v| v == 1 || v == -1));
        }
    }

    #[test]
    fn test_item_memory_near_orthogonal() {
        let mem = ItemMemory::random(8, 8192, &mut seeded_rng(7, "id")).unwrap();
        for i in 0..mem.len() {
            for j in (i + 1)..mem.len() {
                let sim = Similarity::cosine(&mem.entries()[i], &mem.entries()[j]);
                // 1/sqrt(8192) ≈ 0.011; 6 sigma bound
                assert!(sim.abs() < 0.07, "entries {} and {} too similar: {}", i, j, sim);
            }
        }
    }

    #[test]
    fn test_level_memory_steps() {
        let mem = LevelMemory::linear(5, 1000, &mut seeded_rng(3, "level")).unwrap();
        let levels = mem.levels();

        for i in 1..levels.len() {
            assert_eq!(levels[i - 1].hamming_distance(&levels[i]), 250);
        }
        assert_eq!(levels[0].hamming_distance(&levels[4]), 1000);
    }

    #[test]
    fn test_level_memory_uneven_steps() {
        // 10 dims over 3 steps: boundaries at 3, 6, 10
        let mem = LevelMemory::linear(4, 10, &mut seeded_rng(3, "level")).unwrap();
        let l = mem.levels();
        assert_eq!(l[0].hamming_distance(&l[1]), 3);
        assert_eq!(l[0].hamming_distance(&l[2]), 6);
        assert_eq!(l[0].hamming_distance(&l[3]), 10);
    }

    #[test]
    fn test_level_memory_monotonic() {
        let mem = LevelMemory::linear(16, 2048, &mut seeded_rng(9, "level")).unwrap();
        let levels = mem.levels();

        for i in 0..levels.len() {
            for j in i..levels.len() {
                for k in j..levels.len() {
                    let near = Similarity::cosine(&levels[i], &levels[j]);
                    let far = Similarity::cosine(&levels[i], &levels[k]);
                    assert!(near >= far, "sim({i},{j})={near} < sim({i},{k})={far}");
                }
            }
        }
    }

    #[test]
    fn test_invalid_configurations() {
        let mut rng = seeded_rng(0, "x");
        assert!(ItemMemory::random(0, 128, &mut rng).is_err());
        assert!(ItemMemory::random(4, 0, &mut rng).is_err());
        assert!(LevelMemory::linear(1, 128, &mut rng).is_err());
        assert!(LevelMemory::linear(0, 128, &mut rng).is_err());
        assert!(LevelMemory::linear(4, 0, &mut rng)
            .unwrap_err()
            .is_configuration());
    }
}
