//! # hdclassify: Hyperdimensional Classification
//!
//! hdclassify is a hyperdimensional computing (HDC) classifier. Feature rows
//! are encoded into high-dimensional integer vectors through a fixed
//! identifier memory and a correlated level memory, and classified against
//! per-class prototype hypervectors learned with a perceptron-style rule.
//!
//! ## Quick Start
//!
//! ```rust
//! use hdclassify::{FeatureMatrix, HdcModel, ModelConfig};
//!
//! let config = ModelConfig::new(2, 4, 8).with_dimensions(1024).with_seed(7);
//! let mut model = HdcModel::new(config)?;
//!
//! let features = FeatureMatrix::from_rows(vec![vec![0; 8], vec![3; 8]])?;
//! let labels = [0, 1];
//!
//! let encoded = model.encode(&features)?;
//! model.train_init(&encoded, &labels)?;
//! for _ in 0..5 {
//!     model.train(&encoded, &labels)?;
//! }
//! assert_eq!(model.test(&encoded, &labels)?, 1.0);
//! # Ok::<(), hdclassify::HdcError>(())
//! ```
//!
//! ## Core Concepts
//!
//! - **Hypervectors**: bipolar {-1, +1} memory entries
//! - **Bind**: element-wise product of an identifier and a level
//! - **Bundle**: element-wise sum of the bound pairs of one sample
//! - **Associative memory**: one accumulator prototype per class
//! - **Quantization**: raw values to levels via global min-max scaling

pub mod classifier;
pub mod config;
pub mod dataset;
pub mod encoder;
pub mod error;
pub mod matrix;
pub mod memory;
pub mod primitives;
pub mod quantize;
pub mod similarity;
pub mod sink;
pub mod trainer;
pub mod vector;

// Re-exports for convenience
pub use classifier::{AssociativeMemory, EpochStats};
pub use config::{Config, ModelConfig, TrainingConfig};
pub use dataset::{Dataset, LevelSplit, Split};
pub use encoder::Encoder;
pub use error::{HdcError, Result};
pub use matrix::{EncodedMatrix, FeatureMatrix, Matrix, PrototypeMatrix, RawMatrix};
pub use memory::{seeded_rng, ItemMemory, LevelMemory};
pub use primitives::Primitives;
pub use quantize::{level_memory_size, min_max_quantize, QuantizeRange};
pub use similarity::{Metric, Similarity};
pub use sink::{Checkpoint, JsonSink, ModelSink, PrototypeSnapshot, RecordingSink};
pub use trainer::{Batch, Trainer, TrainingReport};
pub use vector::Hypervector;

use tracing::debug;

/// An HDC classifier - encoder plus associative memory.
///
/// This struct owns everything a model learns or needs:
/// - the identifier and level memories (fixed at construction)
/// - the class prototypes (mutated by training)
///
/// Operations take `&mut self` only when they change the prototypes;
/// concurrent training of one model must be serialized by the caller.
#[derive(Clone, Debug)]
pub struct HdcModel {
    config: ModelConfig,
    encoder: Encoder,
    memory: AssociativeMemory,
}

impl HdcModel {
    /// Build a model, generating both memories from `config.seed`.
    pub fn new(config: ModelConfig) -> Result<Self> {
        config.validate()?;

        let encoder = Encoder::new(config.n_id, config.n_lv, config.n_dim, config.seed)?;
        let memory = AssociativeMemory::new(config.n_class, config.n_dim, config.metric)?;
        debug!(
            n_class = config.n_class,
            n_lv = config.n_lv,
            n_id = config.n_id,
            n_dim = config.n_dim,
            binary = config.binary,
            "constructed model"
        );

        Ok(Self {
            config,
            encoder,
            memory,
        })
    }

    /// Build a model around an existing encoder (e.g. custom memories).
    pub fn with_encoder(config: ModelConfig, encoder: Encoder) -> Result<Self> {
        config.validate()?;
        if encoder.n_id() != config.n_id || encoder.n_lv() != config.n_lv {
            return Err(HdcError::InvalidConfig(format!(
                "encoder has {} identifiers and {} levels, config expects {} and {}",
                encoder.n_id(),
                encoder.n_lv(),
                config.n_id,
                config.n_lv
            )));
        }
        if encoder.dimensions() != config.n_dim {
            return Err(HdcError::DimensionMismatch {
                expected: config.n_dim,
                got: encoder.dimensions(),
            });
        }

        let memory = AssociativeMemory::new(config.n_class, config.n_dim, config.metric)?;
        Ok(Self {
            config,
            encoder,
            memory,
        })
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn encoder(&self) -> &Encoder {
        &self.encoder
    }

    pub fn memory(&self) -> &AssociativeMemory {
        &self.memory
    }

    /// Get the hypervector dimension.
    pub fn dimensions(&self) -> usize {
        self.config.n_dim
    }

    // =========================================================================
    // Encoding
    // =========================================================================

    /// Encode a level matrix (`n_samples × n_id`) into `n_samples × n_dim`.
    pub fn encode(&self, features: &FeatureMatrix) -> Result<EncodedMatrix> {
        self.encoder.encode(features)
    }

    // =========================================================================
    // Training and inference
    // =========================================================================

    /// Seed the class prototypes by label-conditioned summation.
    pub fn train_init(&mut self, encoded: &EncodedMatrix, labels: &[usize]) -> Result<()> {
        self.memory.train_init(encoded, labels)
    }

    /// Run one mistake-driven refinement epoch.
    pub fn train(&mut self, encoded: &EncodedMatrix, labels: &[usize]) -> Result<EpochStats> {
        self.memory.train(encoded, labels)
    }

    /// Check a labelled batch (shape, width, label range) without training.
    pub fn check_batch(&self, encoded: &EncodedMatrix, labels: &[usize]) -> Result<()> {
        self.memory.validate(encoded, labels)
    }

    /// Accuracy in `[0, 1]` on an encoded batch.
    pub fn test(&self, encoded: &EncodedMatrix, labels: &[usize]) -> Result<f64> {
        self.memory.test(encoded, labels)
    }

    /// Encode and classify a level matrix.
    pub fn predict(&self, features: &FeatureMatrix) -> Result<Vec<usize>> {
        let encoded = self.encoder.encode(features)?;
        self.memory.predict_batch(&encoded)
    }

    /// Apply the end-of-training transform.
    ///
    /// In binary mode the prototypes are replaced by their sign; in dense
    /// mode nothing happens. Returns whether the prototypes are binarized.
    pub fn finalize(&mut self) -> bool {
        if self.config.binary && !self.memory.is_binarized() {
            self.memory.binarize();
        }
        self.memory.is_binarized()
    }

    /// Serialisable copy of the current prototypes.
    pub fn snapshot(&self) -> PrototypeSnapshot {
        PrototypeSnapshot::capture(&self.memory)
    }
}
