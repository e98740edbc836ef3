//! Model and training configuration.
//!
//! Everything is serde-deserialisable so a run can be described by a small
//! JSON document; omitted fields take the defaults below.
//!
//! ```rust
//! use hdclassify::Config;
//!
//! let config = Config::from_json(r#"{
//!     "model": { "n_class": 5, "n_lv": 21, "n_id": 1024 },
//!     "training": { "epochs": 10 }
//! }"#).unwrap();
//! assert_eq!(config.model.n_dim, 2048);
//! assert_eq!(config.training.validate_every, 5);
//! ```

use crate::error::{HdcError, Result};
use crate::similarity::Metric;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default hypervector dimension.
pub const DEFAULT_DIMENSIONS: usize = 2048;

/// Construction parameters of an [`HdcModel`](crate::HdcModel).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Number of classes
    pub n_class: usize,
    /// Number of quantization levels (level memory size)
    pub n_lv: usize,
    /// Number of feature columns (identifier memory size)
    pub n_id: usize,
    /// Hypervector dimension
    #[serde(default = "default_dimensions")]
    pub n_dim: usize,
    /// Binarize prototypes at finalization
    #[serde(default)]
    pub binary: bool,
    /// Global seed for memory generation
    #[serde(default)]
    pub seed: u64,
    /// Similarity rule for prediction
    #[serde(default)]
    pub metric: Metric,
}

fn default_dimensions() -> usize {
    DEFAULT_DIMENSIONS
}

impl ModelConfig {
    /// Dense-mode configuration with default dimension, seed and metric.
    pub fn new(n_class: usize, n_lv: usize, n_id: usize) -> Self {
        Self {
            n_class,
            n_lv,
            n_id,
            n_dim: DEFAULT_DIMENSIONS,
            binary: false,
            seed: 0,
            metric: Metric::Dot,
        }
    }

    pub fn with_dimensions(mut self, n_dim: usize) -> Self {
        self.n_dim = n_dim;
        self
    }

    pub fn with_binary(mut self, binary: bool) -> Self {
        self.binary = binary;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    /// Reject parameters no model can be built from.
    pub fn validate(&self) -> Result<()> {
        if self.n_class == 0 {
            return Err(HdcError::InvalidConfig("n_class must be at least 1".into()));
        }
        if self.n_lv < 2 {
            return Err(HdcError::InvalidConfig(format!(
                "n_lv must be at least 2, got {}",
                self.n_lv
            )));
        }
        if self.n_id == 0 {
            return Err(HdcError::InvalidConfig("n_id must be at least 1".into()));
        }
        if self.n_dim == 0 {
            return Err(HdcError::InvalidConfig("n_dim must be at least 1".into()));
        }
        Ok(())
    }
}

/// Parameters of the training loop run by [`Trainer`](crate::Trainer).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Refinement epochs after `train_init`
    pub epochs: usize,
    /// Report test accuracy every this many epochs (0 disables)
    pub validate_every: usize,
    /// Bit width used when raw data has to be quantized; the level memory
    /// then gets `2^(bits + 1)` entries (4 bits, 32 levels)
    pub quantize_bits: u32,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: 20,
            validate_every: 5,
            quantize_bits: 4,
        }
    }
}

/// A complete run description.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub model: ModelConfig,
    #[serde(default)]
    pub training: TrainingConfig,
}

impl Config {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.model.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }
}
