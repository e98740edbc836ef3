//! Reporting sinks: where accuracies and learned prototypes go.
//!
//! The classifier does not own a persistence format. It hands a
//! [`PrototypeSnapshot`] and the accuracies measured along the way to a
//! [`ModelSink`], which decides what to do with them.

use crate::classifier::AssociativeMemory;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// When an accuracy was measured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Checkpoint {
    /// Right after `train_init`
    Init,
    /// After the given (1-based) epoch
    Epoch(usize),
    /// After the last epoch
    Final,
}

/// A serialisable copy of the class prototypes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrototypeSnapshot {
    pub n_class: usize,
    pub n_dim: usize,
    /// Prototypes were binarized to {-1, +1}
    pub binary: bool,
    /// Epochs run since `train_init`
    pub epochs: usize,
    /// One row per class
    pub rows: Vec<Vec<i64>>,
}

impl PrototypeSnapshot {
    /// Capture the current state of an associative memory.
    pub fn capture(memory: &AssociativeMemory) -> Self {
        Self {
            n_class: memory.n_class(),
            n_dim: memory.dimensions(),
            binary: memory.is_binarized(),
            epochs: memory.epochs(),
            rows: memory.prototypes().to_rows(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Receiver for training results.
pub trait ModelSink {
    /// Record an accuracy measured at `checkpoint`.
    fn accuracy(&mut self, checkpoint: Checkpoint, accuracy: f64) -> Result<()>;

    /// Receive the final prototypes.
    fn prototypes(&mut self, snapshot: &PrototypeSnapshot) -> Result<()>;
}

/// Keeps everything in memory.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    pub accuracies: Vec<(Checkpoint, f64)>,
    pub snapshots: Vec<PrototypeSnapshot>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accuracy recorded at a checkpoint, if any.
    pub fn accuracy_at(&self, checkpoint: Checkpoint) -> Option<f64> {
        self.accuracies
            .iter()
            .find(|(c, _)| *c == checkpoint)
            .map(|&(_, acc)| acc)
    }
}

impl ModelSink for RecordingSink {
    fn accuracy(&mut self, checkpoint: Checkpoint, accuracy: f64) -> Result<()> {
        self.accuracies.push((checkpoint, accuracy));
        Ok(())
    }

    fn prototypes(&mut self, snapshot: &PrototypeSnapshot) -> Result<()> {
        self.snapshots.push(snapshot.clone());
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum Record<'a> {
    Accuracy {
        checkpoint: Checkpoint,
        accuracy: f64,
    },
    Prototypes(&'a PrototypeSnapshot),
}

/// Writes one JSON object per line.
pub struct JsonSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write(&mut self, record: &Record<'_>) -> Result<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }
}

impl<W: Write> ModelSink for JsonSink<W> {
    fn accuracy(&mut self, checkpoint: Checkpoint, accuracy: f64) -> Result<()> {
        self.write(&Record::Accuracy {
            checkpoint,
            accuracy,
        })
    }

    fn prototypes(&mut self, snapshot: &PrototypeSnapshot) -> Result<()> {
        self.write(&Record::Prototypes(snapshot))?;
        self.writer.flush()?;
        Ok(())
    }
}
