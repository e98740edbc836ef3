//! Associative memory: per-class prototypes learned from encoded samples.
//!
//! # Training
//!
//! - [`AssociativeMemory::train_init`] sums each encoded sample into its
//!   class prototype (label-conditioned bundling).
//! - [`AssociativeMemory::train`] runs one perceptron-style epoch in row
//!   order. A misclassified sample is added to its true class and
//!   subtracted from the predicted class; a correct prediction changes
//!   nothing. Each update is visible to the next sample's prediction, so the
//!   epoch is strictly sequential.
//!
//! # Inference
//!
//! The predicted class is the argmax of the similarity (dot product by
//! default) between the sample and every prototype, ties going to the
//! lowest class index.
//!
//! All mutating calls validate their whole input before touching a
//! prototype: an error leaves the memory exactly as it was.

use crate::error::{HdcError, Result};
use crate::matrix::{EncodedMatrix, PrototypeMatrix};
use crate::primitives::Primitives;
use crate::similarity::{Metric, Similarity};
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Outcome of one training epoch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EpochStats {
    /// Samples visited
    pub samples: usize,
    /// Samples that were misclassified (and triggered an update)
    pub mistakes: usize,
}

impl EpochStats {
    /// Fraction of samples predicted correctly *during* the epoch.
    pub fn running_accuracy(&self) -> f64 {
        if self.samples == 0 {
            return 0.0;
        }
        (self.samples - self.mistakes) as f64 / self.samples as f64
    }
}

/// The learned state of a classifier: one prototype per class.
#[derive(Clone, Debug)]
pub struct AssociativeMemory {
    prototypes: PrototypeMatrix,
    metric: Metric,
    epochs: usize,
    binarized: bool,
}

impl AssociativeMemory {
    /// Create a memory with all-zero prototypes.
    pub fn new(n_class: usize, n_dim: usize, metric: Metric) -> Result<Self> {
        if n_class == 0 {
            return Err(HdcError::InvalidConfig(
                "classifier needs at least one class".into(),
            ));
        }
        if n_dim == 0 {
            return Err(HdcError::InvalidConfig(
                "hypervector dimension must be positive".into(),
            ));
        }

        Ok(Self {
            prototypes: PrototypeMatrix::zeros(n_class, n_dim),
            metric,
            epochs: 0,
            binarized: false,
        })
    }

    pub fn n_class(&self) -> usize {
        self.prototypes.rows()
    }

    pub fn dimensions(&self) -> usize {
        self.prototypes.cols()
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    /// Number of `train` epochs run since the last `train_init`.
    pub fn epochs(&self) -> usize {
        self.epochs
    }

    /// Whether [`binarize`](Self::binarize) has been applied.
    pub fn is_binarized(&self) -> bool {
        self.binarized
    }

    /// The class prototypes (`n_class × n_dim`).
    pub fn prototypes(&self) -> &PrototypeMatrix {
        &self.prototypes
    }

    /// Seed the prototypes by summing every sample into its labelled class.
    ///
    /// Adds to whatever the prototypes already hold and resets the epoch
    /// counter.
    pub fn train_init(&mut self, encoded: &EncodedMatrix, labels: &[usize]) -> Result<()> {
        self.validate(encoded, labels)?;

        for (row, &label) in labels.iter().enumerate() {
            add_row(self.prototypes.row_mut(label), encoded.row(row));
        }
        self.epochs = 0;
        debug!(samples = labels.len(), "initialised class prototypes");

        Ok(())
    }

    /// Run one mistake-driven refinement epoch in row order.
    pub fn train(&mut self, encoded: &EncodedMatrix, labels: &[usize]) -> Result<EpochStats> {
        self.validate(encoded, labels)?;

        let mut mistakes = 0;
        for (row, &truth) in labels.iter().enumerate() {
            let sample = encoded.row(row);
            let predicted = self.argmax(sample);
            if predicted != truth {
                add_row(self.prototypes.row_mut(truth), sample);
                sub_row(self.prototypes.row_mut(predicted), sample);
                mistakes += 1;
            }
        }
        self.epochs += 1;

        let stats = EpochStats {
            samples: labels.len(),
            mistakes,
        };
        debug!(epoch = self.epochs, mistakes, samples = stats.samples, "training epoch done");
        Ok(stats)
    }

    /// Fraction of rows whose predicted class equals the label.
    ///
    /// Read-only; fails on an empty batch.
    pub fn test(&self, encoded: &EncodedMatrix, labels: &[usize]) -> Result<f64> {
        self.validate(encoded, labels)?;
        if labels.is_empty() {
            return Err(HdcError::EmptyInput(
                "cannot measure accuracy on zero samples".into(),
            ));
        }

        let predictions = self.predict_unchecked(encoded);
        let correct = predictions
            .iter()
            .zip(labels)
            .filter(|(p, t)| p == t)
            .count();

        Ok(correct as f64 / labels.len() as f64)
    }

    /// Predicted class for one encoded row.
    pub fn predict(&self, sample: &[i32]) -> Result<usize> {
        self.check_width(sample.len())?;
        Ok(self.argmax(sample))
    }

    /// Predicted class for every row.
    pub fn predict_batch(&self, encoded: &EncodedMatrix) -> Result<Vec<usize>> {
        self.check_width(encoded.cols())?;
        Ok(self.predict_unchecked(encoded))
    }

    /// Similarity of one encoded row against every prototype.
    pub fn scores(&self, sample: &[i32]) -> Result<Vec<f64>> {
        self.check_width(sample.len())?;
        Ok(self
            .prototypes
            .iter_rows()
            .map(|proto| Similarity::score_row(self.metric, sample, proto))
            .collect())
    }

    /// Collapse every prototype to {-1, +1} by element-wise sign.
    ///
    /// Zero maps to +1. Irreversible; applying it again is a no-op.
    pub fn binarize(&mut self) {
        Primitives::binarize_in_place(self.prototypes.as_mut_slice());
        self.binarized = true;
        debug!(n_class = self.n_class(), "binarized class prototypes");
    }

    #[cfg(feature = "parallel")]
    fn predict_unchecked(&self, encoded: &EncodedMatrix) -> Vec<usize> {
        (0..encoded.rows())
            .into_par_iter()
            .map(|row| self.argmax(encoded.row(row)))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn predict_unchecked(&self, encoded: &EncodedMatrix) -> Vec<usize> {
        encoded.iter_rows().map(|row| self.argmax(row)).collect()
    }

    /// Index of the most similar prototype; first index wins ties.
    fn argmax(&self, sample: &[i32]) -> usize {
        match self.metric {
            Metric::Dot => first_max(
                self.prototypes
                    .iter_rows()
                    .map(|proto| Similarity::dot_row(sample, proto)),
            ),
            Metric::Cosine => first_max(
                self.prototypes
                    .iter_rows()
                    .map(|proto| Similarity::cosine_row(sample, proto)),
            ),
        }
    }

    fn check_width(&self, got: usize) -> Result<()> {
        if got != self.dimensions() {
            return Err(HdcError::DimensionMismatch {
                expected: self.dimensions(),
                got,
            });
        }
        Ok(())
    }

    /// Check a labelled batch against this memory without touching it.
    pub(crate) fn validate(&self, encoded: &EncodedMatrix, labels: &[usize]) -> Result<()> {
        if encoded.rows() != labels.len() {
            return Err(HdcError::ShapeMismatch {
                samples: encoded.rows(),
                labels: labels.len(),
            });
        }
        self.check_width(encoded.cols())?;

        let n_class = self.n_class();
        if let Some(row) = labels.iter().position(|&l| l >= n_class) {
            return Err(HdcError::LabelOutOfRange {
                row,
                label: labels[row],
                n_class,
            });
        }
        Ok(())
    }
}

fn first_max<T: PartialOrd>(scores: impl Iterator<Item = T>) -> usize {
    let mut best_index = 0;
    let mut best_score: Option<T> = None;
    for (i, score) in scores.enumerate() {
        let better = match &best_score {
            Some(top) => score > *top,
            None => true,
        };
        if better {
            best_index = i;
            best_score = Some(score);
        }
    }
    best_index
}

fn add_row(proto: &mut [i64], sample: &[i32]) {
    for (p, &s) in proto.iter_mut().zip(sample) {
        *p += s as i64;
    }
}

fn sub_row(proto: &mut [i64], sample: &[i32]) {
    for (p, &s) in proto.iter_mut().zip(sample) {
        *p -= s as i64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::Matrix;

    fn encoded(rows: Vec<Vec<i32>>) -> EncodedMatrix {
        Matrix::from_rows(rows).unwrap()
    }

    #[test]
    fn test_train_init_sums_by_label() {
        let mut am = AssociativeMemory::new(2, 3, Metric::Dot).unwrap();
        let x = encoded(vec![vec![1, 2, 3], vec![-1, 0, 1], vec![4, 4, 4]]);
        am.train_init(&x, &[0, 1, 0]).unwrap();

        assert_eq!(am.prototypes().row(0), &[5, 6, 7]);
        assert_eq!(am.prototypes().row(1), &[-1, 0, 1]);
        assert_eq!(am.epochs(), 0);
    }

    #[test]
    fn test_mistake_update() {
        let mut am = AssociativeMemory::new(2, 2, Metric::Dot).unwrap();
        // Class 0 prototype points the wrong way for this sample
        am.train_init(&encoded(vec![vec![1, 0]]), &[0]).unwrap();

        let x = encoded(vec![vec![2, 1]]);
        let stats = am.train(&x, &[1]).unwrap();

        assert_eq!(stats, EpochStats { samples: 1, mistakes: 1 });
        assert_eq!(am.prototypes().row(0), &[-1, -1]);
        assert_eq!(am.prototypes().row(1), &[2, 1]);
        assert_eq!(am.epochs(), 1);
    }

    #[test]
    fn test_no_update_on_correct_prediction() {
        let mut am = AssociativeMemory::new(2, 2, Metric::Dot).unwrap();
        let x = encoded(vec![vec![3, 0], vec![0, 3]]);
        am.train_init(&x, &[0, 1]).unwrap();
        let before = am.prototypes().clone();

        let stats = am.train(&x, &[0, 1]).unwrap();

        assert_eq!(stats.mistakes, 0);
        assert_eq!(am.prototypes(), &before);
    }

    #[test]
    fn test_updates_are_sequential() {
        // The first mistake moves class 1 toward [1, 1], which makes the
        // second (identical) sample correct within the same epoch.
        let mut am = AssociativeMemory::new(2, 2, Metric::Dot).unwrap();
        am.train_init(&encoded(vec![vec![1, 1]]), &[0]).unwrap();

        let x = encoded(vec![vec![1, 1], vec![1, 1]]);
        let stats = am.train(&x, &[1, 1]).unwrap();

        assert_eq!(stats.mistakes, 1);
        assert_eq!(am.prototypes().row(0), &[0, 0]);
        assert_eq!(am.prototypes().row(1), &[1, 1]);
    }

    #[test]
    fn test_ties_go_to_lowest_index() {
        let am = AssociativeMemory::new(3, 2, Metric::Dot).unwrap();
        assert_eq!(am.predict(&[5, -5]).unwrap(), 0);

        let mut am = AssociativeMemory::new(3, 2, Metric::Dot).unwrap();
        am.train_init(&encoded(vec![vec![1, 0], vec![1, 0]]), &[1, 2])
            .unwrap();
        assert_eq!(am.predict(&[1, 0]).unwrap(), 1);
    }

    #[test]
    fn test_accuracy() {
        let mut am = AssociativeMemory::new(2, 2, Metric::Dot).unwrap();
        let x = encoded(vec![vec![3, 0], vec![0, 3]]);
        am.train_init(&x, &[0, 1]).unwrap();

        assert_eq!(am.test(&x, &[0, 1]).unwrap(), 1.0);
        assert_eq!(am.test(&x, &[1, 1]).unwrap(), 0.5);
        assert_eq!(am.predict_batch(&x).unwrap(), vec![0, 1]);
    }

    #[test]
    fn test_cosine_ignores_prototype_magnitude() {
        let mut am = AssociativeMemory::new(2, 2, Metric::Cosine).unwrap();
        am.train_init(
            &encoded(vec![vec![100, 100], vec![0, 1]]),
            &[0, 1],
        )
        .unwrap();

        // Dot would pick class 0 (100 > 1); cosine picks the aligned class 1
        assert_eq!(am.predict(&[0, 1]).unwrap(), 1);
        let scores = am.scores(&[0, 1]).unwrap();
        assert!((scores[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_inputs_leave_state_untouched() {
        let mut am = AssociativeMemory::new(2, 2, Metric::Dot).unwrap();
        let x = encoded(vec![vec![1, 2], vec![3, 4]]);
        am.train_init(&x, &[0, 1]).unwrap();
        let before = am.prototypes().clone();

        let err = am.train_init(&x, &[0, 2]).unwrap_err();
        assert!(matches!(
            err,
            HdcError::LabelOutOfRange {
                row: 1,
                label: 2,
                n_class: 2
            }
        ));
        assert!(am.train(&x, &[1, 5]).unwrap_err().is_data());
        assert!(am.train(&x, &[0]).unwrap_err().is_configuration());
        assert!(am
            .train(&encoded(vec![vec![1, 2, 3]]), &[0])
            .unwrap_err()
            .is_configuration());

        assert_eq!(am.prototypes(), &before);
        assert_eq!(am.epochs(), 0);
    }

    #[test]
    fn test_empty_test_batch_rejected() {
        let am = AssociativeMemory::new(2, 2, Metric::Dot).unwrap();
        let empty = EncodedMatrix::zeros(0, 2);
        assert!(matches!(am.test(&empty, &[]), Err(HdcError::EmptyInput(_))));
    }

    #[test]
    fn test_binarize_idempotent() {
        let mut am = AssociativeMemory::new(2, 3, Metric::Dot).unwrap();
        am.train_init(&encoded(vec![vec![4, 0, -2], vec![-1, 7, 0]]), &[0, 1])
            .unwrap();

        am.binarize();
        assert!(am.is_binarized());
        assert_eq!(am.prototypes().as_slice(), &[1, 1, -1, -1, 1, 1]);

        let once = am.prototypes().clone();
        am.binarize();
        assert_eq!(am.prototypes(), &once);
    }

    #[test]
    fn test_invalid_construction() {
        assert!(AssociativeMemory::new(0, 8, Metric::Dot).is_err());
        assert!(AssociativeMemory::new(2, 0, Metric::Dot).is_err());
    }
}
