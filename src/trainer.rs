//! Training driver: the full init → refine → finalize loop.
//!
//! ```text
//! train_init ─► test (Init) ─► train × epochs ─► test (Final) ─► binarize? ─► sink
//!                                   │
//!                                   └─ every `validate_every` epochs: test (Epoch n)
//! ```
//!
//! The epoch count is fixed up front; there is no early stopping.

use crate::classifier::EpochStats;
use crate::config::TrainingConfig;
use crate::error::{HdcError, Result};
use crate::matrix::EncodedMatrix;
use crate::sink::{Checkpoint, ModelSink, PrototypeSnapshot};
use crate::HdcModel;
use tracing::info;

/// Encoded samples paired with their labels.
#[derive(Clone, Copy, Debug)]
pub struct Batch<'a> {
    pub encoded: &'a EncodedMatrix,
    pub labels: &'a [usize],
}

impl<'a> Batch<'a> {
    pub fn new(encoded: &'a EncodedMatrix, labels: &'a [usize]) -> Self {
        Self { encoded, labels }
    }
}

/// Everything measured during one [`Trainer::run`].
#[derive(Clone, Debug, PartialEq)]
pub struct TrainingReport {
    pub accuracies: Vec<(Checkpoint, f64)>,
    pub epochs: Vec<EpochStats>,
    pub final_accuracy: f64,
    pub binarized: bool,
}

impl TrainingReport {
    /// Accuracy measured right after `train_init`.
    pub fn initial_accuracy(&self) -> Option<f64> {
        self.accuracies
            .iter()
            .find(|(c, _)| *c == Checkpoint::Init)
            .map(|&(_, acc)| acc)
    }
}

/// Runs the training schedule described by a [`TrainingConfig`].
#[derive(Clone, Debug, Default)]
pub struct Trainer {
    config: TrainingConfig,
}

impl Trainer {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Train `model` on `train`, measuring accuracy on `test`.
    ///
    /// Both batches are checked before the model is touched, so an error
    /// leaves its prototypes as they were. The prototypes are binarized at
    /// the end when the configuration asks for binary mode. The final
    /// snapshot is handed to `sink`.
    pub fn run(
        &self,
        model: &mut HdcModel,
        train: Batch<'_>,
        test: Batch<'_>,
        sink: &mut dyn ModelSink,
    ) -> Result<TrainingReport> {
        model.check_batch(train.encoded, train.labels)?;
        model.check_batch(test.encoded, test.labels)?;
        if test.labels.is_empty() {
            return Err(HdcError::EmptyInput(
                "cannot measure accuracy on zero samples".into(),
            ));
        }

        let mut accuracies = Vec::new();
        let mut epochs = Vec::with_capacity(self.config.epochs);

        model.train_init(train.encoded, train.labels)?;
        let init = model.test(test.encoded, test.labels)?;
        info!(accuracy = init, "initial test accuracy");
        sink.accuracy(Checkpoint::Init, init)?;
        accuracies.push((Checkpoint::Init, init));

        for epoch in 1..=self.config.epochs {
            let stats = model.train(train.encoded, train.labels)?;
            epochs.push(stats);

            if self.config.validate_every > 0 && epoch % self.config.validate_every == 0 {
                let acc = model.test(test.encoded, test.labels)?;
                info!(
                    epoch,
                    total = self.config.epochs,
                    accuracy = acc,
                    mistakes = stats.mistakes,
                    "validation"
                );
                sink.accuracy(Checkpoint::Epoch(epoch), acc)?;
                accuracies.push((Checkpoint::Epoch(epoch), acc));
            }
        }

        let final_accuracy = model.test(test.encoded, test.labels)?;
        info!(accuracy = final_accuracy, "final test accuracy");
        sink.accuracy(Checkpoint::Final, final_accuracy)?;
        accuracies.push((Checkpoint::Final, final_accuracy));

        let binarized = model.finalize();
        if binarized {
            info!("binarized class prototypes");
        }
        sink.prototypes(&PrototypeSnapshot::capture(model.memory()))?;

        Ok(TrainingReport {
            accuracies,
            epochs,
            final_accuracy,
            binarized,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;
    use crate::matrix::FeatureMatrix;
    use crate::sink::RecordingSink;

    fn two_class_levels() -> (FeatureMatrix, Vec<usize>) {
        let features = FeatureMatrix::from_rows(vec![
            vec![0, 0, 1, 0, 0, 1],
            vec![1, 0, 0, 0, 1, 0],
            vec![3, 3, 2, 3, 3, 2],
            vec![2, 3, 3, 3, 2, 3],
        ])
        .unwrap();
        (features, vec![0, 0, 1, 1])
    }

    #[test]
    fn test_schedule_and_sink() {
        let mut model = HdcModel::new(ModelConfig::new(2, 4, 6).with_dimensions(512)).unwrap();
        let (features, labels) = two_class_levels();
        let encoded = model.encode(&features).unwrap();

        let trainer = Trainer::new(TrainingConfig {
            epochs: 6,
            validate_every: 3,
            quantize_bits: 4,
        });
        let mut sink = RecordingSink::new();
        let batch = Batch::new(&encoded, &labels);
        let report = trainer.run(&mut model, batch, batch, &mut sink).unwrap();

        let checkpoints: Vec<Checkpoint> = report.accuracies.iter().map(|(c, _)| *c).collect();
        assert_eq!(
            checkpoints,
            vec![
                Checkpoint::Init,
                Checkpoint::Epoch(3),
                Checkpoint::Epoch(6),
                Checkpoint::Final
            ]
        );
        assert_eq!(report.epochs.len(), 6);
        assert_eq!(report.final_accuracy, 1.0);
        assert!(!report.binarized);
        assert_eq!(sink.accuracies, report.accuracies);
        assert_eq!(sink.snapshots.len(), 1);
        assert_eq!(sink.snapshots[0].epochs, 6);
    }

    #[test]
    fn test_binary_mode_finalizes() {
        let config = ModelConfig::new(2, 4, 6).with_dimensions(256).with_binary(true);
        let mut model = HdcModel::new(config).unwrap();
        let (features, labels) = two_class_levels();
        let encoded = model.encode(&features).unwrap();

        let mut sink = RecordingSink::new();
        let batch = Batch::new(&encoded, &labels);
        let report = Trainer::new(TrainingConfig {
            epochs: 2,
            validate_every: 0,
            quantize_bits: 4,
        })
        .run(&mut model, batch, batch, &mut sink)
        .unwrap();

        assert!(report.binarized);
        assert_eq!(report.accuracies.len(), 2);
        let snap = &sink.snapshots[0];
        assert!(snap.binary);
        assert!(snap.rows.iter().flatten().all(|&v| v == 1 || v == -1));
    }

    #[test]
    fn test_errors_propagate() {
        let mut model = HdcModel::new(ModelConfig::new(2, 4, 6).with_dimensions(64)).unwrap();
        let (features, _) = two_class_levels();
        let encoded = model.encode(&features).unwrap();
        let bad_labels = vec![0, 0, 1, 9];

        let mut sink = RecordingSink::new();
        let result = Trainer::default().run(
            &mut model,
            Batch::new(&encoded, &bad_labels),
            Batch::new(&encoded, &bad_labels),
            &mut sink,
        );
        assert!(result.unwrap_err().is_data());
        assert!(sink.accuracies.is_empty());
    }

    #[test]
    fn test_bad_test_batch_leaves_model_untouched() {
        let mut model = HdcModel::new(ModelConfig::new(2, 4, 6).with_dimensions(64)).unwrap();
        let (features, labels) = two_class_levels();
        let encoded = model.encode(&features).unwrap();
        let before = model.snapshot();
        let mut sink = RecordingSink::new();

        let bad_labels = vec![0, 1, 1, 7];
        let err = Trainer::default()
            .run(
                &mut model,
                Batch::new(&encoded, &labels),
                Batch::new(&encoded, &bad_labels),
                &mut sink,
            )
            .unwrap_err();
        assert!(err.is_data());

        let narrow = EncodedMatrix::zeros(4, 32);
        let err = Trainer::default()
            .run(
                &mut model,
                Batch::new(&encoded, &labels),
                Batch::new(&narrow, &labels),
                &mut sink,
            )
            .unwrap_err();
        assert!(err.is_configuration());

        let empty = EncodedMatrix::zeros(0, 64);
        let err = Trainer::default()
            .run(
                &mut model,
                Batch::new(&encoded, &labels),
                Batch::new(&empty, &[]),
                &mut sink,
            )
            .unwrap_err();
        assert!(matches!(err, HdcError::EmptyInput(_)));

        assert_eq!(model.snapshot(), before);
        assert!(sink.accuracies.is_empty());
        assert!(sink.snapshots.is_empty());
    }
}
