//! Synthetic Classification
//!
//! Generates noisy clusters, one per class, quantizes each split against its
//! own range, and runs the full training schedule.
//!
//! Run: cargo run --example synthetic_classification
//! Logs: RUST_LOG=hdclassify=debug cargo run --example synthetic_classification

use hdclassify::{
    level_memory_size, min_max_quantize, Batch, HdcModel, JsonSink, Matrix, ModelConfig,
    RawMatrix, Trainer, TrainingConfig,
};
use rand::prelude::*;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

const N_CLASS: usize = 5;
const N_ID: usize = 32;
const BITS: u32 = 4;

fn init_logging() {
    let mut filter = EnvFilter::from_default_env();
    if let Ok(d) = "hdclassify=info".parse() {
        filter = filter.add_directive(d);
    }
    fmt().with_env_filter(filter).init();
}

/// Sample `per_class` noisy rows around each centre.
fn generate(
    centres: &[Vec<f64>],
    per_class: usize,
    noise: f64,
    seed: u64,
) -> hdclassify::Result<(RawMatrix, Vec<usize>)> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut data = Vec::with_capacity(centres.len() * per_class * N_ID);
    let mut labels = Vec::with_capacity(centres.len() * per_class);

    for _ in 0..per_class {
        for (class, centre) in centres.iter().enumerate() {
            data.extend(centre.iter().map(|c| c + rng.gen_range(-noise..noise)));
            labels.push(class);
        }
    }
    let rows = labels.len();
    Ok((Matrix::from_vec(rows, N_ID, data)?, labels))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let mut rng = StdRng::seed_from_u64(2024);
    let centres: Vec<Vec<f64>> = (0..N_CLASS)
        .map(|_| (0..N_ID).map(|_| rng.gen_range(0.0..100.0)).collect())
        .collect();

    let (train_raw, train_labels) = generate(&centres, 200, 15.0, 1)?;
    let (test_raw, test_labels) = generate(&centres, 50, 15.0, 2)?;

    let train = min_max_quantize(&train_raw, BITS)?;
    let test = min_max_quantize(&test_raw, BITS)?;

    let config = ModelConfig::new(N_CLASS, level_memory_size(BITS), N_ID).with_seed(42);
    let mut model = HdcModel::new(config)?;

    let train_enc = model.encode(&train)?;
    let test_enc = model.encode(&test)?;
    info!(train = train_labels.len(), test = test_labels.len(), dims = model.dimensions(), "encoded");

    let trainer = Trainer::new(TrainingConfig {
        epochs: 20,
        validate_every: 5,
        quantize_bits: BITS,
    });
    let mut sink = JsonSink::new(Vec::new());
    let report = trainer.run(
        &mut model,
        Batch::new(&train_enc, &train_labels),
        Batch::new(&test_enc, &test_labels),
        &mut sink,
    )?;

    println!("\nCheckpoints:");
    for (checkpoint, accuracy) in &report.accuracies {
        println!("  {:<12} {:.4}", format!("{:?}", checkpoint), accuracy);
    }
    let mistakes: Vec<usize> = report.epochs.iter().map(|e| e.mistakes).collect();
    println!("Mistakes per epoch: {:?}", mistakes);
    println!("Sink wrote {} bytes of NDJSON", sink.into_inner().len());

    Ok(())
}
