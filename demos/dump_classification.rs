//! Dump Classification
//!
//! Loads a dataset directory (`parameters`, `train.val`, `train.label`,
//! `test.val`, `test.label`), prints its checksum, and trains a model.
//!
//! Run: cargo run --example dump_classification -- <dataset-dir> [config.json] [prototypes.ndjson]
//!
//! Without a config file the model shape is taken from the data with
//! default training settings.

use hdclassify::{
    Batch, Config, Dataset, HdcModel, JsonSink, ModelConfig, RecordingSink, Trainer,
    TrainingConfig,
};
use std::env;
use std::fs::File;
use std::io::BufWriter;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

fn init_logging() {
    let mut filter = EnvFilter::from_default_env();
    if let Ok(d) = "hdclassify=info".parse() {
        filter = filter.add_directive(d);
    }
    fmt().with_env_filter(filter).init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let mut args = env::args().skip(1);
    let Some(dir) = args.next() else {
        eprintln!("usage: dump_classification <dataset-dir> [config.json] [prototypes.ndjson]");
        std::process::exit(2);
    };
    let config_path = args.next();
    let output = args.next();

    let dataset = Dataset::load(&dir)?;
    println!("Checksum: {}", dataset.checksum());

    let config = config_path.map(Config::from_path).transpose()?;
    let training = config
        .as_ref()
        .map_or_else(TrainingConfig::default, |c| c.training.clone());

    let train = dataset.train.to_levels(training.quantize_bits)?;
    let test = dataset.test.to_levels(training.quantize_bits)?;
    let n_lv = train.n_lv.max(test.n_lv).max(2);

    let model_config = match config {
        Some(config) => config.model,
        None => ModelConfig::new(dataset.n_class().max(1), n_lv, dataset.sample_size()),
    };
    if model_config.n_lv < n_lv {
        warn!(configured = model_config.n_lv, needed = n_lv, "config has fewer levels than the data");
    }

    let mut model = HdcModel::new(model_config)?;
    let train_enc = model.encode(&train.features)?;
    let test_enc = model.encode(&test.features)?;
    info!(train = train.labels.len(), test = test.labels.len(), "encoded dataset");

    let trainer = Trainer::new(training);
    let train_batch = Batch::new(&train_enc, &train.labels);
    let test_batch = Batch::new(&test_enc, &test.labels);

    let report = match output {
        Some(path) => {
            let mut sink = JsonSink::new(BufWriter::new(File::create(&path)?));
            let report = trainer.run(&mut model, train_batch, test_batch, &mut sink)?;
            info!(path = %path, "wrote training records");
            report
        }
        None => trainer.run(&mut model, train_batch, test_batch, &mut RecordingSink::new())?,
    };

    println!("Final accuracy: {:.4}", report.final_accuracy);
    Ok(())
}
