//! Trains a classifier on an iris-style CSV file and reports its accuracy.
//!
//! Usage: cargo run --bin train -- --data iris.csv --epochs 300

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use itertools::Itertools;
use log::info;

use perceptron::config::Config;
use perceptron::Dataset;

#[derive(Debug, Parser)]
#[command(about = "Train a feedforward classifier on iris-style CSV data")]
struct Args {
    /// CSV file with a header row, four feature columns and a class column
    #[arg(short, long, default_value = "iris.csv")]
    data: PathBuf,

    /// JSON configuration file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long)]
    epochs: Option<usize>,

    #[arg(long)]
    learning_rate: Option<f32>,

    /// Hidden layer widths, e.g. `--hidden 10,8`
    #[arg(long, value_delimiter = ',')]
    hidden: Option<Vec<usize>>,

    #[arg(long)]
    num_train: Option<usize>,

    #[arg(long)]
    num_test: Option<usize>,

    #[arg(short, long)]
    seed: Option<u64>,
}

impl Args {
    fn config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("failed to load {}", path.display()))?,
            None => Config::default(),
        };
        if let Some(epochs) = self.epochs {
            config.epochs = epochs;
        }
        if let Some(rate) = self.learning_rate {
            config.learning_rate = rate;
        }
        if let Some(hidden) = &self.hidden {
            config.hidden_sizes = hidden.clone();
        }
        if let Some(n) = self.num_train {
            config.num_train = n;
        }
        if let Some(n) = self.num_test {
            config.num_test = n;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = args.config()?;

    let dataset = Dataset::from_csv_path(&args.data)
        .with_context(|| format!("failed to read {}", args.data.display()))?;
    let mut rng = config.rng();
    let (mut train, mut test) = dataset.split(config.num_train, config.num_test, &mut rng)?;
    train.scale_features(config.feature_scale);
    test.scale_features(config.feature_scale);
    info!(
        "Dataset loaded, shuffled and normalized. Train examples: {}, Test examples: {}",
        train.len(),
        test.len()
    );

    info!("Training with layer sizes {}", config.layer_sizes().iter().join(" -> "));
    let mut network = config.trainer(&mut rng).train(&mut train)?;
    print!("{}", network);

    let accuracy = network.evaluate(&test)?;
    println!("Test Accuracy: {:.2}%", accuracy * 100.0);

    let (sample, _) = train.example(0);
    let prediction = network.forward(sample);
    println!(
        "Prediction for first training sample: {}",
        prediction.iter().map(|p| format!("{:.3}", p)).join(" ")
    );
    Ok(())
}
