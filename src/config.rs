//! Run configuration for the training binary.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{Error, Result};
use crate::trainer::{Logging, StopCondition, Trainer};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Parameters for one training run. Missing JSON fields take the defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub input_size: usize,
    pub hidden_sizes: Vec<usize>,
    pub output_size: usize,
    pub learning_rate: f32,
    pub epochs: usize,
    /// Number of examples drawn for training.
    pub num_train: usize,
    /// Number of examples drawn for evaluation.
    pub num_test: usize,
    /// Every feature is divided by this value before training. Must be
    /// positive and finite.
    pub feature_scale: f32,
    /// Log the epoch loss every `log_every` epochs. Zero only logs the
    /// final summary.
    pub log_every: usize,
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            input_size: 4,
            hidden_sizes: vec![10, 8],
            output_size: 3,
            learning_rate: 0.01,
            epochs: 300,
            num_train: 120,
            num_test: 30,
            feature_scale: 8.0,
            log_every: 10,
            seed: None,
        }
    }
}

impl Config {
    /// Loads a JSON configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Config::from_reader(BufReader::new(File::open(path)?))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let config: Config = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the values serde cannot.
    pub fn validate(&self) -> Result<()> {
        if !(self.feature_scale.is_finite() && self.feature_scale > 0.0) {
            return Err(Error::FeatureScale(self.feature_scale));
        }
        Ok(())
    }

    /// Returns the generator driving the whole run, seeded by `seed` or from
    /// system entropy.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Returns every layer width, input layer first.
    pub fn layer_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![self.input_size];
        sizes.extend_from_slice(&self.hidden_sizes);
        sizes.push(self.output_size);
        sizes
    }

    /// Builds a `Trainer` from this configuration.
    ///
    /// The trainer's seed is drawn from `rng`, so weight initialization
    /// continues the stream used for splitting instead of replaying it.
    pub fn trainer<R: Rng + ?Sized>(&self, rng: &mut R) -> Trainer {
        let logging = match self.log_every {
            0 => Logging::Completion,
            n => Logging::Iterations(n),
        };
        Trainer::new(&self.layer_sizes())
            .learning_rate(self.learning_rate)
            .logging(logging)
            .stop_condition(StopCondition::Epochs(self.epochs))
            .seed(rng.gen())
    }
}
