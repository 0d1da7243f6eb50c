//! Utilities for training neural networks.

use std::time::{Duration, Instant};

use crate::dataset::Dataset;
use crate::error::Result;
use crate::feed_forward::Network;

use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// A builder for training new networks.
#[derive(Clone, Debug)]
pub struct Trainer {
    layer_sizes: Vec<usize>,
    learning_rate: f32,
    logging: Logging,
    stop_condition: StopCondition,
    seed: Option<u64>,
}

impl Trainer {
    /// Creates a new Trainer instance.
    ///
    /// Arguments:
    ///  * `layers` - the number of neurons to use at each layer, input layer
    ///               first and output layer last. Must contain at least 2
    ///               elements.
    ///
    /// The trainer is initialized with some default values. These defaults are:
    ///
    /// * A learning rate of 0.01.
    /// * Stops after 300 epochs.
    /// * Logs on training completion.
    /// * Seeds weights and shuffling from system entropy.
    pub fn new(layers: &[usize]) -> Self {
        Trainer {
            layer_sizes: layers.into(),
            learning_rate: 0.01,
            logging: Logging::Completion,
            stop_condition: StopCondition::Epochs(300),
            seed: None,
        }
    }

    /// Sets the learning rate to use during gradient descent.
    pub fn learning_rate(mut self, rate: f32) -> Self {
        self.learning_rate = rate;
        self
    }

    /// Sets the type of logging to be emitted during training.
    pub fn logging(mut self, logging: Logging) -> Self {
        self.logging = logging;
        self
    }

    /// Sets the condition to finish training.
    pub fn stop_condition<C>(mut self, condition: C) -> Self
    where
        C: Into<StopCondition>,
    {
        self.stop_condition = condition.into();
        self
    }

    /// Makes weight initialization and shuffling reproducible.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Trains a network on the provided labelled data.
    ///
    /// The examples in `dataset` are reshuffled at the start of every epoch.
    ///
    /// Returns:
    ///   A fully trained neural network, or an error if invalid training
    ///   parameters were provided.
    pub fn train(self, dataset: &mut Dataset) -> Result<Network> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut network =
            Network::from_layer_sizes(&self.layer_sizes, self.learning_rate, &mut rng)?;

        let start_time = Instant::now();
        let mut epoch = 0;
        let mut loss = None;
        while !self.stop_condition.should_stop(epoch, loss, start_time) {
            let epoch_loss = network.train_epoch(dataset, &mut rng)?;
            epoch += 1;
            loss = Some(epoch_loss);
            self.logging.epoch(epoch, epoch_loss);
        }
        self.logging.completion(epoch, loss, start_time);
        Ok(network)
    }
}

/// Logging frequency to use during training
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Logging {
    /// No logs will be emitted
    Silent,
    /// A summary will be logged at completion
    Completion,
    /// A summary will be logged after every `n` epochs, and at completion
    Iterations(usize),
}

impl Logging {
    /// Performs logging at the end of `epoch`.
    fn epoch(self, epoch: usize, loss: f32) {
        if let Logging::Iterations(freq) = self {
            if freq > 0 && epoch % freq == 0 {
                info!("Epoch {}: loss = {:.4}", epoch, loss);
            }
        }
    }

    /// Performs logging at the end of training.
    fn completion(self, epochs: usize, loss: Option<f32>, start_time: Instant) {
        if let Logging::Silent = self {
            return;
        }
        let elapsed = start_time.elapsed().as_secs_f64();
        match loss {
            Some(loss) => info!(
                "Ran {} epochs in {:.2} seconds, final loss = {:.4}",
                epochs, elapsed, loss
            ),
            None => info!("Ran no epochs in {:.2} seconds", elapsed),
        }
    }
}

/// When to stop training
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum StopCondition {
    /// Stops after the provided number of epochs
    Epochs(usize),
    /// Stops when the mean epoch loss drops below the provided threshold
    ErrorThreshold(f32),
    /// Stops after the provided duration
    Duration(Duration),
}

impl From<Duration> for StopCondition {
    fn from(duration: Duration) -> StopCondition {
        StopCondition::Duration(duration)
    }
}

impl StopCondition {
    /// Returns true if training is complete after `epoch` epochs.
    ///
    /// `loss` is the mean loss of the last epoch, or `None` before the first
    /// one.
    fn should_stop(self, epoch: usize, loss: Option<f32>, start_time: Instant) -> bool {
        match self {
            StopCondition::Epochs(epochs) => epoch >= epochs,
            StopCondition::ErrorThreshold(threshold) => loss.map_or(false, |l| l < threshold),
            StopCondition::Duration(duration) => start_time.elapsed() > duration,
        }
    }
}
