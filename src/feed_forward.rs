//! A [Feedforward neural network]
//! (https://en.wikipedia.org/wiki/Feedforward_neural_network) classifier.
//!
//! Hidden layers use ReLU, the output layer is linear and `forward` turns its
//! scores into probabilities with softmax. Training minimizes categorical
//! cross-entropy with one gradient descent step per example.
//!
//! A `Network` caches the state of its last forward pass inside its layers,
//! so it must not be shared between threads without external locking.
//!
//! # Example
//!
//! ```
//! # use perceptron::feed_forward::Network;
//! # use rand::SeedableRng;
//! let mut rng = rand::rngs::StdRng::seed_from_u64(0);
//! let mut network = Network::new(4, &[10, 8], 3, 0.01, &mut rng).unwrap();
//!
//! let probabilities = network.forward(&[0.0; 4]);
//! assert_eq!(probabilities.len(), 3);
//! assert!((probabilities.iter().sum::<f32>() - 1.0).abs() < 1e-5);
//! ```

use std::fmt;

use crate::activator::{self, Activator, Derivative};
use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::layers::{Dense, Layer};
use crate::utils::{Back, Front};
use crate::vector;

use log::debug;
use rand::Rng;

/// Added to predictions before taking their logarithm.
pub const LOG_EPSILON: f32 = 1e-10;

/// A Feedforward neural network
#[derive(Clone, Debug)]
pub struct Network {
    layers: Vec<Dense>,
    learning_rate: f32,
}

impl Network {
    /// Creates a new, untrained neural network.
    ///
    /// Arguments:
    ///  * `input_len` - the number of input features.
    ///  * `hidden` - the width of each hidden layer, in order.
    ///  * `output_len` - the number of classes.
    ///  * `learning_rate` - the gradient descent step size used by every
    ///                      layer.
    ///  * `rng` - the source of the initial weights.
    ///
    /// Hidden layers apply their ReLU derivative during backpropagation. The
    /// output layer is built with `Derivative::Folded`: `train_sample` hands
    /// it `softmax(z) - target`, which is already the gradient of the
    /// cross-entropy loss with respect to its pre-activation.
    pub fn new<R>(
        input_len: usize,
        hidden: &[usize],
        output_len: usize,
        learning_rate: f32,
        rng: &mut R,
    ) -> Result<Self>
    where
        R: Rng + ?Sized,
    {
        let mut sizes = Vec::with_capacity(hidden.len() + 2);
        sizes.push(input_len);
        sizes.extend_from_slice(hidden);
        sizes.push(output_len);
        Network::from_layer_sizes(&sizes, learning_rate, rng)
    }

    /// Creates a new network from the full list of layer widths, input layer
    /// first and output layer last.
    pub fn from_layer_sizes<R>(sizes: &[usize], learning_rate: f32, rng: &mut R) -> Result<Self>
    where
        R: Rng + ?Sized,
    {
        if sizes.len() < 2 {
            return Err(Error::TooFewLayers(sizes.len()));
        }
        if let Some(i) = sizes.iter().position(|&size| size == 0) {
            return Err(Error::EmptyLayer(i));
        }

        let last = sizes.len() - 2;
        let layers = sizes
            .windows(2)
            .enumerate()
            .map(|(i, io)| {
                if i == last {
                    Dense::new(Activator::Linear, Derivative::Folded, io[0], io[1], rng)
                } else {
                    Dense::new(Activator::ReLU, Derivative::Activator, io[0], io[1], rng)
                }
            })
            .collect();
        Ok(Network {
            layers,
            learning_rate,
        })
    }

    /// Returns the size of the input layer to the network.
    pub fn input_len(&self) -> usize {
        self.layers.front().input_len()
    }

    /// Returns the size of the output layer from the network.
    pub fn output_len(&self) -> usize {
        self.layers.back().output_len()
    }

    pub fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    pub fn layers(&self) -> &[Dense] {
        &self.layers
    }

    /// Feeds the provided `input` through the network, returning a
    /// probability for each class.
    ///
    /// # Panics
    ///
    /// Panics if `input` does not have `input_len()` entries.
    pub fn forward(&mut self, input: &[f32]) -> Vec<f32> {
        assert_eq!(input.len(), self.input_len(), "wrong input length");
        self.layers[0].forward(input);
        for i in 1..self.layers.len() {
            let (prev, layer) = adjacent_layers(&mut self.layers, i);
            layer.forward(prev.output());
        }
        activator::softmax(self.layers.back().output())
    }

    /// Runs one step of gradient descent on a single labelled example.
    ///
    /// Returns the cross-entropy loss of the prediction made before the
    /// update.
    ///
    /// # Panics
    ///
    /// Panics if `input` or `target` have the wrong length.
    pub fn train_sample(&mut self, input: &[f32], target: &[f32]) -> f32 {
        assert_eq!(target.len(), self.output_len(), "wrong target length");
        let predicted = self.forward(input);
        let loss = cross_entropy_loss(&predicted, target);

        let mut delta = vector::subtract(&predicted, target);
        for i in (0..self.layers.len()).rev() {
            let mut input_errors = self.layers[i].backward_from_dz(&delta, self.learning_rate);
            if i > 0 {
                self.layers[i - 1].activation_gradient(&mut input_errors);
                delta = input_errors;
            }
        }
        loss
    }

    /// Trains the network for `epochs` passes over `dataset`, shuffling it
    /// before every pass.
    ///
    /// Returns the mean cross-entropy loss of every epoch.
    pub fn train<R>(
        &mut self,
        dataset: &mut Dataset,
        epochs: usize,
        rng: &mut R,
    ) -> Result<Vec<f32>>
    where
        R: Rng + ?Sized,
    {
        let mut losses = Vec::with_capacity(epochs);
        for epoch in 1..=epochs {
            let loss = self.train_epoch(dataset, rng)?;
            debug!("Epoch {}: loss = {:.4}", epoch, loss);
            losses.push(loss);
        }
        Ok(losses)
    }

    /// Shuffles `dataset` and trains on each of its examples once, returning
    /// the mean loss.
    pub fn train_epoch<R>(&mut self, dataset: &mut Dataset, rng: &mut R) -> Result<f32>
    where
        R: Rng + ?Sized,
    {
        self.check_dataset(dataset)?;
        dataset.shuffle(rng)?;
        let mut total = 0.0;
        for i in 0..dataset.len() {
            let (input, target) = dataset.example(i);
            total += self.train_sample(input, target);
        }
        Ok(total / dataset.len() as f32)
    }

    /// Returns the fraction of examples in `dataset` whose most probable class
    /// matches the label.
    pub fn evaluate(&mut self, dataset: &Dataset) -> Result<f32> {
        self.check_dataset(dataset)?;
        let mut correct = 0;
        for i in 0..dataset.len() {
            let (input, target) = dataset.example(i);
            let predicted = self.forward(input);
            if vector::arg_max(&predicted) == vector::arg_max(target) {
                correct += 1;
            }
        }
        Ok(correct as f32 / dataset.len() as f32)
    }

    /// Verifies that `dataset` can be fed to this network.
    fn check_dataset(&self, dataset: &Dataset) -> Result<()> {
        if dataset.is_empty() {
            return Err(Error::EmptyDataset);
        }
        if dataset.input_len() != self.input_len() {
            return Err(Error::DatasetShape {
                what: "feature",
                expected: self.input_len(),
                found: dataset.input_len(),
            });
        }
        if dataset.output_len() != self.output_len() {
            return Err(Error::DatasetShape {
                what: "label",
                expected: self.output_len(),
                found: dataset.output_len(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Neural Network Structure:")?;
        for (i, layer) in self.layers.iter().enumerate() {
            writeln!(
                f,
                "Layer {}: inputs={}, outputs={}",
                i + 1,
                layer.input_len(),
                layer.output_len()
            )?;
        }
        Ok(())
    }
}

/// Categorical cross-entropy between a predicted distribution and a one-hot
/// `target`: `-sum(target[i] * ln(predicted[i] + LOG_EPSILON))`.
pub fn cross_entropy_loss(predicted: &[f32], target: &[f32]) -> f32 {
    assert_eq!(predicted.len(), target.len());
    -predicted
        .iter()
        .zip(target)
        .map(|(&p, &t)| t * (p + LOG_EPSILON).ln())
        .sum::<f32>()
}

/// Gets a layer and the layer feeding it.
fn adjacent_layers(layers: &mut [Dense], layer: usize) -> (&Dense, &mut Dense) {
    let (before, after) = layers.split_at_mut(layer);
    (before.back(), &mut after[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::Mat;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn network(seed: u64) -> Network {
        let mut rng = StdRng::seed_from_u64(seed);
        Network::new(4, &[10, 8], 3, 0.01, &mut rng).unwrap()
    }

    #[test]
    fn too_few_layers() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            Network::from_layer_sizes(&[3], 0.1, &mut rng),
            Err(Error::TooFewLayers(1))
        ));
    }

    #[test]
    fn empty_layer() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            Network::new(4, &[10, 0], 3, 0.1, &mut rng),
            Err(Error::EmptyLayer(2))
        ));
        assert!(matches!(
            Network::new(0, &[], 3, 0.1, &mut rng),
            Err(Error::EmptyLayer(0))
        ));
    }

    #[test]
    fn layers_are_chained() {
        let net = network(1);
        let shapes: Vec<_> = net
            .layers()
            .iter()
            .map(|l| (l.input_len(), l.output_len()))
            .collect();
        assert_eq!(shapes, vec![(4, 10), (10, 8), (8, 3)]);
        assert_eq!(net.input_len(), 4);
        assert_eq!(net.output_len(), 3);
        for pair in net.layers().windows(2) {
            assert_eq!(pair[0].output_len(), pair[1].input_len());
        }
    }

    #[test]
    fn only_the_output_layer_folds_its_derivative() {
        let net = network(2);
        let (last, hidden) = net.layers().split_last().unwrap();
        assert_eq!(last.activator(), Activator::Linear);
        assert_eq!(last.derivative(), Derivative::Folded);
        for layer in hidden {
            assert_eq!(layer.activator(), Activator::ReLU);
            assert_eq!(layer.derivative(), Derivative::Activator);
        }
    }

    #[test]
    fn forward_on_zero_vector_is_a_distribution() {
        let mut net = network(3);
        let out = net.forward(&[0.0; 4]);
        assert_eq!(out.len(), 3);
        assert_abs_diff_eq!(out.iter().sum::<f32>(), 1.0, epsilon = 1e-5);
        assert!(out.iter().all(|&p| p >= 0.0 && p <= 1.0));
    }

    #[test]
    #[should_panic(expected = "wrong input length")]
    fn forward_rejects_wrong_input_length() {
        network(0).forward(&[0.0; 3]);
    }

    #[test]
    fn cross_entropy() {
        assert_abs_diff_eq!(
            cross_entropy_loss(&[1.0, 0.0, 0.0], &[1.0, 0.0, 0.0]),
            0.0,
            epsilon = 1e-6
        );
        assert_abs_diff_eq!(
            cross_entropy_loss(&[0.5, 0.5, 0.0], &[1.0, 0.0, 0.0]),
            0.5f32.ln().abs(),
            epsilon = 1e-6
        );
        // A zero prediction for the true class stays finite.
        let worst = cross_entropy_loss(&[0.0, 1.0], &[1.0, 0.0]);
        assert!(worst.is_finite());
        assert_abs_diff_eq!(worst, -(LOG_EPSILON.ln()), epsilon = 1e-3);
    }

    #[test]
    fn train_sample_reduces_loss_on_that_sample() {
        let mut net = network(4);
        let input = [0.8, 0.1, 0.4, 0.3];
        let target = [0.0, 1.0, 0.0];
        let before = net.train_sample(&input, &target);
        let after = cross_entropy_loss(&net.forward(&input), &target);
        assert!(after < before, "{} !< {}", after, before);
    }

    #[test]
    fn train_sample_matches_hand_computed_gradients() {
        // 1 -> 1 -> 2 network with known parameters.
        let hidden = Dense::from_parameters(
            Activator::ReLU,
            Derivative::Activator,
            Mat::from_rows(&[[2.0f32]]),
            vec![0.0],
        );
        let output = Dense::from_parameters(
            Activator::Linear,
            Derivative::Folded,
            Mat::from_rows(&[[1.0f32, -1.0]]),
            vec![0.0, 0.0],
        );
        let mut net = Network {
            layers: vec![hidden, output],
            learning_rate: 0.1,
        };

        // h = relu(2 * 1) = 2, scores = [2, -2].
        let p = activator::softmax(&[2.0, -2.0]);
        let loss = net.train_sample(&[1.0], &[1.0, 0.0]);
        assert_abs_diff_eq!(loss, -(p[0] + LOG_EPSILON).ln(), epsilon = 1e-6);

        // Output layer: dz = p - target, weights -= 0.1 * h * dz.
        let dz = [p[0] - 1.0, p[1]];
        let w = net.layers[1].weights();
        assert_abs_diff_eq!(w.get(0, 0), 1.0 - 0.1 * 2.0 * dz[0], epsilon = 1e-6);
        assert_abs_diff_eq!(w.get(0, 1), -1.0 - 0.1 * 2.0 * dz[1], epsilon = 1e-6);

        // Hidden layer sees the pre-update output weights: dh = 1 * dz0 - 1 * dz1.
        let dh = dz[0] - dz[1];
        let w = net.layers[0].weights();
        assert_abs_diff_eq!(w.get(0, 0), 2.0 - 0.1 * 1.0 * dh, epsilon = 1e-6);
        assert_abs_diff_eq!(net.layers[0].biases()[0], -0.1 * dh, epsilon = 1e-6);
    }

    #[test]
    fn dead_relu_blocks_the_gradient() {
        let hidden = Dense::from_parameters(
            Activator::ReLU,
            Derivative::Activator,
            Mat::from_rows(&[[-1.0f32]]),
            vec![0.0],
        );
        let output = Dense::from_parameters(
            Activator::Linear,
            Derivative::Folded,
            Mat::from_rows(&[[1.0f32, 2.0]]),
            vec![0.0, 0.0],
        );
        let mut net = Network {
            layers: vec![hidden, output],
            learning_rate: 0.5,
        };
        net.train_sample(&[1.0], &[0.0, 1.0]);
        assert_eq!(net.layers[0].weights().get(0, 0), -1.0);
        assert_eq!(net.layers[0].biases(), &[0.0]);
    }

    #[test]
    fn structure_listing() {
        let listing = network(0).to_string();
        assert_eq!(
            listing,
            "Neural Network Structure:\n\
             Layer 1: inputs=4, outputs=10\n\
             Layer 2: inputs=10, outputs=8\n\
             Layer 3: inputs=8, outputs=3\n"
        );
    }

    #[test]
    fn evaluate_rejects_mismatched_dataset() {
        let mut net = network(0);
        let dataset = Dataset::new(Mat::zeros(2, 5), Mat::zeros(2, 3)).unwrap();
        assert!(matches!(
            net.evaluate(&dataset),
            Err(Error::DatasetShape { what: "feature", expected: 4, found: 5 })
        ));
        let empty = Dataset::new(Mat::zeros(0, 4), Mat::zeros(0, 3)).unwrap();
        assert!(matches!(net.evaluate(&empty), Err(Error::EmptyDataset)));
    }

    /// Three well separated clusters in four dimensions.
    fn clusters(per_class: usize, rng: &mut StdRng) -> Dataset {
        let mut features = Vec::new();
        let mut labels = Vec::new();
        for class in 0..3 {
            for _ in 0..per_class {
                let mut x = [0.0f32; 4];
                vector::randomize_uniform(&mut x, rng);
                let mut x = vector::scale(&x, 0.1);
                x[class] += 1.0;
                let mut y = vec![0.0f32; 3];
                y[class] = 1.0;
                features.push(x);
                labels.push(y);
            }
        }
        Dataset::new(Mat::from_rows(&features), Mat::from_rows(&labels)).unwrap()
    }

    #[test]
    fn training_reduces_loss() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut dataset = clusters(30, &mut rng);
        let mut net = Network::new(4, &[10, 8], 3, 0.01, &mut rng).unwrap();

        let losses = net.train(&mut dataset, 50, &mut rng).unwrap();
        assert_eq!(losses.len(), 50);
        assert!(losses.iter().all(|l| l.is_finite()));
        let head: f32 = losses[..5].iter().sum::<f32>() / 5.0;
        let tail: f32 = losses[45..].iter().sum::<f32>() / 5.0;
        assert!(tail < head, "loss went from {} to {}", head, tail);
    }

    #[test]
    fn trained_network_separates_clusters() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut train = clusters(40, &mut rng);
        let test = clusters(10, &mut rng);
        let mut net = Network::new(4, &[10, 8], 3, 0.05, &mut rng).unwrap();
        net.train(&mut train, 150, &mut rng).unwrap();
        let accuracy = net.evaluate(&test).unwrap();
        assert!(accuracy >= 0.8, "accuracy {}", accuracy);
        assert!(accuracy <= 1.0);
    }
}
