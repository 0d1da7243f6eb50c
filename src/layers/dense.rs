use crate::activator::{Activator, Derivative};
use crate::layers;
use crate::matrix::Mat;

use itertools::multizip;
use rand::distributions::Uniform;
use rand::Rng;

/// A wrapper for a fully connected layer of a neural network
///
/// The weights are stored as an `inputs x outputs` matrix, so column `j`
/// holds the weights feeding output neuron `j`.
#[derive(Clone, Debug)]
pub struct Dense {
    /// The activation function to be used for every neuron in the layer.
    activator: Activator,
    /// Whether the activator's derivative is applied during backpropagation.
    derivative: Derivative,
    weights: Mat,
    biases: Vec<f32>,
    cache: Cache,
}

/// State of the most recent forward pass.
#[derive(Clone, Debug)]
struct Cache {
    input: Vec<f32>,
    z: Vec<f32>,
    output: Vec<f32>,
    primed: bool,
}

impl Cache {
    fn new(inputs: usize, outputs: usize) -> Self {
        Cache {
            input: vec![0.0; inputs],
            z: vec![0.0; outputs],
            output: vec![0.0; outputs],
            primed: false,
        }
    }
}

impl Dense {
    /// Initializes a new, untrained layer.
    ///
    /// Weights are drawn uniformly from `[-1, 1]` and biases start at zero.
    ///
    /// Arguments:
    ///
    ///  * `activator` - the activation function to be used for this layer's
    ///                  output.
    ///  * `derivative` - how the activator's derivative takes part in
    ///                   backpropagation.
    ///  * `inputs` - the number of inputs to this layer.
    ///  * `outputs` - the number of outputs from this layer.
    pub fn new<R>(
        activator: Activator,
        derivative: Derivative,
        inputs: usize,
        outputs: usize,
        rng: &mut R,
    ) -> Self
    where
        R: Rng + ?Sized,
    {
        let weights = Mat::random(Uniform::new_inclusive(-1.0f32, 1.0), inputs, outputs, rng);
        Dense::from_parameters(activator, derivative, weights, vec![0.0; outputs])
    }

    /// Builds a layer around existing parameters.
    ///
    /// # Panics
    ///
    /// Panics if `biases` does not have one entry per weight column.
    pub fn from_parameters(
        activator: Activator,
        derivative: Derivative,
        weights: Mat,
        biases: Vec<f32>,
    ) -> Self {
        assert_eq!(weights.cols(), biases.len(), "one bias per output");
        Dense {
            activator,
            derivative,
            cache: Cache::new(weights.rows(), weights.cols()),
            weights,
            biases,
        }
    }

    pub fn activator(&self) -> Activator {
        self.activator
    }

    pub fn derivative(&self) -> Derivative {
        self.derivative
    }

    pub fn weights(&self) -> &Mat {
        &self.weights
    }

    pub fn biases(&self) -> &[f32] {
        &self.biases
    }

    /// Returns the pre-activation values of the most recent forward pass.
    pub fn pre_activation(&self) -> &[f32] {
        &self.cache.z
    }

    fn assert_primed(&self) {
        assert!(self.cache.primed, "backward pass before any forward pass");
    }
}

impl layers::Layer for Dense {
    fn input_len(&self) -> usize {
        self.weights.rows()
    }

    fn output_len(&self) -> usize {
        self.weights.cols()
    }

    fn forward(&mut self, input: &[f32]) -> &[f32] {
        assert_eq!(input.len(), self.input_len());
        self.cache.input.copy_from_slice(input);
        let weighted = self.weights.vec_mul(input);
        for (y, z, wx, b) in multizip((
            self.cache.output.iter_mut(),
            self.cache.z.iter_mut(),
            weighted.iter(),
            self.biases.iter(),
        )) {
            *z = wx + b;
            *y = self.activator.f(*z);
        }
        self.cache.primed = true;
        &self.cache.output
    }

    fn output(&self) -> &[f32] {
        &self.cache.output
    }

    fn backward_from_dz(&mut self, dz: &[f32], learning_rate: f32) -> Vec<f32> {
        self.assert_primed();
        assert_eq!(dz.len(), self.output_len());
        let input_errors = self.weights.mul_vec(dz);
        self.weights.ger(-learning_rate, &self.cache.input, dz);
        for (b, d) in self.biases.iter_mut().zip(dz) {
            *b -= learning_rate * d;
        }
        input_errors
    }

    fn activation_gradient(&self, grad: &mut [f32]) {
        self.assert_primed();
        assert_eq!(grad.len(), self.output_len());
        for (g, &z) in grad.iter_mut().zip(&self.cache.z) {
            *g *= self.derivative.factor(self.activator, z);
        }
    }
}
