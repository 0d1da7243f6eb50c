//! Activation functions and their derivatives.
//!
//! Every derivative takes the *pre-activation* value `z`, not the activation
//! output. Sigmoid and tanh recompute the activation from `z` internally.

/// [Activation function](https://en.wikipedia.org/wiki/Activation_function)
/// types.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activator {
    /// Sigmoid function
    Sigmoid,
    /// Rectified Linear Unit
    ReLU,
    /// Hyperbolic tan function
    TanH,
    /// Identity function
    Linear,
}

impl Activator {
    /// Evaluates `f(z)` for the selected activation function.
    pub fn f(self, z: f32) -> f32 {
        match self {
            Activator::Sigmoid => sigmoid(z),
            Activator::ReLU => relu(z),
            Activator::TanH => tanh(z),
            Activator::Linear => linear(z),
        }
    }

    /// Evaluates the derivative `f'(z)` at the pre-activation value `z`.
    pub fn fprime(self, z: f32) -> f32 {
        match self {
            Activator::Sigmoid => sigmoid_derivative(z),
            Activator::ReLU => relu_derivative(z),
            Activator::TanH => tanh_derivative(z),
            Activator::Linear => linear_derivative(z),
        }
    }
}

/// How a layer's activation derivative enters the chain rule.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Derivative {
    /// Multiply upstream gradients by the activator's own derivative.
    Activator,
    /// The derivative is already folded into the gradient handed to this
    /// layer, so it contributes a factor of one.
    ///
    /// This is the case for a linear output layer trained with softmax and
    /// cross-entropy: `softmax(z) - target` is already `dL/dz`.
    Folded,
}

impl Derivative {
    /// Returns the chain-rule factor for `activator` at pre-activation `z`.
    pub fn factor(self, activator: Activator, z: f32) -> f32 {
        match self {
            Derivative::Activator => activator.fprime(z),
            Derivative::Folded => 1.0,
        }
    }
}

/// `1 / (1 + e^-x)`
pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

pub fn sigmoid_derivative(x: f32) -> f32 {
    let s = sigmoid(x);
    s * (1.0 - s)
}

pub fn relu(x: f32) -> f32 {
    if x > 0.0 {
        x
    } else {
        0.0
    }
}

/// The derivative at zero is defined as zero.
pub fn relu_derivative(x: f32) -> f32 {
    if x > 0.0 {
        1.0
    } else {
        0.0
    }
}

pub fn tanh(x: f32) -> f32 {
    x.tanh()
}

pub fn tanh_derivative(x: f32) -> f32 {
    let t = tanh(x);
    1.0 - t * t
}

pub fn linear(x: f32) -> f32 {
    x
}

pub fn linear_derivative(_: f32) -> f32 {
    1.0
}

/// Converts raw scores into a probability distribution.
///
/// The maximum is subtracted before exponentiating so large scores do not
/// overflow.
///
/// # Panics
///
/// Panics if `z` is empty.
pub fn softmax(z: &[f32]) -> Vec<f32> {
    assert!(!z.is_empty(), "softmax of an empty vector");
    let max = z.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let mut out: Vec<f32> = z.iter().map(|&v| (v - max).exp()).collect();
    let sum: f32 = out.iter().sum();
    for v in &mut out {
        *v /= sum;
    }
    out
}
