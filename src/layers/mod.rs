//! Network layers.

mod dense;

pub use self::dense::Dense;

/// A single trainable transformation in a feedforward network.
///
/// Layers cache the state of their most recent `forward` call, and
/// `backward_from_dz` and `activation_gradient` read that cache. A layer is
/// therefore not re-entrant: every backward step must be preceded by the
/// matching forward step on the same layer.
pub trait Layer {
    /// Returns the number of inputs to this layer.
    fn input_len(&self) -> usize;

    /// Returns the number of outputs from this layer.
    fn output_len(&self) -> usize;

    /// Feeds `input` forward through the layer, caching everything the
    /// backward step needs, and returns the activated output.
    fn forward(&mut self, input: &[f32]) -> &[f32];

    /// Returns the activated output of the most recent `forward` call.
    fn output(&self) -> &[f32];

    /// Applies one gradient descent step given `dz`, the loss gradient with
    /// respect to this layer's pre-activation.
    ///
    /// Returns the gradient with respect to the layer's input, computed with
    /// the weights as they were before this step.
    fn backward_from_dz(&mut self, dz: &[f32], learning_rate: f32) -> Vec<f32>;

    /// Turns a gradient with respect to this layer's output into one with
    /// respect to its pre-activation, using the cached pre-activation.
    fn activation_gradient(&self, grad: &mut [f32]);
}
