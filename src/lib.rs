//! A small feedforward neural network classifier trained with stochastic
//! gradient descent.
//!
//! Networks, layers and their forward caches are not re-entrant: a `Network`
//! must process one example at a time and is not thread-safe without
//! external synchronization.

#[macro_use]
extern crate serde_derive;

pub mod activator;
pub mod config;
pub mod dataset;
pub mod error;
pub mod feed_forward;
pub mod layers;
pub mod matrix;
pub mod trainer;
pub mod vector;

mod utils;

pub use crate::dataset::Dataset;
pub use crate::error::{Error, Result};
pub use crate::feed_forward::Network;
