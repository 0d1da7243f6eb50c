//! Errors surfaced to callers of the library.
//!
//! Shape mismatches inside the numeric primitives are programming errors and
//! panic instead; everything that depends on user-provided data or
//! configuration ends up here.

use std::io;

use thiserror::Error;

/// The error type for network construction, training and dataset handling.
#[derive(Debug, Error)]
pub enum Error {
    /// A network needs at least an input and an output layer.
    #[error("a network needs at least 2 layer sizes, got {0}")]
    TooFewLayers(usize),
    /// One of the requested layer widths was zero.
    #[error("layer {0} has zero width")]
    EmptyLayer(usize),
    /// Feature and label matrices are not row-aligned.
    #[error("features have {features} rows but labels have {labels}")]
    RowMismatch { features: usize, labels: usize },
    /// The dataset does not fit the network it is fed to.
    #[error("dataset has {found} {what} columns, network expects {expected}")]
    DatasetShape {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("dataset is empty")]
    EmptyDataset,
    /// More examples were requested from a split than are available.
    #[error("requested {requested} examples but only {available} are available")]
    SplitTooLarge { requested: usize, available: usize },
    #[error("invalid feature value {value:?} on line {line}")]
    ParseFeature { line: u64, value: String },
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    /// Features can only be scaled by a positive, finite divisor.
    #[error("feature scale must be positive and finite, got {0}")]
    FeatureScale(f32),
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// A specialized `Result` for this crate.
pub type Result<T> = std::result::Result<T, Error>;
