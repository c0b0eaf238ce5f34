use std::error::Error;
use std::fmt;

/// Convenience alias for results of network operations.
pub type Result<T> = std::result::Result<T, NetworkError>;

/// An error type indicating misuse of a network:
/// invalid construction parameters, or data that
/// doesn't fit its topology.
///
/// None of these are ever corrected or retried
/// internally; the network is left untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkError {
    /// The layer sizes contain fewer than two layers,
    /// or a layer with no neurons.
    InvalidArchitecture(Vec<usize>),
    /// A hyperparameter is outside of its valid range.
    InvalidHyperparameters {
        name: &'static str,
        value: f32,
    },
    /// The input vector's length isn't the input layer's size.
    InputSizeMismatch {
        expected: usize,
        found: usize,
    },
    /// An expected output vector's length isn't the output layer's size.
    OutputSizeMismatch {
        expected: usize,
        found: usize,
    },
    /// Input and expected output batches have different lengths.
    BatchSizeMismatch {
        inputs: usize,
        expected_outputs: usize,
    },
    /// Flat parameters are inconsistent with their declared shapes.
    ShapeMismatch {
        context: ShapeContext,
        expected: usize,
        found: usize,
    },
}

/// The part of a flat parameter set
/// found to be inconsistent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeContext {
    /// Number of weight matrix shapes vs. layer transitions.
    WeightShapeCount,
    /// Row count of the weight matrix for the given transition.
    WeightRows(usize),
    /// Column count of the weight matrix for the given transition.
    WeightColumns(usize),
    /// Total number of flattened weights.
    WeightCount,
    /// Number of bias vector lengths vs. non-input layers.
    BiasShapeCount,
    /// Length of the bias vector of the given non-input layer.
    BiasLength(usize),
    /// Total number of flattened biases.
    BiasCount,
}

impl fmt::Display for ShapeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WeightShapeCount => write!(f, "weight matrix count"),
            Self::WeightRows(i) => write!(f, "row count of weight matrix {}", i),
            Self::WeightColumns(i) => write!(f, "column count of weight matrix {}", i),
            Self::WeightCount => write!(f, "flattened weight count"),
            Self::BiasShapeCount => write!(f, "bias vector count"),
            Self::BiasLength(i) => write!(f, "length of bias vector {}", i),
            Self::BiasCount => write!(f, "flattened bias count"),
        }
    }
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArchitecture(layer_sizes) => write!(
                f,
                "invalid layer sizes {:?}: at least 2 non-empty layers are required",
                layer_sizes
            ),
            Self::InvalidHyperparameters { name, value } => {
                write!(f, "hyperparameter {} has out-of-range value {}", name, value)
            }
            Self::InputSizeMismatch { expected, found } => write!(
                f,
                "input size mismatch: expected {}, got {}",
                expected, found
            ),
            Self::OutputSizeMismatch { expected, found } => write!(
                f,
                "expected output size mismatch: expected {}, got {}",
                expected, found
            ),
            Self::BatchSizeMismatch {
                inputs,
                expected_outputs,
            } => write!(
                f,
                "batch size mismatch: {} inputs for {} expected outputs",
                inputs, expected_outputs
            ),
            Self::ShapeMismatch {
                context,
                expected,
                found,
            } => write!(
                f,
                "shape mismatch in {}: expected {}, found {}",
                context, expected, found
            ),
        }
    }
}

impl Error for NetworkError {}
