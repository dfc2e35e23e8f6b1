//! Errors raised while translating named einsum notation

use crate::symbols::ALPHABET;

/// Errors of parsing, compiling and materializing a named einsum expression
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed notation text
    #[error("Invalid named einsum at byte {position}: unexpected `{fragment}`")]
    Parse {
        /// Byte offset into the notation text
        position: usize,
        /// Text remaining at `position`, up to the end of the line
        fragment: String,
    },

    #[error(
        "Ambiguous shape was found for tensor {variable}: Multiple ellipses \"...\" were encountered"
    )]
    AmbiguousEllipses { variable: String },

    #[error(
        "Dimensionality for tensor \"{variable}\" differs from definition. Expected {declared} axes, found {found}."
    )]
    InconsistentShapeDefinition {
        variable: String,
        declared: usize,
        found: usize,
    },

    /// `axis` is either a named axis or a product expression like `i*j`
    #[error(
        "Axis \"{axis}\" has inconsistent sizes across tensors: found {expected}, {found} (in {})",
        .tensors.join(", ")
    )]
    InconsistentAxisSize {
        axis: String,
        expected: usize,
        found: usize,
        tensors: Vec<String>,
    },

    /// A product axis has two or more sub-axes whose sizes no tensor fixes
    #[error("Cannot determine the sizes of the sub-axes of product axis \"{axis}\"")]
    UnresolvedAxisSize { axis: String },

    #[error("Output axis {axis} not found in any input tensor.")]
    AxisNotFound { axis: String },

    #[error(
        "Axis {axis}, unique index {index}, exceeds available characters for einsum: {}",
        ALPHABET.len()
    )]
    TooManyAxes { axis: String, index: usize },

    #[error("Argument number mismatch: subscripts ({expected}), args ({found})")]
    OperandCountMismatch { expected: usize, found: usize },

    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),

    /// Failure reported by the contraction primitive
    #[error(transparent)]
    Contraction(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
