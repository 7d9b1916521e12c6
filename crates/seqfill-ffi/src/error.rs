//! Error taxonomy for the binding layer.

use thiserror::Error;

/// Errors surfaced by the binding wrappers and the library loader.
///
/// Every operation is a single deterministic pass: failures propagate
/// straight to the caller and nothing is retried or recovered locally.
#[derive(Debug, Error)]
pub enum FfiError {
    /// The input value cannot be interpreted as numeric data.
    #[error("type conversion: {0}")]
    TypeConversion(String),

    /// The input's dimensionality does not match the entry point (a
    /// matrix handed to the 1-D path, or vice versa).
    #[error("shape mismatch: expected {expected} dimension(s), got {got}")]
    ShapeMismatch { expected: usize, got: usize },

    /// The shared library or a required symbol could not be resolved.
    /// Surfaced immediately and fatal for the call.
    #[error("native load: {0}")]
    NativeLoad(String),

    /// A declared signature is malformed or disagrees with the entry
    /// point it describes.
    #[error("signature: {0}")]
    Signature(String),
}
