use std::path::PathBuf;

/// Errors from loading batches, resolving models, or sampling logits.
#[derive(Debug, thiserror::Error)]
pub enum SamplingError {
    /// The model name is not in the catalog or registry.
    #[error("Unknown model: {0}")]
    UnknownModel(String),

    /// The same model was registered twice.
    #[error("Model registered twice: {0}")]
    DuplicateModel(String),

    /// A sampler was requested with `num_samples == 0`.
    #[error("num_samples must be positive")]
    ZeroSamples,

    /// Two batch dimensions that must agree do not.
    #[error("Batch size mismatch: expected {expected}, got {actual}")]
    BatchMismatch { expected: usize, actual: usize },

    /// Recorded logits have a different class count than the descriptor.
    #[error("Model {model}: descriptor has {expected} classes, recorded logits have {actual}")]
    ClassMismatch {
        model: String,
        expected: usize,
        actual: usize,
    },

    /// A serialized batch or logits record is malformed.
    #[error("Invalid record {path}: {reason}")]
    InvalidRecord { path: PathBuf, reason: String },

    /// Images and labels do not form a valid batch.
    #[error("Invalid batch: {0}")]
    InvalidBatch(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
