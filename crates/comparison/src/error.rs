/// Errors raised while evaluating models or assembling comparison tables.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    /// Logits and labels disagree on the batch dimension, or labels are not `[batch, 1]`.
    #[error("Shape mismatch: logits {logits:?} (samples, batch, classes) vs labels {labels:?} (batch, 1)")]
    ShapeMismatch { logits: [usize; 3], labels: [usize; 2] },

    /// Logits have a zero-sized sample, batch or class dimension.
    #[error("Empty logits tensor: shape {shape:?}")]
    EmptyLogits { shape: [usize; 3] },

    /// A label is not a valid class index.
    #[error("Label {label} at row {row} is outside [0, {num_classes})")]
    LabelOutOfRange {
        row: usize,
        label: i64,
        num_classes: usize,
    },

    /// A metric function failed. Carries the offending metric name.
    #[error("Metric '{metric}' failed: {source}")]
    MetricComputation {
        metric: String,
        #[source]
        source: anyhow::Error,
    },

    /// Model results in one comparison do not share the same metric names.
    #[error("Inconsistent metric set for model '{model}': expected {expected:?}, got {actual:?}")]
    InconsistentMetricSet {
        model: String,
        expected: Vec<String>,
        actual: Vec<String>,
    },

    /// `evaluate` was called with no metrics.
    #[error("Metric suite is empty")]
    EmptySuite,

    /// `compare` was called with no model results.
    #[error("No model results to compare")]
    EmptyComparison,

    /// The same metric name was registered twice in a suite or result.
    #[error("Duplicate metric name '{0}'")]
    DuplicateMetric(String),

    /// The same model name appears twice in one comparison.
    #[error("Duplicate model name '{0}'")]
    DuplicateModel(String),
}
