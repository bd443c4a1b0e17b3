use comparison::EvalError;

/// Errors from building metric calculators or suites.
#[derive(Debug, thiserror::Error)]
pub enum MetricConfigError {
    /// A calculator parameter is out of range.
    #[error("Invalid parameter for metric '{metric}': {reason}")]
    InvalidParameter { metric: String, reason: String },

    /// The suite rejected a metric (e.g. duplicate column name).
    #[error(transparent)]
    Suite(#[from] EvalError),
}
