//! Metrics for classifiers with epistemic samples.
//!
//! Calculators take sampled logits of shape `(samples, batch, classes)` and
//! labels of shape `(batch, 1)` and return a scalar. Marginal metrics
//! (accuracy, NLL, calibration) average over samples first; joint metrics
//! score groups of inputs per sample.

pub mod calculators;
pub mod config;
pub mod error;
pub mod probs;

pub use calculators::{Accuracy, CalibrationError, FullBatchJointNll, JointNll, MarginalNll};
pub use config::{build_suite, default_suite, default_specs, MetricSpec};
pub use error::MetricConfigError;
