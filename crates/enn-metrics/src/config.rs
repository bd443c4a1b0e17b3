//! Metric suite configuration, deserialized from the `[[metrics]]` TOML tables.

use burn::prelude::*;
use serde::{Deserialize, Serialize};

use comparison::{MetricFn, MetricSuite};

use crate::calculators::{Accuracy, CalibrationError, FullBatchJointNll, JointNll, MarginalNll};
use crate::error::MetricConfigError;

/// One configured metric. `name` overrides the default column name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MetricSpec {
    Accuracy {
        name: Option<String>,
    },
    /// Marginal negative log-likelihood.
    Nll {
        name: Option<String>,
    },
    /// Polyadic joint negative log-likelihood.
    JointNll {
        name: Option<String>,
        #[serde(default = "default_tau")]
        tau: usize,
        #[serde(default = "default_kappa")]
        kappa: usize,
        #[serde(default = "default_num_groups")]
        num_groups: usize,
        #[serde(default)]
        seed: u64,
    },
    FullBatchJointNll {
        name: Option<String>,
    },
    /// Expected calibration error.
    Ece {
        name: Option<String>,
        #[serde(default = "default_num_bins")]
        num_bins: usize,
    },
}

fn default_tau() -> usize {
    10
}
fn default_kappa() -> usize {
    2
}
fn default_num_groups() -> usize {
    1000
}
fn default_num_bins() -> usize {
    10
}

impl MetricSpec {
    /// Column name used in results tables.
    pub fn column_name(&self) -> &str {
        let (custom, default) = match self {
            Self::Accuracy { name } => (name, "accuracy"),
            Self::Nll { name } => (name, "nll"),
            Self::JointNll { name, .. } => (name, "joint_nll"),
            Self::FullBatchJointNll { name } => (name, "joint_nll_full"),
            Self::Ece { name, .. } => (name, "ece"),
        };
        custom.as_deref().unwrap_or(default)
    }

    /// Instantiate the calculator.
    pub fn build<B: Backend>(&self) -> Result<Box<dyn MetricFn<B>>, MetricConfigError> {
        let metric: Box<dyn MetricFn<B>> = match self {
            Self::Accuracy { .. } => Box::new(Accuracy),
            Self::Nll { .. } => Box::new(MarginalNll),
            Self::JointNll {
                tau,
                kappa,
                num_groups,
                seed,
                ..
            } => Box::new(JointNll::new(*tau, *kappa, *num_groups, *seed)?),
            Self::FullBatchJointNll { .. } => Box::new(FullBatchJointNll),
            Self::Ece { num_bins, .. } => Box::new(CalibrationError::new(*num_bins)?),
        };
        Ok(metric)
    }
}

/// Accuracy, marginal NLL and joint NLL, in that order.
pub fn default_specs() -> Vec<MetricSpec> {
    vec![
        MetricSpec::Accuracy { name: None },
        MetricSpec::Nll { name: None },
        MetricSpec::JointNll {
            name: None,
            tau: default_tau(),
            kappa: default_kappa(),
            num_groups: default_num_groups(),
            seed: 0,
        },
    ]
}

/// Build a suite from specs, keeping their order.
pub fn build_suite<B: Backend>(specs: &[MetricSpec]) -> Result<MetricSuite<B>, MetricConfigError> {
    let mut suite = MetricSuite::new();
    for spec in specs {
        suite.push(spec.column_name().to_string(), spec.build::<B>()?)?;
    }
    tracing::debug!(
        metrics = ?suite.names().collect::<Vec<_>>(),
        "Built metric suite"
    );
    Ok(suite)
}

/// The suite of [`default_specs`].
pub fn default_suite<B: Backend>() -> Result<MetricSuite<B>, MetricConfigError> {
    build_suite(&default_specs())
}
