//! Named, ordered collections of metric functions.

use burn::prelude::*;

use crate::error::EvalError;

/// A metric over sampled logits.
///
/// `logits` has shape `(num_samples, batch, num_classes)` and `labels` has
/// shape `(batch, 1)`. Implementations must be deterministic for identical
/// inputs, including any internal sampling across the sample axis.
pub trait MetricFn<B: Backend>: Send + Sync {
    /// Compute the scalar metric value.
    fn compute(&self, logits: &Tensor<B, 3>, labels: &Tensor<B, 2, Int>) -> anyhow::Result<f64>;
}

/// Adapter that lets a plain closure act as a [`MetricFn`].
struct FnMetric<F> {
    f: F,
}

impl<B, F> MetricFn<B> for FnMetric<F>
where
    B: Backend,
    F: Fn(&Tensor<B, 3>, &Tensor<B, 2, Int>) -> anyhow::Result<f64> + Send + Sync,
{
    fn compute(&self, logits: &Tensor<B, 3>, labels: &Tensor<B, 2, Int>) -> anyhow::Result<f64> {
        (self.f)(logits, labels)
    }
}

/// Ordered mapping from metric name to metric function.
///
/// Insertion order defines the column order of every result produced from
/// this suite.
pub struct MetricSuite<B: Backend> {
    metrics: Vec<(String, Box<dyn MetricFn<B>>)>,
}

impl<B: Backend> Default for MetricSuite<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> MetricSuite<B> {
    /// Create an empty suite.
    pub fn new() -> Self {
        Self {
            metrics: Vec::new(),
        }
    }

    /// Append a metric. Fails if `name` is already registered.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        metric: impl MetricFn<B> + 'static,
    ) -> Result<(), EvalError> {
        self.push(name.into(), Box::new(metric))
    }

    /// Append a closure as a metric. Fails if `name` is already registered.
    pub fn add_fn<F>(&mut self, name: impl Into<String>, f: F) -> Result<(), EvalError>
    where
        F: Fn(&Tensor<B, 3>, &Tensor<B, 2, Int>) -> anyhow::Result<f64> + Send + Sync + 'static,
    {
        self.push(name.into(), Box::new(FnMetric { f }))
    }

    /// Append an already boxed metric. Fails if `name` is already registered.
    pub fn push(&mut self, name: String, metric: Box<dyn MetricFn<B>>) -> Result<(), EvalError> {
        if self.metrics.iter().any(|(existing, _)| *existing == name) {
            return Err(EvalError::DuplicateMetric(name));
        }
        self.metrics.push((name, metric));
        Ok(())
    }

    /// Metric names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.metrics.iter().map(|(name, _)| name.as_str())
    }

    /// Iterate `(name, metric)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &dyn MetricFn<B>)> {
        self.metrics
            .iter()
            .map(|(name, metric)| (name.as_str(), metric.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}
