//! Evaluation and comparison: logits → per-model results → table → long form.

use std::collections::HashSet;

use burn::prelude::*;

use crate::error::EvalError;
use crate::suite::MetricSuite;
use crate::types::{LongFormRow, ModelResult, ResultRow, ResultsTable};

/// Evaluate every metric in `suite` on one model's sampled logits.
///
/// `logits` has shape `(samples, batch, classes)` and `labels` has shape
/// `(batch, 1)`. Shapes and label ranges are checked before any metric
/// runs. Metrics run in suite order and the first failure is returned as
/// [`EvalError::MetricComputation`].
pub fn evaluate<B: Backend>(
    logits: &Tensor<B, 3>,
    labels: &Tensor<B, 2, Int>,
    suite: &MetricSuite<B>,
) -> Result<ModelResult, EvalError> {
    if suite.is_empty() {
        return Err(EvalError::EmptySuite);
    }

    let logits_shape = logits.dims();
    let labels_shape = labels.dims();
    let [num_samples, batch_size, num_classes] = logits_shape;

    if labels_shape[0] != batch_size || labels_shape[1] != 1 {
        return Err(EvalError::ShapeMismatch {
            logits: logits_shape,
            labels: labels_shape,
        });
    }
    if num_samples == 0 || batch_size == 0 || num_classes == 0 {
        return Err(EvalError::EmptyLogits {
            shape: logits_shape,
        });
    }
    check_label_range(labels, num_classes)?;

    let mut result = ModelResult::default();
    for (name, metric) in suite.iter() {
        let value = metric
            .compute(logits, labels)
            .map_err(|source| EvalError::MetricComputation {
                metric: name.to_string(),
                source,
            })?;
        if !value.is_finite() {
            tracing::warn!(metric = name, value, "Metric is not finite");
        }
        tracing::debug!(metric = name, value, "Computed metric");
        result.push_unchecked(name.to_string(), value);
    }

    tracing::debug!(
        samples = num_samples,
        batch = batch_size,
        classes = num_classes,
        metrics = result.len(),
        "Evaluated logits"
    );

    Ok(result)
}

fn check_label_range<B: Backend>(
    labels: &Tensor<B, 2, Int>,
    num_classes: usize,
) -> Result<(), EvalError> {
    let data = labels.clone().into_data();
    for (row, label) in data.iter::<i64>().enumerate() {
        if label < 0 || label as usize >= num_classes {
            return Err(EvalError::LabelOutOfRange {
                row,
                label,
                num_classes,
            });
        }
    }
    Ok(())
}

/// Combine per-model results into one table.
///
/// Row order is input order. Every result must carry the same set of metric
/// names as the first one; rows listing them in a different order are
/// re-ordered to the first row's column order.
pub fn compare<I, S>(results: I) -> Result<ResultsTable, EvalError>
where
    I: IntoIterator<Item = (S, ModelResult)>,
    S: Into<String>,
{
    let mut metric_names: Option<Vec<String>> = None;
    let mut seen_models = HashSet::new();
    let mut rows = Vec::new();

    for (model, result) in results {
        let model = model.into();
        if !seen_models.insert(model.clone()) {
            return Err(EvalError::DuplicateModel(model));
        }
        if let Some(dup) = result.first_duplicate() {
            return Err(EvalError::DuplicateMetric(dup.to_string()));
        }

        let metrics = match &metric_names {
            None => {
                metric_names = Some(result.names().map(String::from).collect());
                result
            }
            Some(expected) => align_to_columns(&model, expected, result)?,
        };
        rows.push(ResultRow { model, metrics });
    }

    let metric_names = metric_names.ok_or(EvalError::EmptyComparison)?;
    tracing::debug!(
        models = rows.len(),
        metrics = metric_names.len(),
        "Built results table"
    );
    Ok(ResultsTable { metric_names, rows })
}

fn align_to_columns(
    model: &str,
    expected: &[String],
    result: ModelResult,
) -> Result<ModelResult, EvalError> {
    let same_set =
        result.len() == expected.len() && expected.iter().all(|name| result.get(name).is_some());
    if !same_set {
        return Err(EvalError::InconsistentMetricSet {
            model: model.to_string(),
            expected: expected.to_vec(),
            actual: result.names().map(String::from).collect(),
        });
    }

    if result.names().eq(expected.iter().map(String::as_str)) {
        return Ok(result);
    }

    let mut aligned = ModelResult::default();
    for name in expected {
        if let Some(value) = result.get(name) {
            aligned.push_unchecked(name.clone(), value);
        }
    }
    Ok(aligned)
}

/// Melt a table into one row per `(model, metric)` cell.
///
/// Rows follow table order, then column order. An empty table yields an
/// empty vector.
pub fn to_long_form(table: &ResultsTable) -> Vec<LongFormRow> {
    let mut rows = Vec::with_capacity(table.len() * table.metric_names().len());
    for row in table.rows() {
        for (metric, value) in row.metrics.iter() {
            rows.push(LongFormRow::new(row.model.as_str(), metric, value));
        }
    }
    rows
}
