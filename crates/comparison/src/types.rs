//! Result types: per-model metric values, comparison tables, and long-form rows.

use std::collections::HashSet;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::error::EvalError;

/// One computed metric value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricValue {
    /// Metric name as registered in the suite.
    pub name: String,
    /// Scalar value.
    pub value: f64,
}

/// Metric values for a single model, in suite order.
///
/// Metric names are unique within a result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelResult {
    metrics: Vec<MetricValue>,
}

impl ModelResult {
    /// Build a result from `(name, value)` pairs, keeping their order.
    ///
    /// Fails with [`EvalError::DuplicateMetric`] if a name repeats.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self, EvalError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut result = Self::default();
        for (name, value) in pairs {
            let name = name.into();
            if result.get(&name).is_some() {
                return Err(EvalError::DuplicateMetric(name));
            }
            result.metrics.push(MetricValue { name, value });
        }
        Ok(result)
    }

    /// Value of the named metric, if present.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.metrics
            .iter()
            .find(|m| m.name == name)
            .map(|m| m.value)
    }

    /// Metric names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.metrics.iter().map(|m| m.name.as_str())
    }

    /// Iterate `(name, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.metrics.iter().map(|m| (m.name.as_str(), m.value))
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// First repeated metric name. Constructors never produce one, but
    /// deserialized results can.
    pub(crate) fn first_duplicate(&self) -> Option<&str> {
        let mut seen = HashSet::new();
        self.names().find(|name| !seen.insert(*name))
    }

    pub(crate) fn push_unchecked(&mut self, name: String, value: f64) {
        self.metrics.push(MetricValue { name, value });
    }
}

/// A [`ModelResult`] tagged with the model it was computed for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    /// Model identifier (e.g. `"RESNET_50"`).
    pub model: String,
    /// Metric values in the table's column order.
    pub metrics: ModelResult,
}

/// Rows = models, columns = metrics.
///
/// Every row carries exactly the metrics in `metric_names`, in that order.
/// Row order is evaluation order; the baseline model is listed first by
/// convention.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultsTable {
    pub(crate) metric_names: Vec<String>,
    pub(crate) rows: Vec<ResultRow>,
}

impl ResultsTable {
    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    /// Column order shared by all rows.
    pub fn metric_names(&self) -> &[String] {
        &self.metric_names
    }

    /// Model names in row order.
    pub fn models(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.model.as_str())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Value for a `(model, metric)` cell.
    pub fn get(&self, model: &str, metric: &str) -> Option<f64> {
        self.rows
            .iter()
            .find(|r| r.model == model)
            .and_then(|r| r.metrics.get(metric))
    }

    /// Rebuild a table from long-form rows.
    ///
    /// Models appear in order of first occurrence; each model's metrics keep
    /// their long-form order. The result goes through [`crate::compare`], so a
    /// ragged long form fails with [`EvalError::InconsistentMetricSet`].
    pub fn from_long_form(rows: &[LongFormRow]) -> Result<Self, EvalError> {
        if rows.is_empty() {
            return Ok(Self::default());
        }

        let mut grouped: Vec<(String, ModelResult)> = Vec::new();
        for row in rows {
            let idx = match grouped.iter().position(|(model, _)| *model == row.model) {
                Some(idx) => idx,
                None => {
                    grouped.push((row.model.clone(), ModelResult::default()));
                    grouped.len() - 1
                }
            };
            let result = &mut grouped[idx].1;
            if result.get(&row.metric).is_some() {
                return Err(EvalError::DuplicateMetric(format!(
                    "{}/{}",
                    row.model, row.metric
                )));
            }
            result.push_unchecked(row.metric.clone(), row.value);
        }

        crate::pipeline::compare(grouped)
    }
}

/// One `(model, metric, value)` observation, for grouped/faceted plotting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongFormRow {
    pub model: String,
    pub metric: String,
    pub value: f64,
}

impl LongFormRow {
    pub fn new(model: impl Into<String>, metric: impl Into<String>, value: f64) -> Self {
        Self {
            model: model.into(),
            metric: metric.into(),
            value,
        }
    }
}

/// Render a table as fixed-width text, one line per model.
pub fn render_table(table: &ResultsTable) -> String {
    let model_width = table
        .models()
        .map(str::len)
        .chain(std::iter::once("model".len()))
        .max()
        .unwrap_or(5);
    let widths: Vec<usize> = table
        .metric_names
        .iter()
        .map(|name| name.len().max(10))
        .collect();

    let mut out = String::new();
    let _ = write!(out, "{:<model_width$}", "model");
    for (name, &width) in table.metric_names.iter().zip(&widths) {
        let _ = write!(out, "  {name:>width$}");
    }
    out.push('\n');

    for row in &table.rows {
        let _ = write!(out, "{:<model_width$}", row.model);
        for ((_, value), &width) in row.metrics.iter().zip(&widths) {
            let _ = write!(out, "  {value:>width$.4}");
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(pairs: &[(&str, f64)]) -> ModelResult {
        ModelResult::from_pairs(pairs.iter().map(|(n, v)| (*n, *v))).unwrap()
    }

    #[test]
    fn test_model_result_keeps_order() {
        let r = result(&[("nll", 1.2), ("accuracy", 0.7)]);
        let names: Vec<&str> = r.names().collect();
        assert_eq!(names, vec!["nll", "accuracy"]);
        assert_eq!(r.get("accuracy"), Some(0.7));
        assert_eq!(r.get("ece"), None);
    }

    #[test]
    fn test_model_result_rejects_duplicates() {
        let err = ModelResult::from_pairs([("nll", 1.0), ("nll", 2.0)]).unwrap_err();
        assert!(matches!(err, EvalError::DuplicateMetric(ref n) if n == "nll"));
    }

    #[test]
    fn test_model_result_serializes_as_ordered_list() {
        let r = result(&[("accuracy", 0.5), ("nll", 1.5)]);
        let json = serde_json::to_string(&r).unwrap();
        assert_eq!(
            json,
            r#"[{"name":"accuracy","value":0.5},{"name":"nll","value":1.5}]"#
        );
        let loaded: ModelResult = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, r);
    }

    #[test]
    fn test_from_long_form_rebuilds_table() {
        let rows = vec![
            LongFormRow::new("resnet", "accuracy", 0.70),
            LongFormRow::new("resnet", "nll", 1.2),
            LongFormRow::new("epinet", "accuracy", 0.74),
            LongFormRow::new("epinet", "nll", 1.05),
        ];
        let table = ResultsTable::from_long_form(&rows).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.metric_names(), &["accuracy".to_string(), "nll".to_string()]);
        assert_eq!(table.models().collect::<Vec<_>>(), vec!["resnet", "epinet"]);
        assert_eq!(table.get("epinet", "nll"), Some(1.05));
        assert_eq!(table.get("resnet", "accuracy"), Some(0.70));
    }

    #[test]
    fn test_from_long_form_empty() {
        let table = ResultsTable::from_long_form(&[]).unwrap();
        assert!(table.is_empty());
        assert!(table.metric_names().is_empty());
    }

    #[test]
    fn test_from_long_form_ragged_fails() {
        let rows = vec![
            LongFormRow::new("resnet", "accuracy", 0.70),
            LongFormRow::new("resnet", "nll", 1.2),
            LongFormRow::new("epinet", "accuracy", 0.74),
        ];
        let err = ResultsTable::from_long_form(&rows).unwrap_err();
        assert!(matches!(err, EvalError::InconsistentMetricSet { ref model, .. } if model == "epinet"));
    }

    #[test]
    fn test_from_long_form_duplicate_cell_fails() {
        let rows = vec![
            LongFormRow::new("resnet", "accuracy", 0.70),
            LongFormRow::new("resnet", "accuracy", 0.71),
        ];
        let err = ResultsTable::from_long_form(&rows).unwrap_err();
        assert!(matches!(err, EvalError::DuplicateMetric(_)));
    }

    #[test]
    fn test_render_table_layout() {
        let rows = vec![
            LongFormRow::new("RESNET_50", "accuracy", 0.7),
            LongFormRow::new("RESNET_50", "nll", 1.2),
            LongFormRow::new("RESNET_50_FINAL_EPINET", "accuracy", 0.74),
            LongFormRow::new("RESNET_50_FINAL_EPINET", "nll", 1.05),
        ];
        let table = ResultsTable::from_long_form(&rows).unwrap();
        let text = render_table(&table);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("model"));
        assert!(lines[0].contains("accuracy"));
        assert!(lines[1].starts_with("RESNET_50 "));
        assert!(lines[1].contains("0.7000"));
        assert!(lines[2].contains("1.0500"));
    }
}
