//! Writes long-form comparison rows to Parquet (for plotting) and JSON.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use arrow::array::{Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use crate::types::LongFormRow;

/// Arrow schema for long-form Parquet files: `model`, `metric`, `value`.
pub fn long_form_schema() -> Schema {
    Schema::new(vec![
        Field::new("model", DataType::Utf8, false),
        Field::new("metric", DataType::Utf8, false),
        Field::new("value", DataType::Float64, false),
    ])
}

/// Buffers long-form rows and writes them to a Parquet file.
pub struct LongFormWriter {
    rows: Vec<LongFormRow>,
    output_path: PathBuf,
}

impl LongFormWriter {
    pub fn new(output_path: PathBuf) -> Self {
        Self {
            rows: Vec::new(),
            output_path,
        }
    }

    pub fn record(&mut self, row: LongFormRow) {
        self.rows.push(row);
    }

    pub fn record_all(&mut self, rows: Vec<LongFormRow>) {
        self.rows.extend(rows);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Write all buffered rows and return the output path.
    pub fn finish(self) -> anyhow::Result<PathBuf> {
        let schema = Arc::new(long_form_schema());

        let batch = if self.rows.is_empty() {
            RecordBatch::new_empty(schema.clone())
        } else {
            build_record_batch(&self.rows)?
        };

        create_parent_dir(&self.output_path)?;
        let file = std::fs::File::create(&self.output_path)
            .with_context(|| format!("creating {}", self.output_path.display()))?;
        let mut writer = ArrowWriter::try_new(file, schema, None)?;
        writer.write(&batch)?;
        writer.close()?;

        tracing::info!(
            rows = self.rows.len(),
            path = %self.output_path.display(),
            "Wrote long-form Parquet file"
        );

        Ok(self.output_path)
    }
}

fn build_record_batch(rows: &[LongFormRow]) -> anyhow::Result<RecordBatch> {
    let schema = Arc::new(long_form_schema());

    let models: StringArray = rows.iter().map(|r| Some(r.model.as_str())).collect();
    let metrics: StringArray = rows.iter().map(|r| Some(r.metric.as_str())).collect();
    let values: Float64Array = rows.iter().map(|r| Some(r.value)).collect();

    let columns: Vec<Arc<dyn arrow::array::Array>> =
        vec![Arc::new(models), Arc::new(metrics), Arc::new(values)];

    Ok(RecordBatch::try_new(schema, columns)?)
}

fn create_parent_dir(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    Ok(())
}

/// Write long-form rows as a pretty-printed JSON array.
pub fn write_long_form_json(path: &Path, rows: &[LongFormRow]) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(rows)?;
    create_parent_dir(path)?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(rows = rows.len(), path = %path.display(), "Wrote long-form JSON file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_long_form_schema_columns() {
        let schema = long_form_schema();
        assert_eq!(schema.fields().len(), 3);
        assert_eq!(schema.field(0).name(), "model");
        assert_eq!(schema.field(1).name(), "metric");
        assert_eq!(schema.field(2).name(), "value");
        assert!(!schema.field(2).is_nullable());
    }

    #[test]
    fn test_write_empty_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("empty.parquet");
        let writer = LongFormWriter::new(path.clone());
        assert!(writer.is_empty());
        let written = writer.finish().unwrap();
        assert_eq!(written, path);
        assert!(path.exists());
    }

    #[test]
    fn test_write_rows() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("long.parquet");
        let mut writer = LongFormWriter::new(path.clone());
        writer.record(LongFormRow::new("resnet", "accuracy", 0.7));
        writer.record_all(vec![
            LongFormRow::new("resnet", "nll", 1.2),
            LongFormRow::new("epinet", "accuracy", 0.74),
        ]);
        assert_eq!(writer.len(), 3);

        let written = writer.finish().unwrap();
        assert!(std::fs::metadata(&written).unwrap().len() > 0);
    }

    #[test]
    fn test_write_json() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("long.json");
        let rows = vec![LongFormRow::new("resnet", "nll", 1.2)];
        write_long_form_json(&path, &rows).unwrap();

        let loaded: Vec<LongFormRow> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded, rows);
    }
}
