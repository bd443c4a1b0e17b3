//! Reads long-form comparison rows back from Parquet.

use std::path::Path;

use anyhow::Context;
use arrow::array::{Array, Float64Array, StringArray};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::types::{LongFormRow, ResultsTable};
use crate::writer::long_form_schema;

/// Static methods for reading long-form Parquet files.
pub struct LongFormReader;

impl LongFormReader {
    /// Read all rows, in file order.
    pub fn read_all(path: &Path) -> anyhow::Result<Vec<LongFormRow>> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("opening {}", path.display()))?;
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

        let mut rows = Vec::new();
        for batch_result in reader {
            let batch = batch_result?;
            rows.extend(extract_rows_from_batch(&batch)?);
        }

        tracing::debug!(count = rows.len(), path = %path.display(), "Read long-form rows");
        Ok(rows)
    }

    /// Read a long-form file and pivot it back into a results table.
    pub fn read_table(path: &Path) -> anyhow::Result<ResultsTable> {
        let rows = Self::read_all(path)?;
        Ok(ResultsTable::from_long_form(&rows)?)
    }
}

/// Columns must match [`long_form_schema`] by name and type, and hold no nulls.
/// Nullability flags in the file are ignored.
fn check_batch(batch: &RecordBatch) -> anyhow::Result<()> {
    let expected = long_form_schema();
    let schema = batch.schema();
    anyhow::ensure!(
        schema.fields().len() == expected.fields().len(),
        "Expected {} columns (model, metric, value), found {}",
        expected.fields().len(),
        schema.fields().len()
    );
    for (i, (want, found)) in expected.fields().iter().zip(schema.fields().iter()).enumerate() {
        anyhow::ensure!(
            want.name() == found.name() && want.data_type() == found.data_type(),
            "Column {i} is {} ({}), expected {} ({})",
            found.name(),
            found.data_type(),
            want.name(),
            want.data_type()
        );
        let nulls = batch.column(i).null_count();
        anyhow::ensure!(nulls == 0, "Column {} has {nulls} null values", want.name());
    }
    Ok(())
}

fn extract_rows_from_batch(batch: &RecordBatch) -> anyhow::Result<Vec<LongFormRow>> {
    check_batch(batch)?;

    let models = batch
        .column(0)
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| anyhow::anyhow!("Column 0 (model) is not StringArray"))?;

    let metrics = batch
        .column(1)
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| anyhow::anyhow!("Column 1 (metric) is not StringArray"))?;

    let values = batch
        .column(2)
        .as_any()
        .downcast_ref::<Float64Array>()
        .ok_or_else(|| anyhow::anyhow!("Column 2 (value) is not Float64Array"))?;

    Ok((0..batch.num_rows())
        .map(|i| LongFormRow {
            model: models.value(i).to_string(),
            metric: metrics.value(i).to_string(),
            value: values.value(i),
        })
        .collect())
}
