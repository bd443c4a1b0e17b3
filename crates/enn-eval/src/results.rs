//! Saved comparison reports.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context;
use comparison::{ModelResult, ResultsTable};
use serde::{Deserialize, Serialize};

/// Results of one `run`, written as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// Epistemic samples drawn per model.
    pub num_samples: usize,
    /// Seed passed to every sampler.
    pub seed: u64,
    /// Path of the evaluation batch.
    pub batch: String,
    /// Unix epoch milliseconds when the report was created.
    pub created_at_ms: u64,
    /// Rows = models, columns = metrics.
    pub table: ResultsTable,
}

impl ComparisonReport {
    pub fn new(num_samples: usize, seed: u64, batch: &Path, table: ResultsTable) -> Self {
        Self {
            num_samples,
            seed,
            batch: batch.display().to_string(),
            created_at_ms: now_ms(),
            table,
        }
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
        Ok(())
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read report {}", path.display()))?;
        let report = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse report {}", path.display()))?;
        Ok(report)
    }

    /// `(model, result)` pairs in table row order, ready for `compare`.
    pub fn model_results(&self) -> impl Iterator<Item = (String, ModelResult)> + '_ {
        self.table
            .rows()
            .iter()
            .map(|row| (row.model.clone(), row.metrics.clone()))
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
