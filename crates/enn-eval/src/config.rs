//! TOML config loading for the evaluation CLI.
//!
//! Deserializes `configs/eval.toml`, which has an `[eval]` section, one
//! `[[models]]` table per model and optional `[[metrics]]` tables, then merges
//! with CLI overrides.

use std::path::{Path, PathBuf};

use anyhow::Context;
use enn_metrics::{default_specs, MetricSpec};
use sampling::{CheckpointDescriptor, ModelRegistry};
use serde::Deserialize;

/// Top-level structure matching `configs/eval.toml`.
#[derive(Debug, Deserialize)]
pub struct EvalToml {
    pub eval: EvalSection,
    /// Models to evaluate, in table row order. The baseline goes first.
    #[serde(default)]
    pub models: Vec<CheckpointDescriptor>,
    /// Metric columns, in order.
    #[serde(default = "default_specs")]
    pub metrics: Vec<MetricSpec>,
    /// Directory relative paths resolve against. Empty until loaded from disk.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// Run-wide evaluation parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct EvalSection {
    /// Serialized evaluation batch.
    pub batch: PathBuf,
    /// Epistemic samples per model.
    #[serde(default = "default_num_samples")]
    pub num_samples: usize,
    /// Seed passed to every sampler.
    #[serde(default)]
    pub seed: u64,
}

fn default_num_samples() -> usize {
    1000
}

impl EvalToml {
    /// Resolve the batch path against `base` and keep `base` for the
    /// registry's logits paths.
    pub fn with_base_dir(mut self, base: &Path) -> Self {
        if self.eval.batch.is_relative() {
            self.eval.batch = base.join(&self.eval.batch);
        }
        self.base_dir = base.to_path_buf();
        self
    }

    /// Model registry in config order, logits resolved against the config
    /// directory. Fails on a repeated model.
    pub fn registry(&self) -> anyhow::Result<ModelRegistry> {
        Ok(ModelRegistry::new(self.models.clone())?.with_base_dir(&self.base_dir))
    }
}

/// Load and deserialize an `EvalToml`, resolving relative paths against the
/// config file's directory.
pub fn load_eval_toml(path: &Path) -> anyhow::Result<EvalToml> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config: EvalToml = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config {}", path.display()))?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    tracing::info!(
        path = %path.display(),
        models = config.models.len(),
        metrics = config.metrics.len(),
        "Loaded eval config"
    );
    Ok(config.with_base_dir(base))
}

/// Apply CLI overrides.
///
/// Priority chain: serde defaults < TOML values < CLI `--num-samples` / `--seed`.
pub fn apply_overrides(
    section: &EvalSection,
    num_samples_cli: Option<usize>,
    seed_cli: Option<u64>,
) -> EvalSection {
    let mut section = section.clone();
    if let Some(n) = num_samples_cli {
        section.num_samples = n;
    }
    if let Some(s) = seed_cli {
        section.seed = s;
    }
    section
}
