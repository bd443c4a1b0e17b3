//! Evaluation pipeline behind the CLI subcommands.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use burn::backend::ndarray::{NdArray, NdArrayDevice};
use burn::prelude::*;
use indicatif::{ProgressBar, ProgressStyle};

use comparison::{
    compare, evaluate, render_table, to_long_form, write_long_form_json, LongFormReader,
    LongFormRow, LongFormWriter, MetricSuite, ModelResult, ResultsTable,
};
use enn_metrics::build_suite;
use sampling::{
    BatchLoader, CheckpointDescriptor, EvaluationBatch, JsonBatchLoader, ModelRegistry,
    RecordedSamplerFactory, SamplerFactory,
};

use crate::config::{apply_overrides, load_eval_toml};
use crate::results::ComparisonReport;

type CliBackend = NdArray<f32>;

/// Arguments for the `run` subcommand.
#[derive(Debug)]
pub struct RunArgs {
    /// Path to the eval config TOML file.
    pub config: PathBuf,
    /// Optional CLI override for the number of epistemic samples.
    pub num_samples: Option<usize>,
    /// Optional CLI override for the sampler seed.
    pub seed: Option<u64>,
    /// Where to write the long-form table (`.parquet` or `.json`).
    pub long_form: Option<PathBuf>,
    /// Where to write the JSON report.
    pub report: Option<PathBuf>,
}

/// Arguments for the `show` subcommand.
#[derive(Debug)]
pub struct ShowArgs {
    /// Path to a long-form Parquet file.
    pub input: PathBuf,
    /// Print the table as JSON instead of text.
    pub json: bool,
}

/// Arguments for the `compare` subcommand.
#[derive(Debug)]
pub struct CompareArgs {
    /// Saved reports, merged in order.
    pub reports: Vec<PathBuf>,
    /// Optional path for the merged long-form table.
    pub long_form: Option<PathBuf>,
}

/// Evaluate every configured model and print the comparison table.
pub fn run_eval(args: RunArgs) -> anyhow::Result<()> {
    let start = Instant::now();

    // 1. Load config
    let toml = load_eval_toml(&args.config)?;
    let section = apply_overrides(&toml.eval, args.num_samples, args.seed);
    anyhow::ensure!(section.num_samples > 0, "num_samples must be positive");
    let registry = toml.registry()?;
    anyhow::ensure!(
        !registry.is_empty(),
        "No [[models]] configured in {}",
        args.config.display()
    );

    // 2. Load batch
    let device = NdArrayDevice::default();
    let batch: EvaluationBatch<CliBackend> = JsonBatchLoader::new(&section.batch).load(&device)?;

    // 3. Build metric suite
    let suite = build_suite::<CliBackend>(&toml.metrics)?;

    // 4. Sample and evaluate
    let factory = RecordedSamplerFactory::<CliBackend>::new(device);
    let results = evaluate_models(
        &registry,
        &factory,
        &batch,
        &suite,
        section.num_samples,
        section.seed,
    )?;
    let evaluated = results.len();
    let table = compare(results).context("No model could be evaluated")?;

    // 5. Print table
    println!("{}", render_table(&table));

    // 6. Write outputs
    if let Some(path) = &args.long_form {
        write_long_form(path, to_long_form(&table))?;
    }
    if let Some(path) = &args.report {
        ComparisonReport::new(section.num_samples, section.seed, &section.batch, table)
            .save(path)?;
        tracing::info!(path = %path.display(), "Wrote report");
    }

    // 7. Print summary
    println!("--- Evaluation Summary ---");
    println!("Models: {evaluated}/{}", registry.len());
    println!("Samples: {}", section.num_samples);
    println!("Seed: {}", section.seed);
    println!("Elapsed: {:.1}s", start.elapsed().as_secs_f64());

    Ok(())
}

/// Evaluate each registered model on `batch`, in registry order.
///
/// A model whose sampler or evaluation fails is logged and skipped; the
/// remaining models still run.
pub fn evaluate_models<B: Backend>(
    registry: &ModelRegistry,
    factory: &dyn SamplerFactory<B>,
    batch: &EvaluationBatch<B>,
    suite: &MetricSuite<B>,
    num_samples: usize,
    seed: u64,
) -> anyhow::Result<Vec<(String, ModelResult)>> {
    let pb = ProgressBar::new(registry.len() as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )?
        .progress_chars("=> "),
    );

    let mut results = Vec::with_capacity(registry.len());
    for descriptor in registry.iter() {
        let model = descriptor.name.to_string();
        pb.set_message(model.clone());

        match evaluate_one(descriptor, factory, batch, suite, num_samples, seed) {
            Ok(result) => {
                tracing::info!(
                    model = %model,
                    metrics = ?result.iter().collect::<Vec<_>>(),
                    "Evaluated model"
                );
                results.push((model, result));
            }
            Err(e) => {
                tracing::warn!(model = %model, error = %format!("{e:#}"), "Evaluation failed, skipping");
            }
        }
        pb.inc(1);
    }
    pb.finish_with_message("done");

    Ok(results)
}

fn evaluate_one<B: Backend>(
    descriptor: &CheckpointDescriptor,
    factory: &dyn SamplerFactory<B>,
    batch: &EvaluationBatch<B>,
    suite: &MetricSuite<B>,
    num_samples: usize,
    seed: u64,
) -> anyhow::Result<ModelResult> {
    let sampler = factory.make_sampler(descriptor, num_samples)?;
    let logits = sampler.sample(&batch.images, seed)?;
    tracing::debug!(model = %descriptor.name, shape = ?logits.dims(), "Sampled logits");
    Ok(evaluate(&logits, &batch.labels, suite)?)
}

/// Write long-form rows as JSON when `path` ends in `.json`, Parquet otherwise.
fn write_long_form(path: &Path, rows: Vec<LongFormRow>) -> anyhow::Result<()> {
    if path.extension().is_some_and(|ext| ext == "json") {
        write_long_form_json(path, &rows)?;
    } else {
        let mut writer = LongFormWriter::new(path.to_path_buf());
        writer.record_all(rows);
        writer.finish()?;
    }
    Ok(())
}

/// Print a results table rebuilt from a long-form Parquet file.
pub fn run_show(args: ShowArgs) -> anyhow::Result<()> {
    let table = LongFormReader::read_table(&args.input)?;
    print_table(&table, args.json)?;
    if !args.json {
        println!("File: {}", args.input.display());
        println!("Models: {}", table.len());
        println!("Metrics: {}", table.metric_names().len());
    }
    Ok(())
}

/// Merge saved reports in order and compare their models.
pub fn run_compare(args: CompareArgs) -> anyhow::Result<()> {
    let mut results = Vec::new();
    for path in &args.reports {
        let report = ComparisonReport::load(path)?;
        tracing::info!(
            path = %path.display(),
            models = report.table.len(),
            num_samples = report.num_samples,
            "Loaded report"
        );
        results.extend(report.model_results());
    }

    let table = compare(results)?;
    print_table(&table, false)?;
    if let Some(path) = &args.long_form {
        write_long_form(path, to_long_form(&table))?;
    }
    Ok(())
}

fn print_table(table: &ResultsTable, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(table)?);
    } else {
        println!("{}", render_table(table));
    }
    Ok(())
}
