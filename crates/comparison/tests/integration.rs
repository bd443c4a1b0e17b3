//! Integration tests for the comparison crate.
//!
//! These test full pipelines: evaluate → compare → long form → Parquet →
//! table rebuilt from disk.

use burn::backend::ndarray::NdArray;
use burn::prelude::*;
use burn::tensor::activation::softmax;
use comparison::{
    compare, evaluate, render_table, to_long_form, LongFormReader, LongFormWriter, MetricSuite,
    ResultsTable,
};
use tempfile::TempDir;

type TestBackend = NdArray<f32>;

fn suite() -> MetricSuite<TestBackend> {
    let mut suite = MetricSuite::new();
    suite
        .add_fn("top1", |logits: &Tensor<TestBackend, 3>, labels: &Tensor<TestBackend, 2, Int>| {
            let [_, batch, classes] = logits.dims();
            let probs = softmax(logits.clone(), 2).mean_dim(0).reshape([batch, classes]);
            let hits = probs.argmax(1).equal(labels.clone()).int().float().mean();
            Ok(hits.into_scalar().elem::<f64>())
        })
        .unwrap();
    suite
        .add_fn("num_samples", |logits: &Tensor<TestBackend, 3>, _: &Tensor<TestBackend, 2, Int>| {
            Ok(logits.dims()[0] as f64)
        })
        .unwrap();
    suite
}

fn logits(values: Vec<f32>, shape: [usize; 3]) -> Tensor<TestBackend, 3> {
    Tensor::from_data(TensorData::new(values, shape), &Default::default())
}

fn labels(values: &[i64]) -> Tensor<TestBackend, 2, Int> {
    Tensor::from_data(
        TensorData::new(values.to_vec(), [values.len(), 1]),
        &Default::default(),
    )
}

/// Two models through the whole pipeline and back from Parquet.
#[test]
fn test_table_roundtrip_through_parquet() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("long_form.parquet");
    let suite = suite();
    let y = labels(&[0, 1]);

    let baseline = evaluate(&logits(vec![3.0, 0.0, 3.0, 0.0], [1, 2, 2]), &y, &suite).unwrap();
    let epinet = evaluate(
        &logits(
            vec![
                3.0, 0.0, 0.0, 3.0, // sample 0
                3.0, 0.0, 0.0, 3.0, // sample 1
                3.0, 0.0, 0.0, 3.0, // sample 2
            ],
            [3, 2, 2],
        ),
        &y,
        &suite,
    )
    .unwrap();

    let table = compare(vec![
        ("RESNET_50", baseline),
        ("RESNET_50_FINAL_EPINET", epinet),
    ])
    .unwrap();
    assert_eq!(table.get("RESNET_50", "top1"), Some(0.5));
    assert_eq!(table.get("RESNET_50_FINAL_EPINET", "top1"), Some(1.0));
    assert_eq!(table.get("RESNET_50_FINAL_EPINET", "num_samples"), Some(3.0));

    let mut writer = LongFormWriter::new(path.clone());
    writer.record_all(to_long_form(&table));
    assert_eq!(writer.len(), 4);
    writer.finish().unwrap();

    let rebuilt = LongFormReader::read_table(&path).unwrap();
    assert_eq!(rebuilt, table);

    let text = render_table(&rebuilt);
    assert!(text.contains("RESNET_50_FINAL_EPINET"));
    assert!(text.contains("num_samples"));
}

/// A table with no models survives the long-form round trip as empty.
#[test]
fn test_empty_long_form_roundtrip() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("empty.parquet");
    LongFormWriter::new(path.clone()).finish().unwrap();

    let rows = LongFormReader::read_all(&path).unwrap();
    assert!(rows.is_empty());
    assert_eq!(ResultsTable::from_long_form(&rows).unwrap(), ResultsTable::default());
}
