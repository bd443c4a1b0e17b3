//! Integration tests for enn-metrics: configured suites run through the
//! comparison pipeline.

use burn::backend::ndarray::NdArray;
use burn::prelude::*;
use comparison::{compare, evaluate};
use enn_metrics::{build_suite, default_suite, MetricSpec};

type TestBackend = NdArray<f32>;

const CLASSES: usize = 4;

/// `num_samples` slices over `labels.len()` inputs. Sample `s` puts its mass
/// on the true label when `s` is even, and on the next class when odd.
fn alternating_logits(num_samples: usize, labels: &[i64]) -> Tensor<TestBackend, 3> {
    let mut values = Vec::new();
    for s in 0..num_samples {
        for &label in labels {
            let target = (label as usize + s % 2) % CLASSES;
            values.extend((0..CLASSES).map(|c| if c == target { 4.0_f32 } else { 0.0 }));
        }
    }
    Tensor::from_data(
        TensorData::new(values, [num_samples, labels.len(), CLASSES]),
        &Default::default(),
    )
}

/// One sample whose probability of the true label matches the marginal of
/// `alternating_logits` on every input: mass split between the true label and
/// the next class, with `e^on = (e^4 + 1) / 2`.
fn matched_baseline(labels: &[i64]) -> Tensor<TestBackend, 3> {
    let on = ((4.0_f32.exp() + 1.0) / 2.0).ln();
    let mut values = Vec::new();
    for &label in labels {
        let target = label as usize;
        let next = (target + 1) % CLASSES;
        values.extend((0..CLASSES).map(|c| if c == target || c == next { on } else { 0.0 }));
    }
    Tensor::from_data(
        TensorData::new(values, [1, labels.len(), CLASSES]),
        &Default::default(),
    )
}

fn labels(values: &[i64]) -> Tensor<TestBackend, 2, Int> {
    Tensor::from_data(
        TensorData::new(values.to_vec(), [values.len(), 1]),
        &Default::default(),
    )
}

/// Same marginal predictions, different joint structure: the joint NLL tells
/// the models apart, the marginal NLL does not.
#[test]
fn test_joint_nll_separates_models_with_equal_marginals() {
    let y = [0_i64, 1, 2, 3, 0, 1, 2, 3];
    let suite = build_suite::<TestBackend>(&[
        MetricSpec::Nll { name: None },
        MetricSpec::JointNll {
            name: None,
            tau: 10,
            kappa: 1,
            num_groups: 200,
            seed: 0,
        },
        MetricSpec::FullBatchJointNll { name: None },
    ])
    .unwrap();

    let epinet = evaluate(&alternating_logits(2, &y), &labels(&y), &suite).unwrap();
    let baseline = evaluate(&matched_baseline(&y), &labels(&y), &suite).unwrap();
    let table = compare(vec![
        ("RESNET_50", baseline),
        ("RESNET_50_FINAL_EPINET", epinet),
    ])
    .unwrap();

    let nll = |model| table.get(model, "nll").unwrap();
    let joint = |model| table.get(model, "joint_nll").unwrap();
    let full = |model| table.get(model, "joint_nll_full").unwrap();

    assert!(
        (nll("RESNET_50") - nll("RESNET_50_FINAL_EPINET")).abs() < 1e-4,
        "marginals should match"
    );
    assert!(joint("RESNET_50_FINAL_EPINET") < joint("RESNET_50"));
    assert!(full("RESNET_50_FINAL_EPINET") < full("RESNET_50"));
}

/// With one sample there is nothing to correlate: joint equals marginal.
#[test]
fn test_single_sample_joint_equals_marginal() {
    let y = [0_i64, 1, 2, 3];
    let x = alternating_logits(1, &y);
    let suite = build_suite::<TestBackend>(&[
        MetricSpec::Nll { name: None },
        MetricSpec::JointNll {
            name: None,
            tau: 5,
            kappa: 2,
            num_groups: 100,
            seed: 3,
        },
        MetricSpec::FullBatchJointNll { name: None },
    ])
    .unwrap();

    let result = evaluate(&x, &labels(&y), &suite).unwrap();
    let nll = result.get("nll").unwrap();
    assert!((result.get("joint_nll_full").unwrap() - nll).abs() < 1e-5);
    // Polyadic groups reuse inputs; every input has the same likelihood here.
    assert!((result.get("joint_nll").unwrap() - nll).abs() < 1e-5);
}

#[test]
fn test_default_suite_columns_and_values() {
    let y = [0_i64, 1, 2, 3];
    let result = evaluate(
        &alternating_logits(4, &y),
        &labels(&y),
        &default_suite::<TestBackend>().unwrap(),
    )
    .unwrap();

    let names: Vec<&str> = result.names().collect();
    assert_eq!(names, vec!["accuracy", "nll", "joint_nll"]);
    // True label and the next class tie on the marginal.
    let accuracy = result.get("accuracy").unwrap();
    assert!((0.0..=1.0).contains(&accuracy));
    assert!(result.get("nll").unwrap() > 0.0);
}
