//! Integration tests for the sampling crate.
//!
//! These go from files on disk to sampled logits: batch record + registry of
//! recorded logits → factory → sampler.

use std::path::Path;

use burn::backend::ndarray::NdArray;
use sampling::{
    BatchLoader, BatchRecord, CheckpointDescriptor, EvaluationBatch, JsonBatchLoader,
    LogitsRecord, ModelName, ModelRegistry, RecordedSamplerFactory, SamplerFactory,
};
use tempfile::TempDir;

type TestBackend = NdArray<f32>;

const BATCH: usize = 4;
const CLASSES: usize = 3;

fn write_batch(dir: &Path) {
    BatchRecord {
        shape: [BATCH, 2, 2, 1],
        images: vec![0.5; BATCH * 4],
        labels: vec![0, 1, 2, 0],
    }
    .save(&dir.join("batch.json"))
    .unwrap();
}

fn write_logits(dir: &Path, file: &str, recorded: usize) {
    let logits = (0..recorded * BATCH * CLASSES)
        .map(|i| (i % 7) as f32 - 3.0)
        .collect();
    LogitsRecord {
        shape: [recorded, BATCH, CLASSES],
        logits,
    }
    .save(&dir.join(file))
    .unwrap();
}

/// Registry from relative paths → resolve → sample against the loaded batch.
#[test]
fn test_registry_to_sampled_logits() {
    let tmp = TempDir::new().unwrap();
    write_batch(tmp.path());
    write_logits(tmp.path(), "resnet50.json", 1);
    write_logits(tmp.path(), "epinet50.json", 16);

    let registry = ModelRegistry::new(vec![
        CheckpointDescriptor {
            name: ModelName::Resnet50,
            logits: "resnet50.json".into(),
            num_classes: CLASSES,
        },
        CheckpointDescriptor {
            name: ModelName::Resnet50FinalEpinet,
            logits: "epinet50.json".into(),
            num_classes: CLASSES,
        },
    ])
    .unwrap()
    .with_base_dir(tmp.path());

    let device = Default::default();
    let batch: EvaluationBatch<TestBackend> = JsonBatchLoader::new(tmp.path().join("batch.json"))
        .load(&device)
        .unwrap();
    let factory = RecordedSamplerFactory::<TestBackend>::new(device);

    for model in registry.names() {
        let descriptor = registry.resolve(model).unwrap();
        let sampler = factory.make_sampler(descriptor, 10).unwrap();
        let logits = sampler.sample(&batch.images, 7).unwrap();
        assert_eq!(logits.dims(), [10, BATCH, CLASSES], "model {model}");
    }
}

/// The single-recording model yields identical slices; the epinet does not.
#[test]
fn test_epinet_slices_differ_resnet_slices_repeat() {
    let tmp = TempDir::new().unwrap();
    write_batch(tmp.path());
    write_logits(tmp.path(), "resnet50.json", 1);
    write_logits(tmp.path(), "epinet50.json", 5);

    let device = Default::default();
    let batch: EvaluationBatch<TestBackend> = JsonBatchLoader::new(tmp.path().join("batch.json"))
        .load(&device)
        .unwrap();
    let factory = RecordedSamplerFactory::<TestBackend>::new(device);

    let slices = |file: &str, model: ModelName| -> Vec<Vec<f32>> {
        let descriptor = CheckpointDescriptor {
            name: model,
            logits: tmp.path().join(file),
            num_classes: CLASSES,
        };
        let logits = factory
            .make_sampler(&descriptor, 3)
            .unwrap()
            .sample(&batch.images, 1)
            .unwrap();
        let values: Vec<f32> = logits.into_data().iter::<f32>().collect();
        values.chunks(BATCH * CLASSES).map(|c| c.to_vec()).collect()
    };

    let resnet = slices("resnet50.json", ModelName::Resnet50);
    assert!(resnet.iter().all(|s| s == &resnet[0]));

    let epinet = slices("epinet50.json", ModelName::Resnet50FinalEpinet);
    assert!(epinet.iter().skip(1).any(|s| s != &epinet[0]));
}
