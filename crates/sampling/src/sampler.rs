//! Samplers produce logits of shape `(num_samples, batch, num_classes)` for
//! a batch of images, one slice per epistemic index.

use std::fs;
use std::path::Path;

use burn::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::catalog::{CheckpointDescriptor, ModelName};
use crate::error::SamplingError;

/// Draws sampled logits for a batch.
pub trait Sampler<B: Backend> {
    /// Number of epistemic samples per call.
    fn num_samples(&self) -> usize;

    /// Logits of shape `(num_samples, batch, num_classes)`. Deterministic for
    /// a fixed `seed`.
    fn sample(&self, images: &Tensor<B, 4>, seed: u64) -> Result<Tensor<B, 3>, SamplingError>;
}

/// Builds a [`Sampler`] for a checkpoint.
pub trait SamplerFactory<B: Backend> {
    fn make_sampler(
        &self,
        descriptor: &CheckpointDescriptor,
        num_samples: usize,
    ) -> Result<Box<dyn Sampler<B>>, SamplingError>;
}

/// Logits recorded from a model, serialized as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogitsRecord {
    /// `[recorded_samples, batch, num_classes]`.
    pub shape: [usize; 3],
    pub logits: Vec<f32>,
}

impl LogitsRecord {
    pub fn load(path: &Path) -> Result<Self, SamplingError> {
        let content = fs::read_to_string(path)?;
        let record: Self = serde_json::from_str(&content)?;
        let invalid = |reason: String| SamplingError::InvalidRecord {
            path: path.to_path_buf(),
            reason,
        };
        let expected: usize = record.shape.iter().product();
        if record.logits.len() != expected {
            return Err(invalid(format!(
                "shape {:?} needs {expected} logits, found {}",
                record.shape,
                record.logits.len()
            )));
        }
        if record.shape[0] == 0 {
            return Err(invalid("no recorded samples".to_string()));
        }
        Ok(record)
    }

    pub fn save(&self, path: &Path) -> Result<(), SamplingError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string(self)?)?;
        Ok(())
    }

    /// Capture logits produced on any backend.
    pub fn from_tensor<B: Backend>(tensor: Tensor<B, 3>) -> Self {
        let shape = tensor.dims();
        let logits = tensor.into_data().iter::<f32>().collect();
        Self { shape, logits }
    }
}

/// Serves logits recorded ahead of time from the descriptor's `logits` file.
#[derive(Debug, Clone)]
pub struct RecordedSamplerFactory<B: Backend> {
    device: B::Device,
}

impl<B: Backend> RecordedSamplerFactory<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> SamplerFactory<B> for RecordedSamplerFactory<B> {
    fn make_sampler(
        &self,
        descriptor: &CheckpointDescriptor,
        num_samples: usize,
    ) -> Result<Box<dyn Sampler<B>>, SamplingError> {
        if num_samples == 0 {
            return Err(SamplingError::ZeroSamples);
        }
        let record = LogitsRecord::load(&descriptor.logits)?;
        let [recorded, batch_size, num_classes] = record.shape;
        if num_classes != descriptor.num_classes {
            return Err(SamplingError::ClassMismatch {
                model: descriptor.name.to_string(),
                expected: descriptor.num_classes,
                actual: num_classes,
            });
        }
        if recorded < num_samples && descriptor.name.is_epinet() {
            tracing::warn!(
                model = %descriptor.name,
                recorded,
                num_samples,
                "Fewer recorded samples than requested, indices will repeat"
            );
        }
        tracing::debug!(
            model = %descriptor.name,
            recorded,
            batch_size,
            num_classes,
            "Loaded recorded logits"
        );

        let logits = Tensor::from_data(TensorData::new(record.logits, record.shape), &self.device);
        Ok(Box::new(RecordedSampler {
            model: descriptor.name,
            logits,
            num_samples,
        }))
    }
}

/// Picks `num_samples` slices of the recorded sample axis.
///
/// The recorded axis is shuffled with the call's seed and read in order,
/// wrapping around when more samples are requested than were recorded. A
/// single recorded slice is therefore repeated.
#[derive(Debug, Clone)]
pub struct RecordedSampler<B: Backend> {
    model: ModelName,
    logits: Tensor<B, 3>,
    num_samples: usize,
}

impl<B: Backend> RecordedSampler<B> {
    /// Recorded sample indices used for `seed`.
    pub fn sample_indices(&self, seed: u64) -> Vec<usize> {
        let recorded = self.logits.dims()[0];
        let mut order: Vec<usize> = (0..recorded).collect();
        order.shuffle(&mut StdRng::seed_from_u64(seed));
        (0..self.num_samples).map(|i| order[i % recorded]).collect()
    }
}

impl<B: Backend> Sampler<B> for RecordedSampler<B> {
    fn num_samples(&self) -> usize {
        self.num_samples
    }

    fn sample(&self, images: &Tensor<B, 4>, seed: u64) -> Result<Tensor<B, 3>, SamplingError> {
        let recorded_batch = self.logits.dims()[1];
        let batch_size = images.dims()[0];
        if batch_size != recorded_batch {
            return Err(SamplingError::BatchMismatch {
                expected: recorded_batch,
                actual: batch_size,
            });
        }

        let indices: Vec<i64> = self
            .sample_indices(seed)
            .into_iter()
            .map(|i| i as i64)
            .collect();
        tracing::debug!(model = %self.model, seed, indices = ?indices, "Selected recorded samples");
        let index = Tensor::<B, 1, Int>::from_data(
            TensorData::new(indices, [self.num_samples]),
            &self.logits.device(),
        );
        Ok(self.logits.clone().select(0, index))
    }
}
