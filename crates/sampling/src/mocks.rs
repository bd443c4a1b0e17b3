//! Mock samplers for testing without recorded logits on disk.

use std::collections::HashMap;

use burn::prelude::*;

use crate::catalog::{CheckpointDescriptor, ModelName};
use crate::error::SamplingError;
use crate::sampler::{Sampler, SamplerFactory};

/// Returns the same canned logits for every call, whatever the seed.
#[derive(Debug, Clone)]
pub struct MockSampler<B: Backend> {
    logits: Tensor<B, 3>,
}

impl<B: Backend> MockSampler<B> {
    pub fn new(logits: Tensor<B, 3>) -> Self {
        Self { logits }
    }
}

impl<B: Backend> Sampler<B> for MockSampler<B> {
    fn num_samples(&self) -> usize {
        self.logits.dims()[0]
    }

    fn sample(&self, images: &Tensor<B, 4>, _seed: u64) -> Result<Tensor<B, 3>, SamplingError> {
        let expected = self.logits.dims()[1];
        let actual = images.dims()[0];
        if expected != actual {
            return Err(SamplingError::BatchMismatch { expected, actual });
        }
        Ok(self.logits.clone())
    }
}

/// Hands out [`MockSampler`]s with canned logits per model.
///
/// The requested `num_samples` is only checked for zero; the sample count
/// comes from the canned logits.
#[derive(Debug, Clone)]
pub struct MockSamplerFactory<B: Backend> {
    logits: HashMap<ModelName, Tensor<B, 3>>,
}

impl<B: Backend> Default for MockSamplerFactory<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> MockSamplerFactory<B> {
    pub fn new() -> Self {
        Self {
            logits: HashMap::new(),
        }
    }

    /// Register canned logits for `model`.
    pub fn add_logits(&mut self, model: ModelName, logits: Tensor<B, 3>) {
        self.logits.insert(model, logits);
    }
}

impl<B: Backend> SamplerFactory<B> for MockSamplerFactory<B> {
    fn make_sampler(
        &self,
        descriptor: &CheckpointDescriptor,
        num_samples: usize,
    ) -> Result<Box<dyn Sampler<B>>, SamplingError> {
        if num_samples == 0 {
            return Err(SamplingError::ZeroSamples);
        }
        let logits = self
            .logits
            .get(&descriptor.name)
            .ok_or_else(|| SamplingError::UnknownModel(descriptor.name.to_string()))?;
        Ok(Box::new(MockSampler::new(logits.clone())))
    }
}
