//! External collaborators of the evaluation pipeline.
//!
//! - [`catalog`]: named ImageNet models and their checkpoint descriptors
//! - [`batch`]: the evaluation batch and its loaders
//! - [`sampler`]: samplers that produce `(num_samples, batch, classes)` logits
//! - [`mocks`]: canned samplers for tests

pub mod batch;
pub mod catalog;
pub mod error;
pub mod mocks;
pub mod sampler;

pub use batch::{BatchLoader, BatchRecord, EvaluationBatch, JsonBatchLoader};
pub use catalog::{CheckpointDescriptor, ModelName, ModelRegistry};
pub use error::SamplingError;
pub use sampler::{LogitsRecord, RecordedSampler, RecordedSamplerFactory, Sampler, SamplerFactory};
