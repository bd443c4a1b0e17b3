//! Evaluation batches: images plus integer labels, loaded from disk.

use std::fs;
use std::path::{Path, PathBuf};

use burn::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::SamplingError;

/// A batch of inputs with their true labels.
///
/// `images` has shape `(batch, height, width, channels)`; `labels` has shape
/// `(batch, 1)`.
#[derive(Debug, Clone)]
pub struct EvaluationBatch<B: Backend> {
    pub images: Tensor<B, 4>,
    pub labels: Tensor<B, 2, Int>,
}

impl<B: Backend> EvaluationBatch<B> {
    /// Pair images with labels. The leading dimensions must agree and labels
    /// must be a single column.
    pub fn new(images: Tensor<B, 4>, labels: Tensor<B, 2, Int>) -> Result<Self, SamplingError> {
        let [batch_size, ..] = images.dims();
        let [num_labels, cols] = labels.dims();
        if cols != 1 {
            return Err(SamplingError::InvalidBatch(format!(
                "labels must have shape (batch, 1), got ({num_labels}, {cols})"
            )));
        }
        if num_labels != batch_size {
            return Err(SamplingError::BatchMismatch {
                expected: batch_size,
                actual: num_labels,
            });
        }
        Ok(Self { images, labels })
    }

    pub fn batch_size(&self) -> usize {
        self.images.dims()[0]
    }
}

/// Source of the evaluation batch.
pub trait BatchLoader<B: Backend> {
    fn load(&self, device: &B::Device) -> Result<EvaluationBatch<B>, SamplingError>;
}

/// On-disk form of a batch: row-major images plus one label per input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRecord {
    /// `[batch, height, width, channels]`.
    pub shape: [usize; 4],
    pub images: Vec<f32>,
    pub labels: Vec<i64>,
}

impl BatchRecord {
    /// Read and validate a record from a JSON file.
    pub fn load(path: &Path) -> Result<Self, SamplingError> {
        let content = fs::read_to_string(path)?;
        let record: Self = serde_json::from_str(&content)?;
        record.validate().map_err(|reason| SamplingError::InvalidRecord {
            path: path.to_path_buf(),
            reason,
        })?;
        Ok(record)
    }

    pub fn save(&self, path: &Path) -> Result<(), SamplingError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string(self)?)?;
        Ok(())
    }

    fn validate(&self) -> Result<(), String> {
        let expected: usize = self.shape.iter().product();
        if self.images.len() != expected {
            return Err(format!(
                "shape {:?} needs {expected} image values, found {}",
                self.shape,
                self.images.len()
            ));
        }
        if self.labels.len() != self.shape[0] {
            return Err(format!(
                "batch of {} needs as many labels, found {}",
                self.shape[0],
                self.labels.len()
            ));
        }
        Ok(())
    }

    /// Move the record onto `device`.
    pub fn into_batch<B: Backend>(
        self,
        device: &B::Device,
    ) -> Result<EvaluationBatch<B>, SamplingError> {
        let batch_size = self.shape[0];
        let images = Tensor::from_data(TensorData::new(self.images, self.shape), device);
        let labels = Tensor::from_data(TensorData::new(self.labels, [batch_size, 1]), device);
        EvaluationBatch::new(images, labels)
    }
}

/// Loads a [`BatchRecord`] saved as JSON.
#[derive(Debug, Clone)]
pub struct JsonBatchLoader {
    path: PathBuf,
}

impl JsonBatchLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl<B: Backend> BatchLoader<B> for JsonBatchLoader {
    fn load(&self, device: &B::Device) -> Result<EvaluationBatch<B>, SamplingError> {
        let record = BatchRecord::load(&self.path)?;
        tracing::info!(
            path = %self.path.display(),
            shape = ?record.shape,
            "Loaded evaluation batch"
        );
        record.into_batch(device)
    }
}
