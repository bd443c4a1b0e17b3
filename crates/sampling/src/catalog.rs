//! Model catalog: named model configurations and their checkpoint descriptors.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SamplingError;

/// Pre-trained ImageNet classifiers available for evaluation.
///
/// `*_FINAL_EPINET` variants add an epinet on top of the corresponding
/// ResNet and produce distinct logits per epistemic index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelName {
    #[serde(rename = "RESNET_18")]
    Resnet18,
    #[serde(rename = "RESNET_32")]
    Resnet32,
    #[serde(rename = "RESNET_44")]
    Resnet44,
    #[serde(rename = "RESNET_56")]
    Resnet56,
    #[serde(rename = "RESNET_110")]
    Resnet110,
    #[serde(rename = "RESNET_50")]
    Resnet50,
    #[serde(rename = "RESNET_101")]
    Resnet101,
    #[serde(rename = "RESNET_152")]
    Resnet152,
    #[serde(rename = "RESNET_200")]
    Resnet200,
    #[serde(rename = "RESNET_50_FINAL_EPINET")]
    Resnet50FinalEpinet,
    #[serde(rename = "RESNET_101_FINAL_EPINET")]
    Resnet101FinalEpinet,
    #[serde(rename = "RESNET_152_FINAL_EPINET")]
    Resnet152FinalEpinet,
    #[serde(rename = "RESNET_200_FINAL_EPINET")]
    Resnet200FinalEpinet,
}

const NAMES: [(ModelName, &str); 13] = [
    (ModelName::Resnet18, "RESNET_18"),
    (ModelName::Resnet32, "RESNET_32"),
    (ModelName::Resnet44, "RESNET_44"),
    (ModelName::Resnet56, "RESNET_56"),
    (ModelName::Resnet110, "RESNET_110"),
    (ModelName::Resnet50, "RESNET_50"),
    (ModelName::Resnet101, "RESNET_101"),
    (ModelName::Resnet152, "RESNET_152"),
    (ModelName::Resnet200, "RESNET_200"),
    (ModelName::Resnet50FinalEpinet, "RESNET_50_FINAL_EPINET"),
    (ModelName::Resnet101FinalEpinet, "RESNET_101_FINAL_EPINET"),
    (ModelName::Resnet152FinalEpinet, "RESNET_152_FINAL_EPINET"),
    (ModelName::Resnet200FinalEpinet, "RESNET_200_FINAL_EPINET"),
];

impl ModelName {
    /// Every catalog entry, in declaration order.
    pub fn all() -> impl Iterator<Item = ModelName> {
        NAMES.iter().map(|(model, _)| *model)
    }

    pub fn as_str(&self) -> &'static str {
        NAMES
            .iter()
            .find(|(model, _)| model == self)
            .map(|(_, name)| *name)
            .unwrap_or("UNKNOWN")
    }

    /// Whether the model produces distinct logits per epistemic index.
    pub fn is_epinet(&self) -> bool {
        matches!(
            self,
            Self::Resnet50FinalEpinet
                | Self::Resnet101FinalEpinet
                | Self::Resnet152FinalEpinet
                | Self::Resnet200FinalEpinet
        )
    }
}

impl fmt::Display for ModelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelName {
    type Err = SamplingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NAMES
            .iter()
            .find(|(_, name)| name.eq_ignore_ascii_case(s))
            .map(|(model, _)| *model)
            .ok_or_else(|| SamplingError::UnknownModel(s.to_string()))
    }
}

/// Opaque reference to a trained model, resolved by a sampler factory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointDescriptor {
    /// Catalog name.
    pub name: ModelName,
    /// Path to the model's recorded logits.
    pub logits: PathBuf,
    /// Number of output classes.
    #[serde(default = "default_num_classes")]
    pub num_classes: usize,
}

fn default_num_classes() -> usize {
    1000
}

/// Ordered set of checkpoint descriptors, one per model.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    entries: Vec<CheckpointDescriptor>,
}

impl ModelRegistry {
    /// Build a registry. Fails if a model appears twice.
    pub fn new(entries: Vec<CheckpointDescriptor>) -> Result<Self, SamplingError> {
        let mut registry = Self::default();
        for entry in entries {
            registry.register(entry)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, descriptor: CheckpointDescriptor) -> Result<(), SamplingError> {
        if self.entries.iter().any(|e| e.name == descriptor.name) {
            return Err(SamplingError::DuplicateModel(descriptor.name.to_string()));
        }
        self.entries.push(descriptor);
        Ok(())
    }

    /// Descriptor for `name`.
    pub fn resolve(&self, name: ModelName) -> Result<&CheckpointDescriptor, SamplingError> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| SamplingError::UnknownModel(name.to_string()))
    }

    /// Resolve relative logits paths against `base`.
    pub fn with_base_dir(mut self, base: &Path) -> Self {
        for entry in &mut self.entries {
            if entry.logits.is_relative() {
                entry.logits = base.join(&entry.logits);
            }
        }
        self
    }

    /// Registered models in registration order.
    pub fn names(&self) -> impl Iterator<Item = ModelName> + '_ {
        self.entries.iter().map(|e| e.name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CheckpointDescriptor> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
