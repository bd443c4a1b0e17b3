//! Metric calculators over sampled logits.
//!
//! Each calculator implements [`MetricFn`] and reads back a single `f64`.
//! Marginal metrics average predictions over epistemic samples before
//! scoring; joint metrics score groups of inputs under each sample, so they
//! are sensitive to correlations between predictions.

use burn::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use comparison::MetricFn;

use crate::error::MetricConfigError;
use crate::probs::{
    logsumexp, logsumexp_samples, marginal_probs, sample_log_likelihoods, scalar, to_f64_vec,
    to_i64_vec,
};

/// Top-1 accuracy of the sample-averaged prediction.
#[derive(Debug, Clone, Copy, Default)]
pub struct Accuracy;

impl<B: Backend> MetricFn<B> for Accuracy {
    fn compute(&self, logits: &Tensor<B, 3>, labels: &Tensor<B, 2, Int>) -> anyhow::Result<f64> {
        let predictions = marginal_probs(logits).argmax(1); // (batch, 1)
        let correct = predictions.equal(labels.clone()).int().float();
        Ok(scalar(correct.mean()))
    }
}

/// Marginal negative log-likelihood.
///
/// `-mean_b log(mean_s p_s(y_b))`, computed in log space.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarginalNll;

impl<B: Backend> MetricFn<B> for MarginalNll {
    fn compute(&self, logits: &Tensor<B, 3>, labels: &Tensor<B, 2, Int>) -> anyhow::Result<f64> {
        let num_samples = logits.dims()[0] as f64;
        let ll = sample_log_likelihoods(logits, labels);
        let mean_lse = scalar(logsumexp_samples(ll).mean());
        Ok(-(mean_lse - num_samples.ln()))
    }
}

/// Joint negative log-likelihood of the whole batch, per example.
///
/// `-(logsumexp_s(sum_b log p_s(y_b)) - ln S) / batch`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullBatchJointNll;

impl<B: Backend> MetricFn<B> for FullBatchJointNll {
    fn compute(&self, logits: &Tensor<B, 3>, labels: &Tensor<B, 2, Int>) -> anyhow::Result<f64> {
        let [num_samples, batch_size, _] = logits.dims();
        let ll = sample_log_likelihoods(logits, labels).sum_dim(1); // (samples, 1)
        let joint_ll = scalar(logsumexp_samples(ll).reshape([1])) - (num_samples as f64).ln();
        Ok(-joint_ll / batch_size as f64)
    }
}

/// Polyadic joint negative log-likelihood.
///
/// Draws `num_groups` groups of `tau` inputs. Each group first picks `kappa`
/// distinct anchor inputs, then `tau` members uniformly (with replacement)
/// among the anchors, so groups contain repeated inputs and reward models
/// whose samples agree across them. The result is the mean group joint NLL
/// divided by `tau`.
#[derive(Debug, Clone, Copy)]
pub struct JointNll {
    tau: usize,
    kappa: usize,
    num_groups: usize,
    seed: u64,
}

impl Default for JointNll {
    fn default() -> Self {
        Self {
            tau: 10,
            kappa: 2,
            num_groups: 1000,
            seed: 0,
        }
    }
}

impl JointNll {
    pub fn new(
        tau: usize,
        kappa: usize,
        num_groups: usize,
        seed: u64,
    ) -> Result<Self, MetricConfigError> {
        for (param, value) in [("tau", tau), ("kappa", kappa), ("num_groups", num_groups)] {
            if value == 0 {
                return Err(MetricConfigError::InvalidParameter {
                    metric: "joint_nll".to_string(),
                    reason: format!("{param} must be positive"),
                });
            }
        }
        Ok(Self {
            tau,
            kappa,
            num_groups,
            seed,
        })
    }

    /// Member indices of every group, `num_groups * tau` entries.
    ///
    /// Depends only on the batch size and the seed.
    pub fn sample_groups(&self, batch_size: usize) -> Vec<usize> {
        if batch_size == 0 {
            return Vec::new();
        }
        let mut rng = StdRng::seed_from_u64(self.seed);
        let kappa = self.kappa.min(batch_size);
        let mut members = Vec::with_capacity(self.num_groups * self.tau);
        for _ in 0..self.num_groups {
            let anchors = rand::seq::index::sample(&mut rng, batch_size, kappa).into_vec();
            for _ in 0..self.tau {
                members.push(anchors[rng.gen_range(0..kappa)]);
            }
        }
        members
    }
}

impl<B: Backend> MetricFn<B> for JointNll {
    fn compute(&self, logits: &Tensor<B, 3>, labels: &Tensor<B, 2, Int>) -> anyhow::Result<f64> {
        let [num_samples, batch_size, _] = logits.dims();
        anyhow::ensure!(batch_size > 0, "joint NLL needs a non-empty batch");
        let ll = to_f64_vec(sample_log_likelihoods(logits, labels)); // row-major (samples, batch)
        let log_num_samples = (num_samples as f64).ln();

        let members = self.sample_groups(batch_size);
        let mut group_ll = vec![0.0; num_samples];
        let mut total = 0.0;
        for group in members.chunks(self.tau) {
            for (s, acc) in group_ll.iter_mut().enumerate() {
                let row = &ll[s * batch_size..(s + 1) * batch_size];
                *acc = group.iter().map(|&i| row[i]).sum();
            }
            total += logsumexp(&group_ll) - log_num_samples;
        }

        let mean_joint_ll = total / self.num_groups as f64;
        Ok(-mean_joint_ll / self.tau as f64)
    }
}

/// Expected calibration error of the sample-averaged prediction.
///
/// Confidences are binned into `num_bins` equal-width bins over `[0, 1]`;
/// the result is `sum_bins (n_bin / n) * |accuracy_bin - confidence_bin|`.
#[derive(Debug, Clone, Copy)]
pub struct CalibrationError {
    num_bins: usize,
}

impl Default for CalibrationError {
    fn default() -> Self {
        Self { num_bins: 10 }
    }
}

impl CalibrationError {
    pub fn new(num_bins: usize) -> Result<Self, MetricConfigError> {
        if num_bins == 0 {
            return Err(MetricConfigError::InvalidParameter {
                metric: "ece".to_string(),
                reason: "num_bins must be positive".to_string(),
            });
        }
        Ok(Self { num_bins })
    }
}

impl<B: Backend> MetricFn<B> for CalibrationError {
    fn compute(&self, logits: &Tensor<B, 3>, labels: &Tensor<B, 2, Int>) -> anyhow::Result<f64> {
        let probs = marginal_probs(logits);
        let confidences = to_f64_vec(probs.clone().max_dim(1));
        let predictions = to_i64_vec(probs.argmax(1));
        let targets = to_i64_vec(labels.clone());

        let mut counts = vec![0usize; self.num_bins];
        let mut conf_sums = vec![0.0; self.num_bins];
        let mut correct_sums = vec![0.0; self.num_bins];
        for ((&conf, &pred), &target) in confidences.iter().zip(&predictions).zip(&targets) {
            let bin = ((conf * self.num_bins as f64) as usize).min(self.num_bins - 1);
            counts[bin] += 1;
            conf_sums[bin] += conf;
            if pred == target {
                correct_sums[bin] += 1.0;
            }
        }

        let total = confidences.len() as f64;
        let ece: f64 = (0..self.num_bins)
            .filter(|&b| counts[b] > 0)
            .map(|b| {
                let n = counts[b] as f64;
                (n / total) * (correct_sums[b] / n - conf_sums[b] / n).abs()
            })
            .sum();
        Ok(ece)
    }
}
