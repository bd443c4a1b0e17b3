//! Tensor helpers shared by the metric calculators.
//!
//! All helpers take logits of shape `(samples, batch, classes)` and labels
//! of shape `(batch, 1)`.

use burn::prelude::*;
use burn::tensor::activation::{log_softmax, softmax};

/// Log-likelihood of the true label under each epistemic sample.
///
/// Returns shape `(samples, batch)`.
pub fn sample_log_likelihoods<B: Backend>(
    logits: &Tensor<B, 3>,
    labels: &Tensor<B, 2, Int>,
) -> Tensor<B, 2> {
    let [num_samples, batch_size, _] = logits.dims();
    let log_probs = log_softmax(logits.clone(), 2); // (samples, batch, classes)

    let index = labels.clone().unsqueeze_dim::<3>(0); // (1, batch, 1)
    let index = Tensor::cat(vec![index; num_samples], 0); // (samples, batch, 1)

    log_probs
        .gather(2, index)
        .reshape([num_samples, batch_size])
}

/// Class probabilities averaged over epistemic samples. Shape `(batch, classes)`.
pub fn marginal_probs<B: Backend>(logits: &Tensor<B, 3>) -> Tensor<B, 2> {
    let [_, batch_size, num_classes] = logits.dims();
    softmax(logits.clone(), 2)
        .mean_dim(0)
        .reshape([batch_size, num_classes])
}

/// Numerically stable `log(sum(exp(x)))` over the sample axis (dim 0).
///
/// `(samples, n)` → `(1, n)`.
pub fn logsumexp_samples<B: Backend>(x: Tensor<B, 2>) -> Tensor<B, 2> {
    let max = x.clone().max_dim(0);
    (x - max.clone()).exp().sum_dim(0).log() + max
}

/// Read a single-element tensor back as `f64`.
pub fn scalar<B: Backend>(tensor: Tensor<B, 1>) -> f64 {
    tensor.into_scalar().elem()
}

/// Read a float tensor back as row-major `f64` values.
pub fn to_f64_vec<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> Vec<f64> {
    tensor.into_data().iter::<f64>().collect()
}

/// Read an int tensor back as row-major `i64` values.
pub fn to_i64_vec<B: Backend, const D: usize>(tensor: Tensor<B, D, Int>) -> Vec<i64> {
    tensor.into_data().iter::<i64>().collect()
}

/// `log(sum(exp(values)))` on the host.
pub fn logsumexp(values: &[f64]) -> f64 {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return max;
    }
    max + values.iter().map(|v| (v - max).exp()).sum::<f64>().ln()
}
