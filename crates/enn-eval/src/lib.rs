//! Library side of the `enn-eval` CLI: config loading, the evaluation
//! pipeline and saved reports.

pub mod config;
pub mod pipeline;
pub mod results;
