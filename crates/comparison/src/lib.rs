//! Evaluation and comparison of classifiers from sampled logits.
//!
//! Turns per-model logits of shape `(samples, batch, classes)` into a
//! standardized results table and a long-form `(model, metric, value)`
//! table for grouped/faceted plotting.
//!
//! # Key types
//!
//! - [`MetricFn`] / [`MetricSuite`]: named metric functions, in column order
//! - [`ModelResult`]: metric values for one model
//! - [`ResultsTable`]: rows = models, columns = metrics
//! - [`LongFormRow`]: one `(model, metric, value)` cell
//! - [`LongFormWriter`] / [`LongFormReader`]: Parquet I/O for the long form

pub mod error;
pub mod pipeline;
pub mod reader;
pub mod suite;
pub mod types;
pub mod writer;

pub use error::EvalError;
pub use pipeline::{compare, evaluate, to_long_form};
pub use reader::LongFormReader;
pub use suite::{MetricFn, MetricSuite};
pub use types::{render_table, LongFormRow, MetricValue, ModelResult, ResultRow, ResultsTable};
pub use writer::{long_form_schema, write_long_form_json, LongFormWriter};
