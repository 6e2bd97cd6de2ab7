pub mod registry;

pub use registry::{gather_metric_families, gather_metrics, init};
