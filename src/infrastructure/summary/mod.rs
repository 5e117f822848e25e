//! Access summary sinks.

mod tracing_sink;

pub use tracing_sink::{SUMMARY_TARGET, TracingSummarySink};
