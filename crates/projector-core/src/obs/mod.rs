//! Observability: build counters and the sink they flow through.
//!
//! Resolution never reads anything recorded here; removing every sink leaves
//! plan results unchanged.

pub(crate) mod metrics;
pub(crate) mod sink;


// re-exports
pub use metrics::{PlanReport, ProjectionCounters};
pub use sink::{PlanEvent, PlanSink, plan_metrics_reset, plan_report, with_plan_sink};
