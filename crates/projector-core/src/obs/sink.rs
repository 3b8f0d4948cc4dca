//! Metrics sink boundary.
//!
//! The plan builder never touches `obs::metrics` directly. All
//! instrumentation flows through `PlanEvent` and `PlanSink`; this module is
//! the only bridge between resolution and the global counters.
use crate::{
    error::ErrorCode,
    obs::metrics::{self, PlanReport, bump},
    plan::MappingKind,
};
use std::{cell::RefCell, rc::Rc};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn PlanSink>>> = RefCell::new(None);
}

///
/// PlanEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PlanEvent<'a> {
    BuildStart {
        projection: &'a str,
        source: &'a str,
        fields: usize,
    },
    FieldResolved {
        projection: &'a str,
        field: &'a str,
        kind: MappingKind,
    },
    /// One per diagnostic; a field with several errors emits several events.
    FieldRejected {
        projection: &'a str,
        field: &'a str,
        code: ErrorCode,
    },
    BuildFinish {
        projection: &'a str,
        resolved: usize,
        rejected: usize,
    },
}

///
/// PlanSink
///

pub trait PlanSink {
    fn record(&self, event: PlanEvent<'_>);
}

/// GlobalPlanSink
/// Default thread-local sink that writes into the global plan counters.
/// Acts as the concrete sink when no scoped override is installed.

pub(crate) struct GlobalPlanSink;

impl PlanSink for GlobalPlanSink {
    fn record(&self, event: PlanEvent<'_>) {
        match event {
            PlanEvent::BuildStart { projection, .. } => {
                metrics::with_state_mut(|m| {
                    bump(&mut m.builds_started, 1);
                    let entry = m.projections.entry(projection.to_string()).or_default();
                    bump(&mut entry.builds, 1);
                });
            }

            PlanEvent::FieldResolved { kind, .. } => {
                metrics::with_state_mut(|m| match kind {
                    MappingKind::Implicit => bump(&mut m.implicit_fields, 1),
                    MappingKind::Explicit => bump(&mut m.explicit_fields, 1),
                    MappingKind::Computed => bump(&mut m.computed_fields, 1),
                });
            }

            PlanEvent::FieldRejected { code, .. } => {
                metrics::with_state_mut(|m| {
                    bump(m.errors_by_code.entry(code).or_default(), 1);
                });
            }

            PlanEvent::BuildFinish {
                projection,
                resolved,
                rejected,
            } => {
                metrics::with_state_mut(|m| {
                    let resolved = u64::try_from(resolved).unwrap_or(u64::MAX);
                    let rejected = u64::try_from(rejected).unwrap_or(u64::MAX);

                    bump(&mut m.fields_resolved, resolved);
                    bump(&mut m.fields_rejected, rejected);
                    if rejected == 0 {
                        bump(&mut m.builds_succeeded, 1);
                    } else {
                        bump(&mut m.builds_failed, 1);
                    }

                    let entry = m.projections.entry(projection.to_string()).or_default();
                    bump(&mut entry.fields_resolved, resolved);
                    bump(&mut entry.fields_rejected, rejected);
                    if rejected > 0 {
                        bump(&mut entry.failures, 1);
                    }
                });
            }
        }
    }
}

pub(crate) const GLOBAL_PLAN_SINK: GlobalPlanSink = GlobalPlanSink;

pub(crate) fn record(event: PlanEvent<'_>) {
    let override_sink = SINK_OVERRIDE.with(|cell| cell.borrow().clone());
    match override_sink {
        Some(sink) => sink.record(event),
        None => GLOBAL_PLAN_SINK.record(event),
    }
}

/// Snapshot the plan counters recorded on this thread.
#[must_use]
pub fn plan_report() -> PlanReport {
    metrics::report()
}

/// Reset all plan counters on this thread.
pub fn plan_metrics_reset() {
    metrics::reset();
}

/// Run a closure with a temporary sink override.
///
/// Events recorded inside `f` go to `sink` instead of the global counters.
/// The previous sink is restored on every exit, including unwinding.
pub fn with_plan_sink<T>(sink: Rc<dyn PlanSink>, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<Rc<dyn PlanSink>>);

    impl Drop for Guard {
        fn drop(&mut self) {
            let prev = self.0.take();
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = prev;
            });
        }
    }

    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink));
    let _guard = Guard(prev);

    f()
}
