use crate::error::ErrorCode;
use serde::{Deserialize, Serialize};
use std::{cell::RefCell, collections::BTreeMap};

///
/// PlanReport
/// Ephemeral, in-memory counters for plan builds on this thread.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct PlanReport {
    // Build entrypoints
    pub builds_started: u64,
    pub builds_succeeded: u64,
    pub builds_failed: u64,

    // Fields
    pub fields_resolved: u64,
    pub fields_rejected: u64,
    pub implicit_fields: u64,
    pub explicit_fields: u64,
    pub computed_fields: u64,

    // Diagnostics
    pub errors_by_code: BTreeMap<ErrorCode, u64>,

    pub projections: BTreeMap<String, ProjectionCounters>,
}

impl PlanReport {
    /// Total diagnostics recorded across all codes.
    #[must_use]
    pub fn error_count(&self) -> u64 {
        self.errors_by_code.values().sum()
    }

    #[must_use]
    pub fn errors_for(&self, code: ErrorCode) -> u64 {
        self.errors_by_code.get(&code).copied().unwrap_or_default()
    }
}

///
/// ProjectionCounters
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ProjectionCounters {
    pub builds: u64,
    pub failures: u64,
    pub fields_resolved: u64,
    pub fields_rejected: u64,
}

thread_local! {
    static PLAN_STATE: RefCell<PlanReport> = RefCell::new(PlanReport::default());
}

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&PlanReport) -> R) -> R {
    PLAN_STATE.with(|m| f(&m.borrow()))
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut PlanReport) -> R) -> R {
    PLAN_STATE.with(|m| f(&mut m.borrow_mut()))
}

/// Reset all counters.
pub(crate) fn reset() {
    with_state_mut(|m| *m = PlanReport::default());
}

/// Copy of the current counters.
pub(crate) fn report() -> PlanReport {
    with_state(Clone::clone)
}

pub(crate) const fn bump(counter: &mut u64, by: u64) {
    *counter = counter.saturating_add(by);
}
