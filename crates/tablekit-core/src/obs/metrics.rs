use serde::Serialize;
use std::{cell::RefCell, collections::BTreeMap};

///
/// EventReport
/// Ephemeral, in-memory counters for handle operations.
/// Counters are per-thread.
///

#[derive(Clone, Debug, Default, Serialize)]
pub struct EventReport {
    pub ops: EventOps,
    pub tables: BTreeMap<String, TableCounters>,
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct EventOps {
    // Handle entrypoints
    pub insert_calls: u64,
    pub update_calls: u64,
    pub delete_calls: u64,
    pub select_calls: u64,

    // Rows touched
    pub rows_inserted: u64,
    pub rows_updated: u64,
    pub rows_deleted: u64,
    pub rows_selected: u64,

    // Lifecycle
    pub tables_created: u64,
    pub tables_dropped: u64,
    pub handles_closed: u64,
}

///
/// TableCounters
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct TableCounters {
    pub insert_calls: u64,
    pub update_calls: u64,
    pub delete_calls: u64,
    pub select_calls: u64,
    pub rows_inserted: u64,
    pub rows_updated: u64,
    pub rows_deleted: u64,
    pub rows_selected: u64,
}

thread_local! {
    static EVENT_STATE: RefCell<EventReport> = RefCell::new(EventReport::default());
}

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventReport) -> R) -> R {
    EVENT_STATE.with(|m| f(&m.borrow()))
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventReport) -> R) -> R {
    EVENT_STATE.with(|m| f(&mut m.borrow_mut()))
}

/// Reset all counters (useful in tests).
pub(crate) fn reset() {
    with_state_mut(|m| *m = EventReport::default());
}

pub(crate) fn report() -> EventReport {
    with_state(Clone::clone)
}
