//! Metrics sink boundary.
//!
//! Handle logic MUST NOT touch `obs::metrics` directly.
//! All instrumentation flows through MetricsEvent and MetricsSink.
use crate::obs::metrics;
use derive_more::Display;
use std::{cell::RefCell, rc::Rc};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn MetricsSink>>> = RefCell::new(None);
}

///
/// ExecKind
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum ExecKind {
    #[display("insert")]
    Insert,
    #[display("update")]
    Update,
    #[display("delete")]
    Delete,
    #[display("select")]
    Select,
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[remain::sorted]
pub enum MetricsEvent<'a> {
    Exec {
        kind: ExecKind,
        table: &'a str,
        rows: u64,
    },
    HandleClosed {
        table: &'a str,
    },
    TableCreated {
        table: &'a str,
    },
    TableDropped {
        table: &'a str,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent<'_>);
}

/// GlobalMetricsSink
/// Default sink that writes into the per-thread counters.
/// Acts as the concrete sink when no scoped override is installed.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent<'_>) {
        match event {
            MetricsEvent::Exec { kind, table, rows } => {
                metrics::with_state_mut(|m| {
                    let ops = &mut m.ops;
                    match kind {
                        ExecKind::Insert => {
                            ops.insert_calls = ops.insert_calls.saturating_add(1);
                            ops.rows_inserted = ops.rows_inserted.saturating_add(rows);
                        }
                        ExecKind::Update => {
                            ops.update_calls = ops.update_calls.saturating_add(1);
                            ops.rows_updated = ops.rows_updated.saturating_add(rows);
                        }
                        ExecKind::Delete => {
                            ops.delete_calls = ops.delete_calls.saturating_add(1);
                            ops.rows_deleted = ops.rows_deleted.saturating_add(rows);
                        }
                        ExecKind::Select => {
                            ops.select_calls = ops.select_calls.saturating_add(1);
                            ops.rows_selected = ops.rows_selected.saturating_add(rows);
                        }
                    }

                    let entry = m.tables.entry(table.to_string()).or_default();
                    match kind {
                        ExecKind::Insert => {
                            entry.insert_calls = entry.insert_calls.saturating_add(1);
                            entry.rows_inserted = entry.rows_inserted.saturating_add(rows);
                        }
                        ExecKind::Update => {
                            entry.update_calls = entry.update_calls.saturating_add(1);
                            entry.rows_updated = entry.rows_updated.saturating_add(rows);
                        }
                        ExecKind::Delete => {
                            entry.delete_calls = entry.delete_calls.saturating_add(1);
                            entry.rows_deleted = entry.rows_deleted.saturating_add(rows);
                        }
                        ExecKind::Select => {
                            entry.select_calls = entry.select_calls.saturating_add(1);
                            entry.rows_selected = entry.rows_selected.saturating_add(rows);
                        }
                    }
                });
            }

            MetricsEvent::HandleClosed { .. } => {
                metrics::with_state_mut(|m| {
                    m.ops.handles_closed = m.ops.handles_closed.saturating_add(1);
                });
            }

            MetricsEvent::TableCreated { .. } => {
                metrics::with_state_mut(|m| {
                    m.ops.tables_created = m.ops.tables_created.saturating_add(1);
                });
            }

            MetricsEvent::TableDropped { .. } => {
                metrics::with_state_mut(|m| {
                    m.ops.tables_dropped = m.ops.tables_dropped.saturating_add(1);
                });
            }
        }
    }
}

pub(crate) fn record(event: MetricsEvent<'_>) {
    let sink = SINK_OVERRIDE.with(|cell| cell.borrow().clone());
    match sink {
        Some(sink) => sink.record(event),
        None => GlobalMetricsSink.record(event),
    }
}

/// Snapshot the current thread's counters.
#[must_use]
pub fn metrics_report() -> metrics::EventReport {
    metrics::report()
}

/// Reset the current thread's counters.
pub fn metrics_reset_all() {
    metrics::reset();
}

/// Run a closure with a temporary metrics sink override on this thread.
pub fn with_metrics_sink<T>(sink: Rc<dyn MetricsSink>, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<Rc<dyn MetricsSink>>);

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

///
/// TESTS
///
