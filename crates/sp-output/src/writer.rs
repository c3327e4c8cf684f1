//! The `OutputWriter` trait implemented by backend writers.

use crate::{OutputResult, SessionRow, TickSummaryRow};

/// A sink for session rows and per-tick summaries.
///
/// Errors surface through [`SessionLogObserver::take_error`] when the
/// writer is driven by the observer.
///
/// [`SessionLogObserver::take_error`]: crate::SessionLogObserver::take_error
pub trait OutputWriter {
    /// Write one finished session.
    fn write_session(&mut self, row: &SessionRow) -> OutputResult<()>;

    /// Write one tick summary row.
    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()>;

    /// Flush all underlying file handles.  Idempotent.
    fn finish(&mut self) -> OutputResult<()>;
}
