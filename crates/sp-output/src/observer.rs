//! `SessionLogObserver<W>` bridges `PreemptionObserver` to an `OutputWriter`.

use sp_core::Tick;
use sp_preempt::{PreemptionObserver, RunSummary, ScanReport, SessionReport};

use crate::row::{SessionRow, TickSummaryRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`PreemptionObserver`] that logs every session and every scanned tick
/// to an [`OutputWriter`].
///
/// Errors from the writer are stored internally because observer methods
/// have no return value.  After `control.run()` returns, check for errors
/// with [`take_error`][Self::take_error].
pub struct SessionLogObserver<W: OutputWriter> {
    writer:     W,
    sessions:   usize,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SessionLogObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, sessions: 0, last_error: None }
    }

    /// Sessions written so far.
    pub fn sessions_written(&self) -> usize {
        self.sessions
    }

    /// Take the stored write error (if any).
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                tracing::warn!(error = %e, "session log write failed");
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> PreemptionObserver for SessionLogObserver<W> {
    fn on_tick_end(&mut self, tick: Tick, scan: &ScanReport) {
        let result = self.writer.write_tick_summary(&TickSummaryRow::new(tick, scan));
        self.store_err(result);
    }

    fn on_session_end(&mut self, report: &SessionReport) {
        let result = self.writer.write_session(&SessionRow::from(report));
        if result.is_ok() {
            self.sessions += 1;
        }
        self.store_err(result);
    }

    fn on_run_end(&mut self, _summary: &RunSummary) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
