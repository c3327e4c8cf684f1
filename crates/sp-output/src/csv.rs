//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `sessions.csv`
//! - `tick_summaries.csv`

use std::fs::{self, File};
use std::path::Path;

use csv::{Writer, WriterBuilder};

use crate::row::{SESSION_HEADERS, TICK_SUMMARY_HEADERS};
use crate::writer::OutputWriter;
use crate::{OutputResult, SessionRow, TickSummaryRow};

/// Writes session logs to two CSV files.
pub struct CsvWriter {
    sessions:  Writer<File>,
    summaries: Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Create `dir` if needed, open (or truncate) the two CSV files in it
    /// and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        fs::create_dir_all(dir)?;

        let mut sessions = open(&dir.join("sessions.csv"))?;
        sessions.write_record(SESSION_HEADERS)?;

        let mut summaries = open(&dir.join("tick_summaries.csv"))?;
        summaries.write_record(TICK_SUMMARY_HEADERS)?;

        tracing::debug!(dir = %dir.display(), "csv output opened");
        Ok(Self { sessions, summaries, finished: false })
    }
}

/// Headers are written by hand so that files with no rows still carry them.
fn open(path: &Path) -> OutputResult<Writer<File>> {
    Ok(WriterBuilder::new().has_headers(false).from_path(path)?)
}

impl OutputWriter for CsvWriter {
    fn write_session(&mut self, row: &SessionRow) -> OutputResult<()> {
        self.sessions.serialize(row)?;
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.summaries.serialize(row)?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.sessions.flush()?;
        self.summaries.flush()?;
        Ok(())
    }
}
