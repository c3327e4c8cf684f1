//! `sp-output` — session log writers for the signal-preemption workspace.
//!
//! | Backend | Files created                           |
//! |---------|-----------------------------------------|
//! | CSV     | `sessions.csv`, `tick_summaries.csv`    |
//!
//! Writers implement [`OutputWriter`] and are driven by
//! [`SessionLogObserver`], which implements
//! `sp_preempt::PreemptionObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use sp_output::{CsvWriter, SessionLogObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = SessionLogObserver::new(writer);
//! control.run(&mut obs)?;
//! obs.take_error().map(|e| eprintln!("output error: {e}"));
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(test)]
mod tests;

pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::SessionLogObserver;
pub use row::{SessionRow, TickSummaryRow};
pub use writer::OutputWriter;
