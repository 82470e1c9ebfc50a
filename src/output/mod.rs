//! Where accepted readings go.
//!
//! Every reading is written twice: as a row of the CSV log, which is the
//! durable record, and as a status line on the console for live feedback.
//! Both writers are generic over [`std::io::Write`] so tests can capture
//! their output in memory.

mod console;
mod csv_log;

pub use console::{ConsoleReporter, ReportStyle};
pub use csv_log::CsvLog;
