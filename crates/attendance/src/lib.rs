//! Attendance core for Rollcall
//!
//! Scans of student QR codes become `present` entries ([`AttendanceRecorder`]),
//! closing a session backfills `absent` entries for everyone not scanned
//! ([`SessionFinalizer`]), and a month of entries is folded into a
//! per-student/per-day grid for export ([`MonthlyReportBuilder`]).
//!
//! Every operation goes through a [`document_store::DocumentStore`]; calendar
//! days are always derived in the course's configured time zone, never the
//! device's.

mod correction;
mod error;
mod export;
mod finalizer;
mod history;
mod recorder;
mod report;
mod repository;
mod roster;
mod zone;

#[cfg(test)]
mod testing;

pub use correction::*;
pub use error::*;
pub use export::*;
pub use finalizer::*;
pub use history::*;
pub use recorder::*;
pub use report::*;
pub use repository::*;
pub use roster::*;
pub use zone::*;
