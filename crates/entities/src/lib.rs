//! Core entity definitions for Rollcall.
//!
//! This crate defines the data types shared by the attendance core, the
//! document store and the HTTP server: courses, students, attendance entries
//! and calendar helpers. Field names serialize in camelCase so documents keep
//! the persisted layout used by the mobile client.

mod attendance;
mod calendar;
mod course;
mod student;

pub use attendance::*;
pub use calendar::*;
pub use course::*;
pub use student::*;
