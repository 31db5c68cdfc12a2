//! Runtime layer for Docrot.
//!
//! Holds long-lived state between extractions: an opened workbook source and
//! the per-month result cache in front of it.

pub mod schedule_manager;

pub use roster_core as core;
pub use roster_data as data;
