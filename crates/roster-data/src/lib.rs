//! Roster extraction for Docrot.
//!
//! Picks the month's worksheet from a workbook source, maps the date header
//! to calendar days and turns shift cells into sorted schedule entries.

pub mod extractor;
pub mod grid;
pub mod layout;
pub mod locator;
pub mod pipeline;
pub mod workbook;

pub use roster_core as core;
