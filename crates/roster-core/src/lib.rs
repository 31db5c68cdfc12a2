//! Core types for the doctor-shift roster extractor.
//!
//! Holds the data model, the shift-code tables, month/day parsing, error
//! types, CLI settings and terminal formatting shared by the other crates.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod shift_codes;
pub mod time_utils;
