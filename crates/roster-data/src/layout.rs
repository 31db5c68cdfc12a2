//! Structural checks on a roster grid.
//!
//! The mapper and extractor trust a fixed physical layout and quietly produce
//! fewer entries when it drifts. These checks make drift visible in the logs
//! without ever failing the extraction.

use std::fmt;

use chrono::Datelike;
use roster_core::models::RawGrid;

use crate::grid::{DateColumnMap, FIRST_DATA_ROW, FIRST_DATE_COLUMN, NAME_COLUMN};

/// One suspicious property of a roster grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutWarning {
    /// The header row produced no dates at all.
    NoDateColumns,
    /// Consecutive mapped columns do not advance by exactly one day.
    DayGap { col: usize, expected: u32, found: u32 },
    /// A day number appears in more than one header column.
    DuplicateDay { day: u32, cols: Vec<usize> },
    /// A data row has content in the date area but no name.
    UnnamedRowWithData { row: usize },
}

impl fmt::Display for LayoutWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutWarning::NoDateColumns => write!(f, "date header row has no day numbers"),
            LayoutWarning::DayGap { col, expected, found } => write!(
                f,
                "column {} has day {} where day {} was expected",
                col, found, expected
            ),
            LayoutWarning::DuplicateDay { day, cols } => {
                write!(f, "day {} appears in columns {:?}", day, cols)
            }
            LayoutWarning::UnnamedRowWithData { row } => {
                write!(f, "row {} has shift cells but no name", row)
            }
        }
    }
}

/// All warnings found for one grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutReport {
    pub warnings: Vec<LayoutWarning>,
}

impl LayoutReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Inspect `grid` and its `date_map` for signs of a changed layout.
pub fn validate_layout(grid: &RawGrid, date_map: &DateColumnMap) -> LayoutReport {
    let mut warnings = Vec::new();

    if date_map.is_empty() {
        warnings.push(LayoutWarning::NoDateColumns);
    }

    let mut cols_by_day: std::collections::BTreeMap<u32, Vec<usize>> =
        std::collections::BTreeMap::new();
    for (&col, date) in date_map {
        cols_by_day.entry(date.day()).or_default().push(col);
    }
    for (day, cols) in cols_by_day {
        if cols.len() > 1 {
            warnings.push(LayoutWarning::DuplicateDay { day, cols });
        }
    }

    let mut previous: Option<u32> = None;
    for (&col, date) in date_map {
        let day = date.day();
        if let Some(prev) = previous {
            if day != prev + 1 && day != prev {
                warnings.push(LayoutWarning::DayGap {
                    col,
                    expected: prev + 1,
                    found: day,
                });
            }
        }
        previous = Some(day);
    }

    for (row_idx, row) in grid.iter().enumerate().skip(FIRST_DATA_ROW) {
        let named = row
            .get(NAME_COLUMN)
            .map(|c| !c.trim().is_empty())
            .unwrap_or(false);
        let has_shift_cells = row
            .iter()
            .skip(FIRST_DATE_COLUMN)
            .any(|c| !c.trim().is_empty());
        if !named && has_shift_cells {
            warnings.push(LayoutWarning::UnnamedRowWithData { row: row_idx });
        }
    }

    LayoutReport { warnings }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
