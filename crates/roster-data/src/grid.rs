//! Column → date mapping for a roster worksheet.
//!
//! The roster tab has a fixed physical layout:
//!
//! ```text
//! row 0   title
//! row 1   (blank)
//! row 2   day-of-month header, from column 2 onward   <- DATE_HEADER_ROW
//! row 3   weekday header
//! row 4+  one row per person, name in column 1        <- FIRST_DATA_ROW
//! ```

use std::collections::BTreeMap;

use chrono::NaiveDate;
use roster_core::models::{RawGrid, YearMonth};
use tracing::debug;

// ── Layout ────────────────────────────────────────────────────────────────────

/// Row holding day-of-month numbers.
pub const DATE_HEADER_ROW: usize = 2;

/// First row holding per-person shifts.
pub const FIRST_DATA_ROW: usize = 4;

/// Column holding the person's name.
pub const NAME_COLUMN: usize = 1;

/// First column that can carry a day number.
pub const FIRST_DATE_COLUMN: usize = 2;

/// Grids with fewer rows than this carry no data rows at all.
pub const MIN_GRID_ROWS: usize = 5;

/// Column index → calendar date. Iterates in ascending column order.
pub type DateColumnMap = BTreeMap<usize, NaiveDate>;

// ── Mapping ───────────────────────────────────────────────────────────────────

/// Whether `grid` is too small to hold any roster data.
pub fn is_undersized(grid: &RawGrid) -> bool {
    grid.len() < MIN_GRID_ROWS
}

/// Build the column → date map from the header row.
///
/// Cells that are blank, non-numeric, or name a day that does not exist in
/// the month (e.g. `31` in April) are left out of the map. A grid without a
/// header row yields an empty map.
pub fn build_date_map(grid: &RawGrid, year: i32, month: u32) -> DateColumnMap {
    match YearMonth::new(year, month) {
        Ok(ym) => build_date_map_for(grid, ym),
        Err(_) => DateColumnMap::new(),
    }
}

/// [`build_date_map`] for an already validated month.
pub fn build_date_map_for(grid: &RawGrid, ym: YearMonth) -> DateColumnMap {
    let mut map = DateColumnMap::new();

    let Some(header) = grid.get(DATE_HEADER_ROW) else {
        return map;
    };

    for (col, cell) in header.iter().enumerate().skip(FIRST_DATE_COLUMN) {
        let Some(day) = parse_day(cell.trim()) else {
            continue;
        };
        match ym.date(day) {
            Some(date) => {
                map.insert(col, date);
            }
            None => debug!(col, day, "header day outside month; column skipped"),
        }
    }

    map
}

/// Parse a header cell made only of decimal digits.
///
/// Half-width and full-width digits are both accepted; anything else, an
/// empty string, or a value too large for `u32` gives `None`.
pub fn parse_day(cell: &str) -> Option<u32> {
    if cell.is_empty() {
        return None;
    }
    cell.chars().try_fold(0u32, |acc, c| {
        let digit = match c {
            '0'..='9' => c as u32 - '0' as u32,
            '０'..='９' => c as u32 - '０' as u32,
            _ => return None,
        };
        acc.checked_mul(10)?.checked_add(digit)
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
