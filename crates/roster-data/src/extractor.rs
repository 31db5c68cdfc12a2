//! Shift-entry extraction from a roster grid.
//!
//! Every malformed cell or row degrades to "no contribution": blank rows,
//! rows without a name, short rows, non-work markers and unknown codes are all
//! skipped without error.

use roster_core::models::{RawGrid, ScheduleEntry};
use roster_core::shift_codes::{classify, ShiftClass};
use tracing::{debug, trace};

use crate::grid::{DateColumnMap, FIRST_DATA_ROW, NAME_COLUMN};

/// Per-outcome cell counts from one extraction pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct ExtractionStats {
    /// Data rows that carried a name and were scanned.
    pub rows_scanned: usize,
    /// Rows where every cell was blank.
    pub blank_rows: usize,
    /// Rows with content but no name.
    pub unnamed_rows: usize,
    /// Cells that produced an entry.
    pub work_cells: usize,
    /// Cells holding a non-work marker.
    pub non_work_cells: usize,
    /// Cells holding an unrecognised code.
    pub unknown_cells: usize,
    /// Mapped columns past the end of a short row.
    pub missing_cells: usize,
}

/// Extract entries from `grid`, sorted by `(date, subject_name)`.
pub fn extract(grid: &RawGrid, date_map: &DateColumnMap) -> Vec<ScheduleEntry> {
    extract_with_stats(grid, date_map).0
}

/// [`extract`], also returning how each row and cell was classified.
pub fn extract_with_stats(
    grid: &RawGrid,
    date_map: &DateColumnMap,
) -> (Vec<ScheduleEntry>, ExtractionStats) {
    let mut stats = ExtractionStats::default();
    let mut entries: Vec<ScheduleEntry> = Vec::new();

    for (row_idx, row) in grid.iter().enumerate().skip(FIRST_DATA_ROW) {
        if row.iter().all(|cell| cell.trim().is_empty()) {
            stats.blank_rows += 1;
            continue;
        }

        let name = row.get(NAME_COLUMN).map(|c| c.trim()).unwrap_or("");
        if name.is_empty() {
            stats.unnamed_rows += 1;
            continue;
        }
        stats.rows_scanned += 1;

        for (&col, &date) in date_map {
            let Some(cell) = row.get(col) else {
                stats.missing_cells += 1;
                continue;
            };
            let code = cell.trim();

            let class = classify(code);
            match class {
                ShiftClass::Work(location) => {
                    stats.work_cells += 1;
                    entries.push(ScheduleEntry::new(date, name, location));
                    continue;
                }
                ShiftClass::NonWork => stats.non_work_cells += 1,
                ShiftClass::Unknown => stats.unknown_cells += 1,
            }
            trace!(row = row_idx, col, code, class = class.as_str(), "cell skipped");
        }
    }

    sort_entries(&mut entries);

    debug!(
        entries = entries.len(),
        rows = stats.rows_scanned,
        unknown = stats.unknown_cells,
        "extraction finished"
    );

    (entries, stats)
}

/// Stable sort by ISO date, then name. Equal keys keep scan order.
pub fn sort_entries(entries: &mut [ScheduleEntry]) {
    entries.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
}

// ── Tests ─────────────────────────────────────────────────────────────────────
