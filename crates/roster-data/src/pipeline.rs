//! End-to-end roster extraction.
//!
//! Resolves the target month, picks the month's worksheet from a
//! [`WorkbookSource`], maps header columns to dates and extracts the sorted
//! entry list. Only two things fail a run: a malformed month specifier and a
//! missing month tab. Everything wrong inside the grid degrades to fewer
//! entries.

use chrono::Utc;
use roster_core::error::Result;
use roster_core::models::{RawGrid, ScheduleEntry, Worksheet, YearMonth};
use roster_core::time_utils::resolve_month;
use tracing::{debug, info, warn};

use crate::extractor::{extract_with_stats, ExtractionStats};
use crate::grid::{build_date_map_for, is_undersized};
use crate::layout::validate_layout;
use crate::locator::{locate_index, locate_month};
use crate::workbook::WorkbookSource;

// ── Public types ──────────────────────────────────────────────────────────────

/// Metadata produced alongside the extracted entries.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ExtractionMetadata {
    /// ISO-8601 timestamp when this result was generated.
    pub generated_at: String,
    /// Month that was extracted.
    pub year_month: YearMonth,
    /// Title of the worksheet actually used.
    pub sheet_title: String,
    /// Rows in the worksheet grid.
    pub grid_rows: usize,
    /// Header columns that mapped to a date.
    pub date_columns: usize,
    /// Row and cell classification counts.
    pub stats: ExtractionStats,
    /// Layout warnings, rendered as text.
    pub layout_warnings: Vec<String>,
}

/// The complete output of [`fetch_schedule_for`].
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Entries sorted by `(date, subject_name)`.
    pub entries: Vec<ScheduleEntry>,
    /// Metadata about this run.
    pub metadata: ExtractionMetadata,
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Fetch the roster for `month` (`"YYYY-MM"`, or the current month in
/// `timezone` when `None`).
pub fn fetch_schedule(
    source: &dyn WorkbookSource,
    month: Option<&str>,
    timezone: &str,
) -> Result<Vec<ScheduleEntry>> {
    let ym = resolve_month(month, timezone)?;
    Ok(fetch_schedule_for(source, ym)?.entries)
}

/// Fetch the roster for an already resolved month, with run metadata.
pub fn fetch_schedule_for(source: &dyn WorkbookSource, ym: YearMonth) -> Result<ExtractionResult> {
    let titles = source.worksheet_titles()?;
    let index = locate_index(&titles, &ym.sheet_title())?;
    let title = &titles[index];

    let grid = source.worksheet_values(title)?;
    info!(
        "Extracting {} from worksheet \"{}\" ({} rows)",
        ym,
        title,
        grid.len()
    );

    Ok(extract_from_grid(&grid, title, ym))
}

/// Extract from worksheets that were already fetched.
pub fn extract_from_worksheets(worksheets: &[Worksheet], ym: YearMonth) -> Result<Vec<ScheduleEntry>> {
    let sheet = locate_month(worksheets, ym)?;
    Ok(extract_from_grid(&sheet.values, &sheet.title, ym).entries)
}

/// Run mapper, layout checks and extractor over one grid.
///
/// A grid with fewer than five rows yields no entries without touching the
/// mapper.
pub fn extract_from_grid(grid: &RawGrid, sheet_title: &str, ym: YearMonth) -> ExtractionResult {
    let mut metadata = ExtractionMetadata {
        generated_at: Utc::now().to_rfc3339(),
        year_month: ym,
        sheet_title: sheet_title.to_string(),
        grid_rows: grid.len(),
        date_columns: 0,
        stats: ExtractionStats::default(),
        layout_warnings: Vec::new(),
    };

    if is_undersized(grid) {
        debug!(rows = grid.len(), "grid too small; no roster data");
        return ExtractionResult {
            entries: Vec::new(),
            metadata,
        };
    }

    let date_map = build_date_map_for(grid, ym);
    metadata.date_columns = date_map.len();

    let report = validate_layout(grid, &date_map);
    for warning in &report.warnings {
        warn!(sheet = sheet_title, "layout: {}", warning);
    }
    metadata.layout_warnings = report.warnings.iter().map(|w| w.to_string()).collect();

    let (entries, stats) = extract_with_stats(grid, &date_map);
    metadata.stats = stats;

    ExtractionResult { entries, metadata }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workbook::InMemoryWorkbook;
    use roster_core::error::RosterError;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn march_grid() -> RawGrid {
        vec![
            row(&["2026年3月 Drシフト"]),
            row(&[]),
            row(&["", "", "1", "2"]),
            row(&["", "", "日", "月"]),
            row(&["", "田中", "銀座", "休"]),
        ]
    }

    fn march() -> YearMonth {
        YearMonth::new(2026, 3).unwrap()
    }

    #[test]
    fn test_concrete_scenario_single_entry() {
        let book = InMemoryWorkbook::new("t", vec![Worksheet::new("2026.3月", march_grid())]);
        let entries = fetch_schedule(&book, Some("2026-03"), "UTC").unwrap();

        assert_eq!(
            entries,
            vec![ScheduleEntry {
                date: "2026-03-01".to_string(),
                subject_name: "田中".to_string(),
                location_name: "銀座院".to_string(),
                start_time: String::new(),
                end_time: String::new(),
            }]
        );
    }

    #[test]
    fn test_exact_sheet_preferred_over_copy() {
        let mut copy = march_grid();
        copy[4] = row(&["", "コピー", "大阪", "大阪"]);
        let book = InMemoryWorkbook::new(
            "t",
            vec![
                Worksheet::new("2026.3月のコピー", copy),
                Worksheet::new("2026.3月", march_grid()),
            ],
        );
        let result = fetch_schedule_for(&book, march()).unwrap();
        assert_eq!(result.metadata.sheet_title, "2026.3月");
        assert_eq!(result.entries.len(), 1);
        assert_eq!(result.entries[0].subject_name, "田中");
    }

    #[test]
    fn test_prefix_fallback_when_no_exact_sheet() {
        let book = InMemoryWorkbook::new(
            "t",
            vec![Worksheet::new("2026.3月 確定", march_grid())],
        );
        let result = fetch_schedule_for(&book, march()).unwrap();
        assert_eq!(result.metadata.sheet_title, "2026.3月 確定");
        assert_eq!(result.entries.len(), 1);
    }

    #[test]
    fn test_missing_month_is_not_found() {
        let book = InMemoryWorkbook::new("t", vec![Worksheet::new("2026.2月", march_grid())]);
        match fetch_schedule(&book, Some("2026-03"), "UTC") {
            Err(RosterError::SheetNotFound(target)) => assert_eq!(target, "2026.3月"),
            other => panic!("expected SheetNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_month_spec_is_format_error() {
        let book = InMemoryWorkbook::new("t", vec![]);
        assert!(matches!(
            fetch_schedule(&book, Some("03/2026"), "UTC"),
            Err(RosterError::InvalidMonth(_))
        ));
    }

    #[test]
    fn test_undersized_grid_is_empty_not_error() {
        for rows in 0..5 {
            let grid: RawGrid = march_grid().into_iter().take(rows).collect();
            let book = InMemoryWorkbook::new("t", vec![Worksheet::new("2026.3月", grid)]);
            let result = fetch_schedule_for(&book, march()).unwrap();
            assert!(result.entries.is_empty(), "rows = {}", rows);
            assert_eq!(result.metadata.date_columns, 0);
        }
    }

    #[test]
    fn test_metadata_counts_and_layout_warnings() {
        let mut grid = march_grid();
        grid.push(row(&["", "", "大阪"]));
        let result = extract_from_grid(&grid, "2026.3月", march());

        assert_eq!(result.metadata.grid_rows, 6);
        assert_eq!(result.metadata.date_columns, 2);
        assert_eq!(result.metadata.stats.work_cells, 1);
        assert_eq!(result.metadata.stats.non_work_cells, 1);
        assert_eq!(result.metadata.stats.unnamed_rows, 1);
        assert_eq!(
            result.metadata.layout_warnings,
            vec!["row 5 has shift cells but no name".to_string()]
        );
    }

    #[test]
    fn test_extract_from_worksheets() {
        let sheets = vec![
            Worksheet::new("2026.2月", vec![]),
            Worksheet::new("2026.3月", march_grid()),
        ];
        let entries = extract_from_worksheets(&sheets, march()).unwrap();
        assert_eq!(entries.len(), 1);
        assert!(extract_from_worksheets(&sheets, YearMonth::new(2026, 4).unwrap()).is_err());
    }

    #[test]
    fn test_pipeline_is_idempotent() {
        let book = InMemoryWorkbook::new("t", vec![Worksheet::new("2026.3月", march_grid())]);
        let first = fetch_schedule(&book, Some("2026-03"), "UTC").unwrap();
        let second = fetch_schedule(&book, Some("2026-03"), "UTC").unwrap();
        assert_eq!(first, second);
    }
}
