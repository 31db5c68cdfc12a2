//! Plain-text and JSON renderings of extracted rosters for terminal output.

use unicode_width::UnicodeWidthStr;

use crate::error::Result;
use crate::models::{ScheduleEntry, Worksheet};
use crate::time_utils::weekday_label_ja;

/// Right-pad `text` with spaces to `width` terminal columns.
///
/// Width is measured in display columns, so CJK names line up with ASCII ones.
///
/// # Examples
///
/// ```
/// use roster_core::formatting::pad_display;
///
/// assert_eq!(pad_display("ab", 4), "ab  ");
/// assert_eq!(pad_display("田中", 6), "田中  ");
/// assert_eq!(pad_display("toolong", 3), "toolong");
/// ```
pub fn pad_display(text: &str, width: usize) -> String {
    let current = UnicodeWidthStr::width(text);
    if current >= width {
        return text.to_string();
    }
    format!("{}{}", text, " ".repeat(width - current))
}

/// Format `date` as `"2026-03-01 (日)"`, falling back to the raw string when
/// it is not an ISO date.
pub fn format_date_with_weekday(entry: &ScheduleEntry) -> String {
    match entry.naive_date() {
        Some(d) => format!("{} ({})", entry.date, weekday_label_ja(d)),
        None => entry.date.clone(),
    }
}

/// Render entries as an aligned text table with a header row.
///
/// The time column is omitted when no entry carries a start or end time.
pub fn format_entries_table(entries: &[ScheduleEntry]) -> String {
    let show_times = entries
        .iter()
        .any(|e| !e.start_time.is_empty() || !e.end_time.is_empty());

    let dates: Vec<String> = entries.iter().map(format_date_with_weekday).collect();

    let date_w = column_width("Date", dates.iter().map(String::as_str));
    let name_w = column_width("Name", entries.iter().map(|e| e.subject_name.as_str()));
    let loc_w = column_width(
        "Location",
        entries.iter().map(|e| e.location_name.as_str()),
    );

    let mut out = String::new();
    let mut header = format!(
        "{}  {}  {}",
        pad_display("Date", date_w),
        pad_display("Name", name_w),
        pad_display("Location", loc_w)
    );
    if show_times {
        header.push_str("  Time");
    }
    out.push_str(header.trim_end());
    out.push('\n');

    for (entry, date) in entries.iter().zip(&dates) {
        let mut line = format!(
            "{}  {}  {}",
            pad_display(date, date_w),
            pad_display(&entry.subject_name, name_w),
            pad_display(&entry.location_name, loc_w)
        );
        if show_times {
            line.push_str(&format!("  {}-{}", entry.start_time, entry.end_time));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out
}

/// Render entries as a pretty-printed JSON array.
pub fn format_entries_json(entries: &[ScheduleEntry]) -> Result<String> {
    Ok(serde_json::to_string_pretty(entries)?)
}

/// Number of rows after the header shown per sheet by [`format_sheet_summary`].
pub const SAMPLE_ROWS: usize = 3;

/// One-block summary per worksheet: title, dimensions, first row and up to
/// [`SAMPLE_ROWS`] rows after it.
pub fn format_sheet_summary(worksheets: &[Worksheet]) -> String {
    let mut out = String::new();
    for ws in worksheets {
        out.push_str(&format!(
            "--- {} (rows={}, cols={}) ---\n",
            ws.title,
            ws.row_count(),
            ws.col_count()
        ));
        let Some(first) = ws.values.first() else {
            continue;
        };
        out.push_str(&format!("  header: {}\n", first.join(" | ")));
        for (i, row) in ws.values.iter().skip(1).take(SAMPLE_ROWS).enumerate() {
            out.push_str(&format!("  row {}: {}\n", i + 1, row.join(" | ")));
        }
    }
    out
}

fn column_width<'a>(header: &str, values: impl Iterator<Item = &'a str>) -> usize {
    values
        .map(UnicodeWidthStr::width)
        .chain(std::iter::once(UnicodeWidthStr::width(header)))
        .max()
        .unwrap_or(0)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(date: &str, name: &str, location: &str) -> ScheduleEntry {
        ScheduleEntry {
            date: date.to_string(),
            subject_name: name.to_string(),
            location_name: location.to_string(),
            start_time: String::new(),
            end_time: String::new(),
        }
    }

    // ── pad_display ──────────────────────────────────────────────────────────

    #[test]
    fn test_pad_display_counts_wide_chars_twice() {
        assert_eq!(pad_display("銀座院", 8), "銀座院  ");
        assert_eq!(UnicodeWidthStr::width(pad_display("銀座院", 8).as_str()), 8);
    }

    // ── format_date_with_weekday ─────────────────────────────────────────────

    #[test]
    fn test_format_date_with_weekday() {
        let e = entry("2026-03-02", "王", "新宿院");
        assert_eq!(format_date_with_weekday(&e), "2026-03-02 (月)");
    }

    #[test]
    fn test_format_date_with_weekday_non_iso_passthrough() {
        let e = entry("someday", "王", "新宿院");
        assert_eq!(format_date_with_weekday(&e), "someday");
    }

    // ── format_entries_table ─────────────────────────────────────────────────

    #[test]
    fn test_format_entries_table_aligns_columns() {
        let entries = vec![
            entry("2026-03-01", "田中", "銀座院"),
            entry("2026-03-01", "Smith", "歯科"),
        ];
        let table = format_entries_table(&entries);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Date"));
        assert!(!lines[0].contains("Time"));

        // Location column starts at the same display offset on every row.
        let offsets: Vec<usize> = lines[1..]
            .iter()
            .map(|l| {
                let idx = l.find(|c: char| c == '銀' || c == '歯').unwrap();
                UnicodeWidthStr::width(&l[..idx])
            })
            .collect();
        assert_eq!(offsets[0], offsets[1]);
    }

    #[test]
    fn test_format_entries_table_shows_times_when_present() {
        let mut e = entry("2026-03-01", "田中", "銀座院");
        e.start_time = "09:00".to_string();
        e.end_time = "18:00".to_string();
        let table = format_entries_table(&[e]);
        assert!(table.lines().next().unwrap().ends_with("Time"));
        assert!(table.contains("09:00-18:00"));
    }

    #[test]
    fn test_format_entries_table_empty_has_header_only() {
        let table = format_entries_table(&[]);
        assert_eq!(table.lines().count(), 1);
    }

    // ── format_entries_json ──────────────────────────────────────────────────

    #[test]
    fn test_format_entries_json_is_array() {
        let json = format_entries_json(&[entry("2026-03-01", "田中", "銀座院")]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 1);
        assert_eq!(value[0]["location_name"], "銀座院");
    }

    // ── format_sheet_summary ─────────────────────────────────────────────────

    #[test]
    fn test_format_sheet_summary() {
        let ws = Worksheet::new(
            "2026.3月",
            vec![vec!["Drシフト".to_string(), "".to_string()]],
        );
        let out = format_sheet_summary(&[ws]);
        assert!(out.contains("--- 2026.3月 (rows=1, cols=2) ---"));
        assert!(out.contains("header: Drシフト | "));
        assert!(!out.contains("row 1:"));
    }

    #[test]
    fn test_format_sheet_summary_sample_rows() {
        let values: Vec<Vec<String>> = (0..6).map(|i| vec![format!("r{}", i)]).collect();
        let out = format_sheet_summary(&[Worksheet::new("2026.3月", values)]);
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(
            lines,
            vec![
                "--- 2026.3月 (rows=6, cols=1) ---",
                "  header: r0",
                "  row 1: r1",
                "  row 2: r2",
                "  row 3: r3",
            ]
        );
    }

    #[test]
    fn test_format_sheet_summary_empty_sheet() {
        let out = format_sheet_summary(&[Worksheet::new("空", vec![])]);
        assert_eq!(out, "--- 空 (rows=0, cols=0) ---\n");
    }
}
