use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, RosterError};

/// Default shift start used by calendar exporters when the sheet gives none.
pub const DEFAULT_START_TIME: &str = "09:00";

/// Default shift end used by calendar exporters when the sheet gives none.
pub const DEFAULT_END_TIME: &str = "18:00";

/// Cell values of one worksheet, row-major. Rows may be ragged and empty
/// cells are empty strings.
pub type RawGrid = Vec<Vec<String>>;

/// One named tab of a workbook together with its cell values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worksheet {
    /// Tab title as shown in the spreadsheet UI, e.g. `"2026.3月"`.
    pub title: String,
    /// Full cell grid of the tab.
    #[serde(default)]
    pub values: RawGrid,
}

impl Worksheet {
    pub fn new(title: impl Into<String>, values: RawGrid) -> Self {
        Self {
            title: title.into(),
            values,
        }
    }

    /// Number of rows in the grid.
    pub fn row_count(&self) -> usize {
        self.values.len()
    }

    /// Width of the widest row.
    pub fn col_count(&self) -> usize {
        self.values.iter().map(Vec::len).max().unwrap_or(0)
    }
}

/// A calendar month, validated so that `month` is always in `1..=12`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    /// Build a month, rejecting months outside `1..=12`.
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(RosterError::InvalidMonth(format!("{}-{}", year, month)));
        }
        Ok(Self { year, month })
    }

    /// The worksheet title that holds this month's roster, e.g. `"2026.3月"`.
    ///
    /// The month is written without zero padding.
    pub fn sheet_title(&self) -> String {
        format!("{}.{}月", self.year, self.month)
    }

    /// The date for `day` in this month, or `None` when the day does not
    /// exist (0, or past the end of the month).
    pub fn date(&self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, day)
    }

    /// Whether `date` falls inside this month.
    pub fn contains(&self, date: NaiveDate) -> bool {
        use chrono::Datelike as _;
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// One normalised shift: a person working at a location on a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// ISO date, `YYYY-MM-DD`.
    pub date: String,
    /// Name from the row's name column.
    pub subject_name: String,
    /// Human-readable location resolved from the shift code.
    pub location_name: String,
    /// `HH:MM`, or empty when the sheet carries no time.
    #[serde(default)]
    pub start_time: String,
    /// `HH:MM`, or empty when the sheet carries no time.
    #[serde(default)]
    pub end_time: String,
}

impl ScheduleEntry {
    /// Build an entry with empty start/end times.
    pub fn new(date: NaiveDate, subject_name: &str, location_name: &str) -> Self {
        Self {
            date: date.format("%Y-%m-%d").to_string(),
            subject_name: subject_name.to_string(),
            location_name: location_name.to_string(),
            start_time: String::new(),
            end_time: String::new(),
        }
    }

    /// Sort key: ISO date first, then name.
    pub fn sort_key(&self) -> (&str, &str) {
        (&self.date, &self.subject_name)
    }

    /// Parse `date` back into a [`NaiveDate`].
    pub fn naive_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }
}

/// Return copies of `entries` whose empty start/end times are replaced by
/// `start` / `end`. Dates, names and locations are left as they are.
pub fn fill_default_times(entries: &[ScheduleEntry], start: &str, end: &str) -> Vec<ScheduleEntry> {
    entries
        .iter()
        .map(|e| {
            let mut filled = e.clone();
            if filled.start_time.is_empty() {
                filled.start_time = start.to_string();
            }
            if filled.end_time.is_empty() {
                filled.end_time = end.to_string();
            }
            filled
        })
        .collect()
}

/// Keep only the entries on `date`, preserving order.
pub fn filter_by_date(entries: Vec<ScheduleEntry>, date: NaiveDate) -> Vec<ScheduleEntry> {
    let key = date.format("%Y-%m-%d").to_string();
    entries.into_iter().filter(|e| e.date == key).collect()
}

// ── Tests ──────────────────────────────────────────────────────────────────────
