//! Worksheet selection for a target month.
//!
//! Month tabs are titled `"{year}.{month}月"`. Editors duplicate tabs freely,
//! so a workbook may also hold `"2026.3月のコピー"` or `"2026.3月 (old)"`. An
//! exact title always wins; a prefix match is only a fallback.

use roster_core::error::{Result, RosterError};
use roster_core::models::{Worksheet, YearMonth};
use tracing::debug;

/// Anything that carries a worksheet title.
pub trait SheetTitle {
    fn sheet_title(&self) -> &str;
}

impl SheetTitle for Worksheet {
    fn sheet_title(&self) -> &str {
        &self.title
    }
}

impl SheetTitle for String {
    fn sheet_title(&self) -> &str {
        self
    }
}

impl SheetTitle for &str {
    fn sheet_title(&self) -> &str {
        self
    }
}

/// Select the worksheet for `year`/`month`.
///
/// Two full passes over `worksheets`, both in source order: the first looks
/// for a title equal to the target, the second (only when the first found
/// nothing) for a title starting with it. Fails with
/// [`RosterError::SheetNotFound`] carrying the target title.
pub fn locate<S: SheetTitle>(worksheets: &[S], year: i32, month: u32) -> Result<&S> {
    let index = locate_index(worksheets, &format!("{}.{}月", year, month))?;
    Ok(&worksheets[index])
}

/// [`locate`] for an already validated month.
pub fn locate_month<S: SheetTitle>(worksheets: &[S], ym: YearMonth) -> Result<&S> {
    let index = locate_index(worksheets, &ym.sheet_title())?;
    Ok(&worksheets[index])
}

/// Position of the worksheet matching `target`, exact match first.
pub fn locate_index<S: SheetTitle>(worksheets: &[S], target: &str) -> Result<usize> {
    if let Some(i) = worksheets.iter().position(|ws| ws.sheet_title() == target) {
        debug!(target, index = i, "worksheet matched exactly");
        return Ok(i);
    }

    if let Some(i) = worksheets
        .iter()
        .position(|ws| ws.sheet_title().starts_with(target))
    {
        debug!(
            target,
            index = i,
            title = worksheets[i].sheet_title(),
            "worksheet matched by prefix"
        );
        return Ok(i);
    }

    Err(RosterError::SheetNotFound(target.to_string()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
