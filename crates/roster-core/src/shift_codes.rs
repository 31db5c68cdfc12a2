//! Shift-code lookup tables.
//!
//! Every data cell of the roster holds a short code. A code either names the
//! location the person works at that day, marks a non-work day, or is not
//! recognised at all. The last two both produce no entry but are kept apart so
//! callers can tell "day off" from "new code nobody taught us yet".

// ── Tables ────────────────────────────────────────────────────────────────────

/// Work codes and the location each one resolves to.
pub const SHIFT_CODES: &[(&str, &str)] = &[
    ("銀座", "銀座院"),
    ("大阪", "大阪院"),
    ("福岡", "福岡院"),
    ("池袋", "池袋院"),
    ("新宿", "新宿院"),
    ("静脈", "静脈科"),
    ("歯科", "歯科"),
];

/// Codes meaning the person is not working: day off, requested off, paid
/// leave, and a blank cell.
pub const NON_WORK_CODES: &[&str] = &["休", "希", "有", ""];

// ── Classification ────────────────────────────────────────────────────────────

/// Outcome of classifying one (already trimmed) cell value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftClass {
    /// A work shift at the given location.
    Work(&'static str),
    /// An explicit non-work marker.
    NonWork,
    /// Not in either table.
    Unknown,
}

impl ShiftClass {
    /// Short label used in log output.
    pub fn as_str(&self) -> &'static str {
        match self {
            ShiftClass::Work(_) => "work",
            ShiftClass::NonWork => "non-work",
            ShiftClass::Unknown => "unknown",
        }
    }
}

/// Whether `code` is one of the non-work markers.
pub fn is_non_work(code: &str) -> bool {
    NON_WORK_CODES.contains(&code)
}

/// Resolve a work code to its location name.
pub fn location_for(code: &str) -> Option<&'static str> {
    SHIFT_CODES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, location)| *location)
}

/// Classify a trimmed cell value.
///
/// The non-work set is consulted first, then the work table.
pub fn classify(code: &str) -> ShiftClass {
    if is_non_work(code) {
        return ShiftClass::NonWork;
    }
    match location_for(code) {
        Some(location) => ShiftClass::Work(location),
        None => ShiftClass::Unknown,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
