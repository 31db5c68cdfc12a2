use chrono::{Datelike, NaiveDate, Utc, Weekday};
use chrono_tz::Tz;
use regex::Regex;
use tracing::warn;

use crate::error::{Result, RosterError};
use crate::models::YearMonth;

// ── System timezone detection ─────────────────────────────────────────────────

/// Detect the IANA timezone name of the running system.
///
/// Uses the `iana-time-zone` crate directly – no subprocess calls.
/// Falls back to `"UTC"` if detection fails.
pub fn get_system_timezone() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string())
}

// ── TimezoneHandler ───────────────────────────────────────────────────────────

/// Resolves "today" in a fixed local calendar.
///
/// The roster is a plain local-date calendar; the timezone only decides which
/// day it is right now.
pub struct TimezoneHandler {
    default_tz: Tz,
}

impl TimezoneHandler {
    /// Create a handler for `tz_name`.
    ///
    /// `"auto"` resolves to the system timezone. An unrecognised name falls
    /// back to UTC and logs a warning.
    pub fn new(tz_name: &str) -> Self {
        let resolved = if tz_name == "auto" {
            get_system_timezone()
        } else {
            tz_name.to_string()
        };
        let tz = resolved.parse::<Tz>().unwrap_or_else(|_| {
            warn!(
                "TimezoneHandler: unrecognised timezone \"{}\", falling back to UTC",
                resolved
            );
            Tz::UTC
        });
        Self { default_tz: tz }
    }

    /// Validate that `tz_name` is a recognised IANA timezone identifier.
    pub fn validate_timezone(tz_name: &str) -> bool {
        tz_name.parse::<Tz>().is_ok()
    }

    /// The current calendar date in the handler's timezone.
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.default_tz).date_naive()
    }

    /// The current calendar month in the handler's timezone.
    pub fn current_year_month(&self) -> YearMonth {
        let today = self.today();
        YearMonth {
            year: today.year(),
            month: today.month(),
        }
    }

    /// Expose the configured default timezone.
    pub fn default_tz(&self) -> Tz {
        self.default_tz
    }
}

// ── Month / day specifiers ────────────────────────────────────────────────────

/// Parse a `"YYYY-MM"` month specifier.
///
/// The month may be written with or without a leading zero (`2026-3` and
/// `2026-03` are both accepted). Anything else, including surrounding
/// whitespace, is [`RosterError::InvalidMonth`].
pub fn parse_month_spec(spec: &str) -> Result<YearMonth> {
    let re = Regex::new(r"^([0-9]{4})-([0-9]{1,2})$").expect("regex is valid");
    let caps = re
        .captures(spec)
        .ok_or_else(|| RosterError::InvalidMonth(spec.to_string()))?;

    let year: i32 = caps[1]
        .parse()
        .map_err(|_| RosterError::InvalidMonth(spec.to_string()))?;
    let month: u32 = caps[2]
        .parse()
        .map_err(|_| RosterError::InvalidMonth(spec.to_string()))?;

    YearMonth::new(year, month).map_err(|_| RosterError::InvalidMonth(spec.to_string()))
}

/// Parse a `"YYYY-MM-DD"` day specifier.
pub fn parse_day_spec(spec: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(spec, "%Y-%m-%d")
        .map_err(|_| RosterError::InvalidDate(spec.to_string()))
}

/// Resolve the target month: the explicit specifier when given, otherwise
/// the current month in `timezone`.
pub fn resolve_month(spec: Option<&str>, timezone: &str) -> Result<YearMonth> {
    match spec {
        Some(s) => parse_month_spec(s),
        None => Ok(TimezoneHandler::new(timezone).current_year_month()),
    }
}

// ── Weekday labels ────────────────────────────────────────────────────────────

/// Single-character Japanese weekday label (`月` … `日`).
pub fn weekday_label_ja(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Mon => "月",
        Weekday::Tue => "火",
        Weekday::Wed => "水",
        Weekday::Thu => "木",
        Weekday::Fri => "金",
        Weekday::Sat => "土",
        Weekday::Sun => "日",
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── parse_month_spec ─────────────────────────────────────────────────────

    #[test]
    fn test_parse_month_spec_padded() {
        let ym = parse_month_spec("2026-03").unwrap();
        assert_eq!(ym, YearMonth { year: 2026, month: 3 });
    }

    #[test]
    fn test_parse_month_spec_unpadded() {
        let ym = parse_month_spec("2026-3").unwrap();
        assert_eq!(ym.month, 3);
    }

    #[test]
    fn test_parse_month_spec_rejects_bad_month() {
        assert!(matches!(
            parse_month_spec("2026-13"),
            Err(RosterError::InvalidMonth(_))
        ));
        assert!(matches!(
            parse_month_spec("2026-00"),
            Err(RosterError::InvalidMonth(_))
        ));
    }

    #[test]
    fn test_parse_month_spec_rejects_other_shapes() {
        for bad in ["", "2026", "2026/03", "26-03", "2026-03-01", " 2026-03", "March"] {
            match parse_month_spec(bad) {
                Err(RosterError::InvalidMonth(s)) => assert_eq!(s, bad),
                other => panic!("expected InvalidMonth for {:?}, got {:?}", bad, other),
            }
        }
    }

    #[test]
    fn test_parse_month_spec_rejects_non_ascii_digits() {
        assert!(parse_month_spec("２０２６-０３").is_err());
    }

    // ── parse_day_spec ───────────────────────────────────────────────────────

    #[test]
    fn test_parse_day_spec_valid() {
        let d = parse_day_spec("2026-03-01").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
    }

    #[test]
    fn test_parse_day_spec_invalid() {
        assert!(matches!(
            parse_day_spec("2026-02-30"),
            Err(RosterError::InvalidDate(_))
        ));
        assert!(matches!(
            parse_day_spec("yesterday"),
            Err(RosterError::InvalidDate(_))
        ));
    }

    // ── resolve_month ────────────────────────────────────────────────────────

    #[test]
    fn test_resolve_month_explicit_wins() {
        let ym = resolve_month(Some("2026-03"), "Asia/Tokyo").unwrap();
        assert_eq!(ym.to_string(), "2026-03");
    }

    #[test]
    fn test_resolve_month_defaults_to_current() {
        let ym = resolve_month(None, "UTC").unwrap();
        let today = Utc::now().date_naive();
        // Allow for a month rollover between the two clock reads.
        assert!(ym.contains(today) || ym.month != today.month());
        assert!((1..=12).contains(&ym.month));
    }

    #[test]
    fn test_resolve_month_propagates_format_error() {
        assert!(resolve_month(Some("bad"), "UTC").is_err());
    }

    // ── TimezoneHandler ──────────────────────────────────────────────────────

    #[test]
    fn test_validate_timezone() {
        assert!(TimezoneHandler::validate_timezone("Asia/Tokyo"));
        assert!(TimezoneHandler::validate_timezone("UTC"));
        assert!(!TimezoneHandler::validate_timezone("Mars/Olympus"));
        assert!(!TimezoneHandler::validate_timezone(""));
    }

    #[test]
    fn test_new_valid_timezone() {
        let handler = TimezoneHandler::new("Asia/Tokyo");
        assert_eq!(handler.default_tz(), Tz::Asia__Tokyo);
    }

    #[test]
    fn test_new_invalid_timezone_falls_back_to_utc() {
        let handler = TimezoneHandler::new("Invalid/Timezone");
        assert_eq!(handler.default_tz(), Tz::UTC);
    }

    #[test]
    fn test_today_matches_current_year_month() {
        let handler = TimezoneHandler::new("Asia/Tokyo");
        let ym = handler.current_year_month();
        let today = handler.today();
        assert!(ym.contains(today) || ym.month != today.month());
    }

    // ── weekday_label_ja ─────────────────────────────────────────────────────

    #[test]
    fn test_weekday_label_ja() {
        // 2026-03-01 is a Sunday.
        let d = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        assert_eq!(weekday_label_ja(d), "日");
        assert_eq!(weekday_label_ja(d.succ_opt().unwrap()), "月");
    }

    // ── get_system_timezone ──────────────────────────────────────────────────

    #[test]
    fn test_get_system_timezone_returns_nonempty_string() {
        assert!(!get_system_timezone().is_empty());
    }
}
