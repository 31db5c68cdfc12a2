//! TTL-cached schedule manager.
//!
//! Wraps [`fetch_schedule_for`] with a per-month cache keyed by
//! `(source identity, year, month)`. A cached result is reused while it is
//! younger than the TTL and the source reports the same modification time it
//! had when the result was built. The source is re-read when its modification
//! time moves or a refresh is forced. Transient I/O failures, on re-read or on
//! fetch, are retried with a short back-off and fall back to the previous
//! result; a missing month tab or a bad month specifier is returned to the
//! caller immediately.

use std::collections::HashMap;
use std::thread;
use std::time::{Duration, Instant, SystemTime};

use roster_core::error::{Result, RosterError};
use roster_core::models::{ScheduleEntry, YearMonth};
use roster_core::time_utils::resolve_month;
use roster_data::pipeline::{fetch_schedule_for, ExtractionResult};
use roster_data::workbook::WorkbookSource;

// ── Defaults ──────────────────────────────────────────────────────────────────

/// Default cache TTL in seconds.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Maximum number of attempts for transient failures.
const MAX_RETRY_ATTEMPTS: u32 = 3;

// ── Cache types ───────────────────────────────────────────────────────────────

/// Identifies one cached extraction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub source: String,
    pub year_month: YearMonth,
}

struct CachedSchedule {
    result: ExtractionResult,
    fetched_at: Instant,
    source_modified: Option<SystemTime>,
}

// ── ScheduleManager ───────────────────────────────────────────────────────────

/// Cached front end over a [`WorkbookSource`].
///
/// # Example
/// ```no_run
/// use roster_core::models::YearMonth;
/// use roster_data::workbook::open_source;
/// use roster_runtime::schedule_manager::ScheduleManager;
///
/// let source = open_source(std::path::Path::new("roster.json")).unwrap();
/// let mut mgr = ScheduleManager::new(source, 300);
/// let result = mgr.get_schedule(YearMonth::new(2026, 3).unwrap(), false).unwrap();
/// println!("{} entries", result.entries.len());
/// ```
pub struct ScheduleManager {
    source: Box<dyn WorkbookSource>,
    /// Modification time of the source when it was last (re)read.
    source_seen: Option<SystemTime>,
    cache_ttl: Duration,
    cache: HashMap<CacheKey, CachedSchedule>,
    last_error: Option<String>,
}

impl ScheduleManager {
    /// Create a manager over `source` with a TTL of `cache_ttl_secs`.
    pub fn new(source: Box<dyn WorkbookSource>, cache_ttl_secs: u64) -> Self {
        let source_seen = source.modified();
        Self {
            source,
            source_seen,
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            cache: HashMap::new(),
            last_error: None,
        }
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// The wrapped source.
    pub fn source(&self) -> &dyn WorkbookSource {
        self.source.as_ref()
    }

    /// Return the extraction for `ym`, using the cache when it is still valid.
    ///
    /// `force_refresh` bypasses the cache and re-reads the source. Otherwise
    /// the source is re-read only when its modification time moved since it
    /// was last read.
    pub fn get_schedule(&mut self, ym: YearMonth, force_refresh: bool) -> Result<&ExtractionResult> {
        let key = self.key_for(ym);

        if !force_refresh && self.is_cache_valid(&key) {
            tracing::debug!(month = %ym, "returning cached schedule");
            return Ok(&self.cache[&key].result);
        }

        match self.reload(ym, force_refresh) {
            Ok(result) => {
                tracing::debug!(
                    month = %ym,
                    entries = result.entries.len(),
                    "schedule cache updated"
                );
                self.last_error = None;
                let cached = CachedSchedule {
                    result,
                    fetched_at: Instant::now(),
                    source_modified: self.source_seen,
                };
                self.cache.insert(key.clone(), cached);
                Ok(&self.cache[&key].result)
            }
            Err(e) if is_transient(&e) && self.cache.contains_key(&key) => {
                tracing::warn!(error = %e, "fetch failed; falling back to cached schedule");
                self.last_error = Some(e.to_string());
                Ok(&self.cache[&key].result)
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Entries for a `"YYYY-MM"` specifier, or the current month in
    /// `timezone` when `None`.
    pub fn entries(&mut self, month: Option<&str>, timezone: &str) -> Result<Vec<ScheduleEntry>> {
        let ym = resolve_month(month, timezone)?;
        Ok(self.get_schedule(ym, false)?.entries.clone())
    }

    /// Drop every cached month.
    pub fn invalidate_cache(&mut self) {
        self.cache.clear();
        tracing::debug!("cache invalidated");
    }

    /// Drop the cached result for one month.
    pub fn invalidate_month(&mut self, ym: YearMonth) {
        let key = self.key_for(ym);
        self.cache.remove(&key);
    }

    /// Age of the cached result for `ym`, or `None` if it was never fetched.
    pub fn cache_age(&self, ym: YearMonth) -> Option<Duration> {
        self.cache
            .get(&self.key_for(ym))
            .map(|c| c.fetched_at.elapsed())
    }

    /// Human-readable description of the last fetch error, or `None`.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    // ── Private helpers ───────────────────────────────────────────────────

    fn key_for(&self, ym: YearMonth) -> CacheKey {
        CacheKey {
            source: self.source.identity(),
            year_month: ym,
        }
    }

    /// `true` when the cached result is within its TTL and the source has not
    /// changed since it was built.
    fn is_cache_valid(&self, key: &CacheKey) -> bool {
        match self.cache.get(key) {
            Some(cached) => {
                cached.fetched_at.elapsed() < self.cache_ttl
                    && cached.source_modified == self.source.modified()
            }
            None => false,
        }
    }

    fn is_source_changed(&self) -> bool {
        self.source_seen != self.source.modified()
    }

    /// Re-read the source when needed, then extract `ym`.
    fn reload(&mut self, ym: YearMonth, force_refresh: bool) -> Result<ExtractionResult> {
        if force_refresh || self.is_source_changed() {
            tracing::debug!(month = %ym, force_refresh, "refreshing source");
            let source = &mut self.source;
            with_retry("refresh", || source.refresh())?;
            self.source_seen = self.source.modified();
        }

        let source = self.source.as_ref();
        with_retry("fetch", || fetch_schedule_for(source, ym))
    }
}

/// Run `op` up to [`MAX_RETRY_ATTEMPTS`] times, retrying only transient
/// failures. Back-off: 0 ms, 100 ms, 200 ms.
fn with_retry<T>(what: &str, mut op: impl FnMut() -> Result<T>) -> Result<T> {
    let mut attempt = 0;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(e) if is_transient(&e) && attempt + 1 < MAX_RETRY_ATTEMPTS => {
                attempt += 1;
                let sleep_ms = u64::from(attempt) * 100;
                tracing::warn!(what, attempt, sleep_ms, error = %e, "attempt failed; retrying");
                thread::sleep(Duration::from_millis(sleep_ms));
            }
            Err(e) => return Err(e),
        }
    }
}

/// File reads may succeed on retry; everything else is deterministic.
fn is_transient(err: &RosterError) -> bool {
    matches!(err, RosterError::FileRead { .. })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
