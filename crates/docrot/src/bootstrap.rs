use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// Ensure `~/.docrot/` exists.
pub fn ensure_directories() -> anyhow::Result<()> {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(home.join(".docrot"))?;
    Ok(())
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map a `--log-level` name to an `EnvFilter` directive.
fn filter_directive(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" | "CRITICAL" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" => "warn".to_string(),
        "ERROR" => "error".to_string(),
        other => other.to_lowercase(),
    }
}

/// Initialise the global `tracing` subscriber.
///
/// Output goes to stderr, or is appended to `log_file` (without ANSI colours)
/// when one is given. Unrecognised levels fall back to `"info"`.
pub fn setup_logging(log_level: &str, log_file: Option<&PathBuf>) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_new(filter_directive(log_level)).unwrap_or_else(|_| EnvFilter::new("info"));

    let (stderr_layer, file_layer) = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let layer = fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(Mutex::new(file));
            (None, Some(layer))
        }
        None => {
            let layer = fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr);
            (Some(layer), None)
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(())
}

// ── Source discovery ───────────────────────────────────────────────────────────

/// Look for a workbook snapshot in the default locations when `--source` is
/// not given.
///
/// Checks, in order:
/// 1. `~/.docrot/workbook.json`
/// 2. `~/.docrot/sheets/`
pub fn discover_source() -> Option<PathBuf> {
    let home = dirs::home_dir()?;
    discover_source_in(&home)
}

fn discover_source_in(home: &Path) -> Option<PathBuf> {
    let base = home.join(".docrot");
    let candidates = [base.join("workbook.json"), base.join("sheets")];
    candidates.into_iter().find(|p| p.exists())
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_directories() {
        let tmp = TempDir::new().expect("tempdir");

        // Override HOME so that dirs::home_dir() resolves to our temp dir.
        let original_home = std::env::var_os("HOME");
        std::env::set_var("HOME", tmp.path());

        let result = ensure_directories();

        match original_home {
            Some(v) => std::env::set_var("HOME", v),
            None => std::env::remove_var("HOME"),
        }

        result.expect("ensure_directories should succeed");
        assert!(tmp.path().join(".docrot").is_dir());
    }

    #[test]
    fn test_filter_directive() {
        assert_eq!(filter_directive("DEBUG"), "debug");
        assert_eq!(filter_directive("CRITICAL"), "debug");
        assert_eq!(filter_directive("warning"), "warn");
        assert_eq!(filter_directive("ERROR"), "error");
        assert_eq!(filter_directive("Trace"), "trace");
    }

    // ── discover_source ───────────────────────────────────────────────────────

    #[test]
    fn test_discover_source_none_when_absent() {
        let tmp = TempDir::new().expect("tempdir");
        assert!(discover_source_in(tmp.path()).is_none());
    }

    #[test]
    fn test_discover_source_prefers_workbook_file() {
        let tmp = TempDir::new().expect("tempdir");
        let base = tmp.path().join(".docrot");
        std::fs::create_dir_all(base.join("sheets")).expect("create sheets dir");
        std::fs::write(base.join("workbook.json"), "{}").expect("write workbook");

        assert_eq!(discover_source_in(tmp.path()), Some(base.join("workbook.json")));
    }

    #[test]
    fn test_discover_source_finds_sheet_directory() {
        let tmp = TempDir::new().expect("tempdir");
        let sheets = tmp.path().join(".docrot").join("sheets");
        std::fs::create_dir_all(&sheets).expect("create sheets dir");

        assert_eq!(discover_source_in(tmp.path()), Some(sheets));
    }
}
