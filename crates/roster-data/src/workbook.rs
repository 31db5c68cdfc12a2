//! Workbook sources: where worksheet titles and cell grids come from.
//!
//! The extractor never talks to a spreadsheet service itself. It asks a
//! [`WorkbookSource`] for the ordered list of tab titles and for the grid of
//! one tab. Three sources ship with the crate:
//!
//! * [`InMemoryWorkbook`] – worksheets already held in memory.
//! * [`JsonWorkbook`] – a single snapshot file
//!   `{"title": "...", "sheets": [{"title": "...", "values": [[...]]}]}`.
//! * [`DirectoryWorkbook`] – a directory of `*.json` files, one grid per file,
//!   titled by the file stem.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use roster_core::error::{Result, RosterError};
use roster_core::models::{RawGrid, Worksheet};
use serde::Deserialize;
use tracing::{debug, warn};

// ── Trait ─────────────────────────────────────────────────────────────────────

/// Supplier of worksheet titles and grids.
pub trait WorkbookSource {
    /// Tab titles in the order the workbook lists them.
    fn worksheet_titles(&self) -> Result<Vec<String>>;

    /// Full cell grid of the tab titled `title`. Empty cells are empty
    /// strings; rows may have different lengths.
    fn worksheet_values(&self, title: &str) -> Result<RawGrid>;

    /// Stable name for this source, used as part of cache keys.
    fn identity(&self) -> String;

    /// Workbook title, when the source records one.
    fn title(&self) -> Option<&str> {
        None
    }

    /// Last modification time of the underlying data, when known.
    fn modified(&self) -> Option<SystemTime> {
        None
    }

    /// Re-read the underlying data. Sources that read lazily need not do
    /// anything.
    fn refresh(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Open the source at `path`: a directory becomes a [`DirectoryWorkbook`],
/// anything else is read as a [`JsonWorkbook`].
pub fn open_source(path: &Path) -> Result<Box<dyn WorkbookSource>> {
    if !path.exists() {
        return Err(RosterError::SourceNotFound(path.to_path_buf()));
    }
    if path.is_dir() {
        Ok(Box::new(DirectoryWorkbook::open(path)?))
    } else {
        Ok(Box::new(JsonWorkbook::open(path)?))
    }
}

// ── In-memory ─────────────────────────────────────────────────────────────────

/// Worksheets held in memory, in source order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryWorkbook {
    name: String,
    worksheets: Vec<Worksheet>,
}

impl InMemoryWorkbook {
    pub fn new(name: impl Into<String>, worksheets: Vec<Worksheet>) -> Self {
        Self {
            name: name.into(),
            worksheets,
        }
    }
}

impl WorkbookSource for InMemoryWorkbook {
    fn worksheet_titles(&self) -> Result<Vec<String>> {
        Ok(self.worksheets.iter().map(|ws| ws.title.clone()).collect())
    }

    fn worksheet_values(&self, title: &str) -> Result<RawGrid> {
        self.worksheets
            .iter()
            .find(|ws| ws.title == title)
            .map(|ws| ws.values.clone())
            .ok_or_else(|| RosterError::SheetNotFound(title.to_string()))
    }

    fn identity(&self) -> String {
        format!("memory:{}", self.name)
    }
}

// ── JSON snapshot file ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct WorkbookDocument {
    #[serde(default)]
    title: String,
    #[serde(default)]
    sheets: Vec<SheetDocument>,
}

#[derive(Debug, Deserialize)]
struct SheetDocument {
    title: String,
    #[serde(default)]
    values: Vec<serde_json::Value>,
}

/// A workbook snapshot stored as one JSON document.
#[derive(Debug, Clone)]
pub struct JsonWorkbook {
    path: PathBuf,
    title: String,
    inner: InMemoryWorkbook,
}

impl JsonWorkbook {
    /// Read and parse the snapshot at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let content = read_file(path)?;
        let doc: WorkbookDocument = serde_json::from_str(&content)?;

        let worksheets: Vec<Worksheet> = doc
            .sheets
            .into_iter()
            .map(|sheet| Worksheet::new(sheet.title, normalize_rows(sheet.values)))
            .collect();

        debug!(
            "Loaded workbook \"{}\" with {} sheets from {}",
            doc.title,
            worksheets.len(),
            path.display()
        );

        Ok(Self {
            path: path.to_path_buf(),
            title: doc.title,
            inner: InMemoryWorkbook::new(path.display().to_string(), worksheets),
        })
    }
}

impl WorkbookSource for JsonWorkbook {
    fn worksheet_titles(&self) -> Result<Vec<String>> {
        self.inner.worksheet_titles()
    }

    fn worksheet_values(&self, title: &str) -> Result<RawGrid> {
        self.inner.worksheet_values(title)
    }

    fn identity(&self) -> String {
        format!("file:{}", self.path.display())
    }

    fn title(&self) -> Option<&str> {
        Some(self.title.as_str()).filter(|t| !t.is_empty())
    }

    fn modified(&self) -> Option<SystemTime> {
        std::fs::metadata(&self.path).and_then(|m| m.modified()).ok()
    }

    fn refresh(&mut self) -> Result<()> {
        *self = Self::open(&self.path)?;
        Ok(())
    }
}

// ── Directory of sheet files ──────────────────────────────────────────────────

/// A directory where each `*.json` file holds one worksheet grid.
#[derive(Debug, Clone)]
pub struct DirectoryWorkbook {
    root: PathBuf,
    sheets: Vec<(String, PathBuf)>,
}

impl DirectoryWorkbook {
    /// Index the sheet files directly under `root`, sorted by path.
    pub fn open(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            return Err(RosterError::SourceNotFound(root.to_path_buf()));
        }

        let sheets: Vec<(String, PathBuf)> = find_sheet_files(root)
            .into_iter()
            .filter_map(|path| {
                let title = path.file_stem()?.to_string_lossy().to_string();
                Some((title, path))
            })
            .collect();

        if sheets.is_empty() {
            warn!("No sheet files found in {}", root.display());
        }

        Ok(Self {
            root: root.to_path_buf(),
            sheets,
        })
    }
}

impl WorkbookSource for DirectoryWorkbook {
    fn worksheet_titles(&self) -> Result<Vec<String>> {
        Ok(self.sheets.iter().map(|(title, _)| title.clone()).collect())
    }

    fn worksheet_values(&self, title: &str) -> Result<RawGrid> {
        let (_, path) = self
            .sheets
            .iter()
            .find(|(t, _)| t == title)
            .ok_or_else(|| RosterError::SheetNotFound(title.to_string()))?;

        let content = read_file(path)?;
        let rows: Vec<serde_json::Value> = serde_json::from_str(&content)?;
        Ok(normalize_rows(rows))
    }

    fn identity(&self) -> String {
        format!("dir:{}", self.root.display())
    }

    /// Newest of the root directory and the indexed sheet files. The root
    /// changes when a sheet file is added or removed.
    fn modified(&self) -> Option<SystemTime> {
        let root = std::fs::metadata(&self.root).and_then(|m| m.modified()).ok();
        self.sheets
            .iter()
            .filter_map(|(_, path)| std::fs::metadata(path).and_then(|m| m.modified()).ok())
            .chain(root)
            .max()
    }

    fn refresh(&mut self) -> Result<()> {
        *self = Self::open(&self.root)?;
        Ok(())
    }
}

/// Find the `.json` files directly under `root`, sorted by path.
pub fn find_sheet_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext == "json")
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| RosterError::FileRead {
        path: path.to_path_buf(),
        source,
    })
}

/// Convert JSON rows into string rows. Anything that is not an array becomes
/// an empty row.
fn normalize_rows(rows: Vec<serde_json::Value>) -> RawGrid {
    rows.into_iter()
        .map(|row| match row {
            serde_json::Value::Array(cells) => cells.iter().map(cell_to_string).collect(),
            _ => Vec::new(),
        })
        .collect()
}

/// Render a JSON cell the way a spreadsheet shows it: `null` is blank,
/// strings are verbatim, numbers and booleans use their display form.
fn cell_to_string(cell: &serde_json::Value) -> String {
    match cell {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Bool(true) => "TRUE".to_string(),
        serde_json::Value::Bool(false) => "FALSE".to_string(),
        other => other.to_string(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
