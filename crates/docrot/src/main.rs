mod bootstrap;

use anyhow::{Context, Result};
use roster_core::error::RosterError;
use roster_core::formatting::{format_entries_json, format_entries_table, format_sheet_summary};
use roster_core::models::{fill_default_times, filter_by_date, Worksheet};
use roster_core::settings::Settings;
use roster_core::time_utils::{parse_day_spec, resolve_month};
use roster_data::workbook::{open_source, WorkbookSource};
use roster_runtime::schedule_manager::{ScheduleManager, DEFAULT_CACHE_TTL_SECS};

fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("Docrot v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "View: {}, Format: {}, Timezone: {}",
        settings.view,
        settings.format,
        settings.timezone
    );

    let source_path = settings
        .source
        .clone()
        .or_else(bootstrap::discover_source)
        .ok_or_else(|| {
            RosterError::Config("no workbook source given (use --source or DOCROT_SOURCE)".into())
        })?;

    let source = open_source(&source_path)
        .with_context(|| format!("opening workbook source {}", source_path.display()))?;
    let mut manager = ScheduleManager::new(source, DEFAULT_CACHE_TTL_SECS);

    match settings.view.as_str() {
        "sheets" => show_sheets(manager.source()),
        "entries" => show_entries(&settings, &mut manager),
        unknown => {
            eprintln!("Unknown view mode: {}", unknown);
            Ok(())
        }
    }
}

fn show_sheets(source: &dyn WorkbookSource) -> Result<()> {
    let worksheets = source
        .worksheet_titles()?
        .into_iter()
        .map(|title| -> Result<Worksheet, RosterError> {
            let values = source.worksheet_values(&title)?;
            Ok(Worksheet::new(title, values))
        })
        .collect::<Result<Vec<_>, RosterError>>()?;

    if let Some(title) = source.title() {
        println!("Title: {}", title);
    }
    println!("Sheets: {}\n", worksheets.len());
    println!("{}", format_sheet_summary(&worksheets));
    Ok(())
}

fn show_entries(settings: &Settings, manager: &mut ScheduleManager) -> Result<()> {
    let ym = resolve_month(settings.month.as_deref(), &settings.timezone)?;

    let mut entries = manager.get_schedule(ym, false)?.entries.clone();

    if let Some(day) = settings.date.as_deref() {
        entries = filter_by_date(entries, parse_day_spec(day)?);
    }
    if settings.fill_times {
        entries = fill_default_times(&entries, &settings.start_time, &settings.end_time);
    }

    if entries.is_empty() {
        eprintln!("No schedule entries found for {}", ym);
        return Ok(());
    }

    match settings.format.as_str() {
        "json" => println!("{}", format_entries_json(&entries)?),
        _ => println!("{}", format_entries_table(&entries)),
    }

    tracing::info!("Printed {} entries for {}", entries.len(), ym);
    Ok(())
}
