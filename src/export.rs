// 💾 Export - slot table as CSV / JSON side artifacts
// Exports are never read back; every query recomputes from the widget

use crate::aggregator::AvailabilityReport;
use crate::schedule::{format_date, BookableSlot};
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::json;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    /// Pick the format from a file extension (.csv / .json)
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_lowercase().as_str() {
            "csv" => Some(ExportFormat::Csv),
            "json" => Some(ExportFormat::Json),
            _ => None,
        }
    }
}

/// Rows: start,end,court,date,duration
pub fn write_csv<W: Write>(writer: W, slots: &[BookableSlot]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for slot in slots {
        wtr.serialize(slot).context("Failed to write CSV row")?;
    }
    wtr.flush().context("Failed to flush CSV output")?;
    Ok(())
}

#[derive(Serialize)]
struct SummaryRow {
    date: String,
    court: u32,
    duration: u32,
    slots: usize,
}

/// Rows: date,court,duration,slots
pub fn write_summary_csv<W: Write>(writer: W, report: &AvailabilityReport) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for ((date, court, duration), slots) in report.summary() {
        wtr.serialize(SummaryRow {
            date: format_date(date),
            court: court.0,
            duration,
            slots,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

/// Whole report: slots, free intervals, empty dates and per-date failures
pub fn report_json(report: &AvailabilityReport) -> serde_json::Value {
    let failures: Vec<serde_json::Value> = report
        .failures
        .iter()
        .map(|(date, err)| {
            json!({
                "date": format_date(*date),
                "kind": err.kind(),
                "message": err.to_string(),
            })
        })
        .collect();

    json!({
        "dates": report.dates.iter().map(|d| format_date(*d)).collect::<Vec<_>>(),
        "durations": report.durations,
        "slots": report.slots,
        "intervals": report.intervals,
        "empty_dates": report.empty_dates.iter().map(|d| format_date(*d)).collect::<Vec<_>>(),
        "failures": failures,
    })
}

pub fn write_json<W: Write>(writer: W, report: &AvailabilityReport) -> Result<()> {
    serde_json::to_writer_pretty(writer, &report_json(report)).context("Failed to write JSON report")?;
    Ok(())
}

/// Write the report to `path`, format chosen by extension
pub fn export_to_path(report: &AvailabilityReport, path: &Path) -> Result<ExportFormat> {
    let format = ExportFormat::from_path(path)
        .with_context(|| format!("Unsupported export extension: {} (use .csv or .json)", path.display()))?;
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut out = BufWriter::new(file);

    match format {
        ExportFormat::Csv => write_csv(&mut out, &report.slots)?,
        ExportFormat::Json => write_json(&mut out, report)?,
    }
    out.flush()?;
    log::info!("wrote {} slots to {}", report.slots.len(), path.display());
    Ok(format)
}
