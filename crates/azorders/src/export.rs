use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::types::OrderRecord;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("No data to save")]
    Empty,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    /// Guesses from the file extension, defaulting to CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ExportFormat::Json,
            _ => ExportFormat::Csv,
        }
    }
}

/// Orders the accumulated records by year, then order number.
pub fn export_rows(mut records: Vec<OrderRecord>) -> Vec<OrderRecord> {
    records.sort_by(|a, b| {
        a.year
            .cmp(&b.year)
            .then_with(|| a.order_number.cmp(&b.order_number))
    });
    records
}

/// Writes already-ordered rows (see [`export_rows`]) to `path`.
pub fn write_records(
    path: &Path,
    format: ExportFormat,
    rows: &[OrderRecord],
) -> Result<usize, ExportError> {
    if rows.is_empty() {
        return Err(ExportError::Empty);
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    match format {
        ExportFormat::Csv => {
            let mut writer = csv::Writer::from_path(path)?;
            for row in rows {
                writer.serialize(row)?;
            }
            writer.flush()?;
        }
        ExportFormat::Json => {
            let mut writer = BufWriter::new(fs::File::create(path)?);
            serde_json::to_writer_pretty(&mut writer, rows)?;
            writer.flush()?;
        }
    }

    log::info!("Data saved to {}", path.display());
    Ok(rows.len())
}

/// Dumps records as JSON into `dir` so a failed export does not lose the crawl.
pub fn write_recovery_dump(
    dir: &Path,
    records: &[OrderRecord],
) -> Result<PathBuf, ExportError> {
    fs::create_dir_all(dir)?;
    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    let path = dir.join(format!("azorders-recovery-{}.json", stamp));

    let mut writer = BufWriter::new(fs::File::create(&path)?);
    serde_json::to_writer(&mut writer, records)?;
    writer.flush()?;

    log::warn!(
        "Wrote {} records to recovery dump {}",
        records.len(),
        path.display()
    );
    Ok(path)
}
