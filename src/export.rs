/// CSV export of the prediction history.
///
/// The layout matches the training dataset the classifier was built from:
/// the message text, one boolean column per known carrier, then `label` and
/// `predicted_label`. The service does not report a separate predicted
/// label, so `predicted_label` repeats `label`.
use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::ExportError;
use crate::model::PredictionRecord;

/// Carriers with a dedicated column, in column order.
pub const CARRIERS: [&str; 9] = [
    "DITO",
    "Globe",
    "Globe PostPaid",
    "Globe/TM",
    "Smart",
    "Smart/Sun",
    "Smart/TNT",
    "Sun",
    "TNT",
];

/// Column name for a carrier flag, e.g. `carrier_Globe`.
pub fn carrier_column(carrier: &str) -> String {
    format!("carrier_{carrier}")
}

/// Header row: `text`, the carrier columns, `label`, `predicted_label`.
pub fn header() -> String {
    let mut columns = vec!["text".to_string()];
    columns.extend(CARRIERS.iter().map(|c| carrier_column(c)));
    columns.push("label".to_string());
    columns.push("predicted_label".to_string());
    columns.join(",")
}

/// Wrap a value in double quotes, doubling embedded quotes and flattening
/// line breaks to single spaces.
pub fn quote(value: &str) -> String {
    let flattened = value.replace("\r\n", " ").replace(['\r', '\n'], " ");
    format!("\"{}\"", flattened.replace('"', "\"\""))
}

/// One data row for `record`.
pub fn row(record: &PredictionRecord) -> String {
    let carrier = record.carrier.as_deref().unwrap_or_default();
    let label = quote(&record.label);

    let mut cells = Vec::with_capacity(CARRIERS.len() + 3);
    cells.push(quote(&record.text));
    cells.extend(CARRIERS.iter().map(|c| {
        if *c == carrier { "True" } else { "False" }.to_string()
    }));
    cells.push(label.clone());
    cells.push(label);
    cells.join(",")
}

/// Build the CSV document for `records`.
///
/// Rows are joined with `\n` and there is no trailing newline. An empty
/// history is refused.
pub fn to_csv(records: &[PredictionRecord]) -> Result<String, ExportError> {
    if records.is_empty() {
        return Err(ExportError::NoHistory);
    }

    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(header());
    lines.extend(records.iter().map(row));
    Ok(lines.join("\n"))
}

/// Write the CSV for `records` to `path`.
///
/// Nothing is written when the history is empty.
pub fn write_csv(records: &[PredictionRecord], path: &Path) -> Result<PathBuf, ExportError> {
    let csv = to_csv(records)?;
    fs::write(path, csv).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), rows = records.len(), "history exported");
    Ok(path.to_path_buf())
}
