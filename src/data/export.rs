use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::{Map, Number, Value as JsonValue};

use super::model::{CellValue, Row};

/// Write `rows` to `path`, columns in `headers` order. Format by extension:
/// `.csv` (Null → empty field) or `.json` (pretty array of objects).
pub fn save_file(path: &Path, headers: &[String], rows: &[Row]) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => save_csv(path, headers, rows),
        "json" => save_json(path, headers, rows),
        other => bail!("Unsupported export extension: .{other}"),
    }
    .with_context(|| format!("exporting {}", path.display()))?;

    log::info!("exported {} rows to {}", rows.len(), path.display());
    Ok(())
}

fn save_csv(path: &Path, headers: &[String], rows: &[Row]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;
    writer.write_record(headers).context("writing CSV header")?;
    for row in rows {
        let record: Vec<String> = headers
            .iter()
            .map(|h| match row.get(h) {
                None | Some(CellValue::Null) => String::new(),
                Some(cell) => cell.to_string(),
            })
            .collect();
        writer.write_record(&record).context("writing CSV record")?;
    }
    writer.flush().context("flushing CSV file")?;
    Ok(())
}

fn save_json(path: &Path, headers: &[String], rows: &[Row]) -> Result<()> {
    let records: Vec<JsonValue> = rows
        .iter()
        .map(|row| {
            let obj: Map<String, JsonValue> = headers
                .iter()
                .map(|h| (h.clone(), row.get(h).map(cell_to_json).unwrap_or(JsonValue::Null)))
                .collect();
            JsonValue::Object(obj)
        })
        .collect();
    let text = serde_json::to_string_pretty(&records).context("serializing JSON")?;
    std::fs::write(path, text).context("writing JSON file")?;
    Ok(())
}

fn cell_to_json(cell: &CellValue) -> JsonValue {
    match cell {
        CellValue::Null => JsonValue::Null,
        CellValue::Integer(i) => JsonValue::from(*i),
        // Non-finite floats have no JSON number form.
        CellValue::Float(f) => Number::from_f64(*f)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        CellValue::Text(s) => JsonValue::String(s.clone()),
    }
}
