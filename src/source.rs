use std::path::Path;

use anyhow::Context;

use crate::model::{RawRow, RawTable, VisitError};

/// Turns file contents into a raw table. One implementation per input format.
pub trait RowSource {
    fn name(&self) -> &'static str;
    fn read(&self, data: &str) -> Result<RawTable, VisitError>;
}

/// Header row plus records. Cells are trimmed and blank cells become null.
pub struct CsvSource;

impl RowSource for CsvSource {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn read(&self, data: &str) -> Result<RawTable, VisitError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(data.as_bytes());

        let headers: Vec<String> = rdr
            .headers()
            .map_err(|err| VisitError::Source(format!("missing header row: {}", err)))?
            .iter()
            .map(String::from)
            .collect();
        if headers.iter().all(|h| h.trim().is_empty()) {
            return Err(VisitError::Source("missing header row".into()));
        }

        let mut rows = Vec::new();
        for (index, record) in rdr.records().enumerate() {
            let record = record.map_err(|err| VisitError::Source(err.to_string()))?;
            if record.len() != headers.len() {
                return Err(VisitError::Source(format!(
                    "record {} has {} fields, header has {}",
                    index,
                    record.len(),
                    headers.len()
                )));
            }

            let row: RawRow = headers
                .iter()
                .zip(record.iter())
                .map(|(header, value)| {
                    let value = value.trim();
                    let cell = if value.is_empty() {
                        serde_json::Value::Null
                    } else {
                        serde_json::Value::String(value.into())
                    };
                    (header.clone(), cell)
                })
                .collect();
            rows.push(row);
        }

        Ok(RawTable::new(headers, rows))
    }
}

pub struct JsonSource;

impl RowSource for JsonSource {
    fn name(&self) -> &'static str {
        "json"
    }

    fn read(&self, data: &str) -> Result<RawTable, VisitError> {
        serde_json::from_str::<Vec<RawRow>>(data)
            .map(RawTable::from_rows)
            .map_err(|err| VisitError::Source(err.to_string()))
    }
}

pub fn source_for(extension: &str) -> Option<Box<dyn RowSource>> {
    match extension.to_ascii_lowercase().as_str() {
        "csv" => Some(Box::new(CsvSource)),
        "json" => Some(Box::new(JsonSource)),
        _ => None,
    }
}

pub fn read_file(path: &Path) -> anyhow::Result<RawTable> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    let source = source_for(extension)
        .with_context(|| format!("no reader for file type {:?}: {}", extension, path.display()))?;
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;

    source
        .read(&data)
        .with_context(|| format!("cannot load {} as {}", path.display(), source.name()))
}
