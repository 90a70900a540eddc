use std::collections::BTreeMap;

use crate::model::{RawRow, RawTable, VisitError};

#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Debug)]
pub enum Column {
    PatientId,
    Date,
    EntryTime,
    PostConsultationTime,
    CompletionTime,
    DoctorType,
    FinancialClass,
}

pub const REQUIRED_COLUMNS: [Column; 7] = [
    Column::Date,
    Column::EntryTime,
    Column::PostConsultationTime,
    Column::CompletionTime,
    Column::PatientId,
    Column::DoctorType,
    Column::FinancialClass,
];

impl Column {
    pub fn label(&self) -> &'static str {
        match self {
            Column::PatientId => "Patient ID",
            Column::Date => "Date",
            Column::EntryTime => "Entry Time",
            Column::PostConsultationTime => "Post-Consultation Time",
            Column::CompletionTime => "Completion Time",
            Column::DoctorType => "Doctor Type",
            Column::FinancialClass => "Financial Class",
        }
    }
}

/// A row that passed field presence checks. Date and times are still text.
#[derive(Clone, PartialEq, Debug)]
pub struct RawVisit {
    pub row: usize,
    pub patient_id: String,
    pub date: String,
    pub entry_time: String,
    pub post_consultation_time: String,
    pub completion_time: String,
    pub doctor_type: String,
    pub financial_class: String,
}

#[derive(Clone, Debug)]
pub struct Schema {
    keys: BTreeMap<Column, String>,
}

impl Schema {
    /// Checks the table's header set once. Headers match after trimming, otherwise exactly.
    /// `extra_required` names further columns that must be present but are not read.
    pub fn resolve(table: &RawTable, extra_required: &[String]) -> Result<Self, VisitError> {
        let find = |label: &str| table.columns.iter().find(|c| c.trim() == label).cloned();

        let mut keys = BTreeMap::new();
        let mut missing = Vec::new();
        for column in REQUIRED_COLUMNS {
            match find(column.label()) {
                Some(key) => {
                    keys.insert(column, key);
                },
                None => missing.push(column.label().to_string()),
            }
        }
        for label in extra_required {
            let label = label.trim();
            if find(label).is_none() && !missing.iter().any(|m| m == label) {
                missing.push(label.to_string());
            }
        }

        if missing.len() > 0 {
            return Err(VisitError::Schema { missing });
        }

        Ok(Self { keys })
    }

    fn cell(&self, index: usize, row: &RawRow, column: Column) -> Result<String, VisitError> {
        let value = self.keys.get(&column).and_then(|key| row.get(key));
        if let Some(text) = value.and_then(cell_text) {
            return Ok(text);
        }

        let shown = match value {
            Some(nested @ (serde_json::Value::Array(_) | serde_json::Value::Object(_))) => {
                nested.to_string()
            },
            _ => String::new(),
        };
        Err(VisitError::Parse { row: index, field: column.label().to_string(), value: shown })
    }

    pub fn parse_row(&self, index: usize, row: &RawRow) -> Result<RawVisit, VisitError> {
        Ok(RawVisit {
            row: index,
            patient_id: self.cell(index, row, Column::PatientId)?,
            date: self.cell(index, row, Column::Date)?,
            entry_time: self.cell(index, row, Column::EntryTime)?,
            post_consultation_time: self.cell(index, row, Column::PostConsultationTime)?,
            completion_time: self.cell(index, row, Column::CompletionTime)?,
            doctor_type: self.cell(index, row, Column::DoctorType)?,
            financial_class: self.cell(index, row, Column::FinancialClass)?,
        })
    }
}

/// Null, blank and nested values have no text.
fn cell_text(value: &serde_json::Value) -> Option<String> {
    let text = match value {
        serde_json::Value::String(s) => s.trim().to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        _ => return None,
    };

    if text.is_empty() { None } else { Some(text) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn headers() -> Vec<String> {
        REQUIRED_COLUMNS.iter().map(|c| c.label().to_string()).collect()
    }

    fn row() -> RawRow {
        RawRow::from([
            ("Patient ID".to_string(), json!(1042)),
            ("Date".to_string(), json!("2024-10-14")),
            ("Entry Time".to_string(), json!("08:00:00")),
            ("Post-Consultation Time".to_string(), json!("08:25:00")),
            ("Completion Time".to_string(), json!("08:40:00")),
            ("Doctor Type".to_string(), json!(" Specialist ")),
            ("Financial Class".to_string(), json!("Insurance")),
        ])
    }

    #[test]
    fn resolves_trimmed_headers() {
        let mut columns = headers();
        columns[0] = "  Date ".into();
        let mut raw = row();
        let date = raw.remove("Date").unwrap();
        raw.insert("  Date ".into(), date);

        let table = RawTable::new(columns, vec![raw.clone()]);
        let schema = Schema::resolve(&table, &[]).unwrap();
        let visit = schema.parse_row(0, &raw).unwrap();
        assert_eq!(visit.date, "2024-10-14");
        assert_eq!(visit.patient_id, "1042");
        assert_eq!(visit.doctor_type, "Specialist");
    }

    #[test]
    fn header_match_is_case_sensitive() {
        let mut columns = headers();
        columns[1] = "entry time".into();
        let err = Schema::resolve(&RawTable::new(columns, vec![]), &[]).unwrap_err();
        assert_eq!(err, VisitError::Schema { missing: vec!["Entry Time".into()] });
    }

    #[test]
    fn reports_every_missing_column() {
        let table = RawTable::new(vec!["Date".into(), "Notes".into()], vec![]);
        let err = Schema::resolve(&table, &["Ward".to_string()]).unwrap_err();
        match err {
            VisitError::Schema { missing } => {
                assert_eq!(missing.len(), 7);
                assert!(missing.contains(&"Ward".to_string()));
                assert!(!missing.contains(&"Date".to_string()));
            },
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn extra_columns_are_ignored() {
        let mut columns = headers();
        columns.push("Notes".into());
        assert!(Schema::resolve(&RawTable::new(columns, vec![]), &[]).is_ok());
    }

    #[test]
    fn blank_cell_is_a_parse_error() {
        let schema = Schema::resolve(&RawTable::new(headers(), vec![]), &[]).unwrap();
        let mut raw = row();
        raw.insert("Doctor Type".into(), json!("   "));
        let err = schema.parse_row(3, &raw).unwrap_err();
        assert_eq!(err, VisitError::Parse {
            row: 3,
            field: "Doctor Type".into(),
            value: "".into(),
        });
    }

    #[test]
    fn nested_cell_is_shown_in_error() {
        let schema = Schema::resolve(&RawTable::new(headers(), vec![]), &[]).unwrap();
        let mut raw = row();
        raw.insert("Entry Time".into(), json!(["08:00", "08:05"]));
        let err = schema.parse_row(4, &raw).unwrap_err();
        assert_eq!(err, VisitError::Parse {
            row: 4,
            field: "Entry Time".into(),
            value: r#"["08:00","08:05"]"#.into(),
        });
    }
}
