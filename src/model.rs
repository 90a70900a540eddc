use serde::{Serialize, Deserialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use chrono::{NaiveDate, NaiveDateTime, Weekday};

/// One input row as handed over by the ingestion side: column name to cell value.
pub type RawRow = BTreeMap<String, serde_json::Value>;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    pub fn new(columns: Vec<String>, rows: Vec<RawRow>) -> Self {
        Self { columns, rows }
    }

    /// Builds a table whose column set is the union of every row's keys, in first-seen order.
    pub fn from_rows(rows: Vec<RawRow>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for row in &rows {
            for key in row.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }

        Self { columns, rows }
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    pub fn of(date: NaiveDate) -> Self {
        use chrono::Datelike;
        match date.weekday() {
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
            Weekday::Sun => DayOfWeek::Sunday,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DayOfWeek::Monday => "Monday",
            DayOfWeek::Tuesday => "Tuesday",
            DayOfWeek::Wednesday => "Wednesday",
            DayOfWeek::Thursday => "Thursday",
            DayOfWeek::Friday => "Friday",
            DayOfWeek::Saturday => "Saturday",
            DayOfWeek::Sunday => "Sunday",
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DayOfWeek {
    type Err = String;

    /// Accepts full names and three-letter abbreviations, any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        DayOfWeek::ALL
            .into_iter()
            .find(|day| {
                let name = day.name().to_ascii_lowercase();
                name == needle || (needle.len() == 3 && name.starts_with(&needle))
            })
            .ok_or_else(|| format!("unknown day of week: {}", s))
    }
}

#[derive(Clone, Serialize, Deserialize, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    /// Zero-based index of the source row.
    pub row: usize,
    pub patient_id: String,
    pub date: NaiveDate,
    pub entry_time: NaiveDateTime,
    pub post_consultation_time: NaiveDateTime,
    pub completion_time: NaiveDateTime,
    pub doctor_type: String,
    pub financial_class: String,
    pub wait_minutes: f64,
    pub consultation_minutes: f64,
    pub hour_of_day: u32,
    pub day_of_week: DayOfWeek,
}

impl Visit {
    pub fn is_anomalous(&self) -> bool {
        self.wait_minutes < 0.0 || self.consultation_minutes < 0.0
    }
}

/// A visit whose stages are out of chronological order. Kept in the aggregates as-is.
#[derive(Clone, Serialize, Deserialize, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct OrderingAnomaly {
    pub row: usize,
    pub patient_id: String,
    pub wait_minutes: f64,
    pub consultation_minutes: f64,
}

impl From<&Visit> for OrderingAnomaly {
    fn from(visit: &Visit) -> Self {
        Self {
            row: visit.row,
            patient_id: visit.patient_id.clone(),
            wait_minutes: visit.wait_minutes,
            consultation_minutes: visit.consultation_minutes,
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Eq, PartialEq, Debug, thiserror::Error)]
pub enum VisitError {
    #[error("missing required columns: {}", .missing.join(", "))]
    Schema { missing: Vec<String> },
    #[error("row {row}: cannot parse {field} from {value:?}")]
    Parse { row: usize, field: String, value: String },
    #[error("cannot read input: {0}")]
    Source(String),
}
